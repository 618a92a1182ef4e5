//! Error types for the OpenAI-compatible adapter

use parley_application::ports::llm_gateway::GatewayError;
use thiserror::Error;

/// Result type alias for OpenAI-compatible operations
pub type Result<T> = std::result::Result<T, OpenAiCompatError>;

/// Errors that can occur when talking to an OpenAI-compatible endpoint
#[derive(Error, Debug)]
pub enum OpenAiCompatError {
    #[error("HTTP transport error: {0}")]
    Transport(String),

    #[error("Request timeout")]
    Timeout,

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl From<reqwest::Error> for OpenAiCompatError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            OpenAiCompatError::Timeout
        } else if e.is_decode() {
            OpenAiCompatError::UnexpectedResponse(e.to_string())
        } else {
            OpenAiCompatError::Transport(e.to_string())
        }
    }
}

impl From<OpenAiCompatError> for GatewayError {
    fn from(e: OpenAiCompatError) -> Self {
        match e {
            OpenAiCompatError::Transport(msg) => GatewayError::ConnectionError(msg),
            OpenAiCompatError::Timeout => GatewayError::Timeout,
            OpenAiCompatError::Status { status, message } => match status {
                401 | 403 => GatewayError::AuthenticationFailed(message),
                429 => GatewayError::RateLimited(message),
                _ => GatewayError::RequestFailed(format!("HTTP {status}: {message}")),
            },
            OpenAiCompatError::Serialization(e) => GatewayError::MalformedResponse(e.to_string()),
            OpenAiCompatError::UnexpectedResponse(msg) => GatewayError::MalformedResponse(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> GatewayError {
        OpenAiCompatError::Status {
            status: code,
            message: "nope".to_string(),
        }
        .into()
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(status(401), GatewayError::AuthenticationFailed(_)));
        assert!(matches!(status(403), GatewayError::AuthenticationFailed(_)));
        assert!(matches!(status(429), GatewayError::RateLimited(_)));
        assert!(matches!(status(500), GatewayError::RequestFailed(ref m) if m.contains("500")));
        assert!(matches!(status(400), GatewayError::RequestFailed(_)));
    }

    #[test]
    fn test_transport_and_body_mapping() {
        assert!(matches!(
            GatewayError::from(OpenAiCompatError::Transport("refused".into())),
            GatewayError::ConnectionError(_)
        ));
        assert_eq!(GatewayError::from(OpenAiCompatError::Timeout), GatewayError::Timeout);

        let bad_json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(
            GatewayError::from(OpenAiCompatError::from(bad_json)),
            GatewayError::MalformedResponse(_)
        ));
    }
}
