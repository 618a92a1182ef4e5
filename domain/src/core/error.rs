//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Session id cannot be empty")]
    EmptySessionId,

    #[error("Temperature must be within [0, 1], got {0}")]
    TemperatureOutOfRange(f32),

    #[error("max_output_tokens must be greater than 0")]
    ZeroMaxOutputTokens,

    #[error("Unknown persona: {0}")]
    UnknownPersona(String),

    #[error("Cannot append a {0} turn after session creation")]
    SystemTurnAppend(&'static str),
}

impl DomainError {
    /// Check if this error comes from generation parameter validation
    pub fn is_generation_config(&self) -> bool {
        matches!(
            self,
            DomainError::TemperatureOutOfRange(_) | DomainError::ZeroMaxOutputTokens
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            DomainError::EmptySessionId.to_string(),
            "Session id cannot be empty"
        );
        assert_eq!(
            DomainError::TemperatureOutOfRange(1.5).to_string(),
            "Temperature must be within [0, 1], got 1.5"
        );
    }

    #[test]
    fn test_is_generation_config() {
        assert!(DomainError::TemperatureOutOfRange(-0.1).is_generation_config());
        assert!(DomainError::ZeroMaxOutputTokens.is_generation_config());
        assert!(!DomainError::EmptySessionId.is_generation_config());
    }
}
