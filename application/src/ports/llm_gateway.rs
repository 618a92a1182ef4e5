//! LLM Gateway port
//!
//! Defines the interface for communicating with the hosted model (the
//! Model Abstraction). Implementations live in the infrastructure layer.

use async_trait::async_trait;
use parley_domain::{GenerationConfig, Model, StreamEvent, Turn};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

impl GatewayError {
    /// Whether repeating the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayError::ConnectionError(_) | GatewayError::RateLimited(_) | GatewayError::Timeout
        )
    }

    /// Short machine-readable kind, used in conversation logs
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::ConnectionError(_) => "connection",
            GatewayError::AuthenticationFailed(_) => "authentication",
            GatewayError::RateLimited(_) => "rate_limited",
            GatewayError::RequestFailed(_) => "request_failed",
            GatewayError::MalformedResponse(_) => "malformed_response",
            GatewayError::Timeout => "timeout",
            GatewayError::Other(_) => "other",
        }
    }
}

/// Handle for receiving streaming events from the gateway.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// A stream that yields one `Completed` event carrying `text`.
    pub fn completed(text: String) -> Self {
        let (tx, rx) = mpsc::channel(1);
        // Capacity 1 and a fresh channel: try_send cannot fail here
        let _ = tx.try_send(StreamEvent::Completed(text));
        Self::new(rx)
    }

    /// Receive the next event, `None` once the sender is gone.
    pub async fn recv(&mut self) -> Option<StreamEvent> {
        self.receiver.recv().await
    }
}

/// Gateway for model communication
///
/// `generate` receives the full ordered transcript (system directive first)
/// and returns the assistant reply.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Model this gateway sends requests to
    fn model(&self) -> &Model;

    /// Generate one complete reply
    async fn generate(
        &self,
        turns: &[Turn],
        config: &GenerationConfig,
    ) -> Result<String, GatewayError>;

    /// Generate a reply delivered fragment by fragment.
    ///
    /// Default implementation calls `generate()` and wraps the result in a
    /// single `Completed` event, so non-streaming adapters work unchanged.
    async fn generate_streaming(
        &self,
        turns: &[Turn],
        config: &GenerationConfig,
    ) -> Result<StreamHandle, GatewayError> {
        let text = self.generate(turns, config).await?;
        Ok(StreamHandle::completed(text))
    }

    /// Models the provider can serve (REPL `/models`)
    async fn available_models(&self) -> Result<Vec<Model>, GatewayError> {
        Ok(vec![self.model().clone()])
    }
}
