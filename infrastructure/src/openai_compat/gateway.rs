//! OpenAI-compatible LLM Gateway implementation

use super::error::{OpenAiCompatError, Result};
use super::protocol::{self, ChatCompletionRequest, ChatCompletionResponse, SseEvent};
use async_trait::async_trait;
use futures::StreamExt;
use parley_application::ports::llm_gateway::{GatewayError, LlmGateway, StreamHandle};
use parley_domain::{GenerationConfig, Model, StreamEvent, Turn};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

/// Buffered stream events between the reader task and the consumer
const STREAM_CHANNEL_CAPACITY: usize = 64;

/// LLM Gateway for any `/chat/completions` endpoint (Groq by default)
pub struct OpenAiCompatGateway {
    client: reqwest::Client,
    chat_url: String,
    api_key: String,
    model: Model,
}

impl OpenAiCompatGateway {
    /// Create a gateway.
    ///
    /// `base_url` ends before `/chat/completions`, e.g.
    /// `https://api.groq.com/openai/v1`.
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        model: Model,
        request_timeout: Option<Duration>,
    ) -> std::result::Result<Self, GatewayError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;

        let chat_url = format!("{}/chat/completions", base_url.trim_end_matches('/'));
        info!(url = %chat_url, model = %model, "OpenAiCompatGateway initialized");

        Ok(Self {
            client,
            chat_url,
            api_key: api_key.into(),
            model,
        })
    }

    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }

    async fn send(
        &self,
        turns: &[Turn],
        config: &GenerationConfig,
        stream: bool,
    ) -> Result<reqwest::Response> {
        let body = ChatCompletionRequest::new(self.model.as_str(), turns, config, stream);
        debug!(
            model = %self.model,
            messages = body.messages.len(),
            stream,
            "Sending chat completion request"
        );
        trace!(request_body = ?body, "full completion request");

        let response = self
            .client
            .post(&self.chat_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(OpenAiCompatError::Status {
                status: status.as_u16(),
                message: protocol::error_message(&text),
            });
        }
        Ok(response)
    }

    async fn complete(&self, turns: &[Turn], config: &GenerationConfig) -> Result<String> {
        let response = self.send(turns, config, false).await?;
        let text = response.text().await?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&text)?;
        parsed.into_reply()
    }
}

/// Pump SSE bytes into stream events until `[DONE]` or the body ends.
async fn forward_sse(response: reqwest::Response, tx: mpsc::Sender<StreamEvent>) {
    let mut bytes = response.bytes_stream();
    let mut buf: Vec<u8> = Vec::new();
    let mut full_text = String::new();

    while let Some(chunk) = bytes.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                let err = GatewayError::from(OpenAiCompatError::from(e));
                warn!("Stream interrupted: {}", err);
                let _ = tx.send(StreamEvent::Error(err.to_string())).await;
                return;
            }
        };
        buf.extend_from_slice(&chunk);

        for event in protocol::drain_complete_sse_lines(&mut buf) {
            match event {
                Ok(SseEvent::Delta(text)) if text.is_empty() => {}
                Ok(SseEvent::Delta(text)) => {
                    full_text.push_str(&text);
                    if tx.send(StreamEvent::Delta(text)).await.is_err() {
                        // Receiver dropped: nobody is listening any more
                        return;
                    }
                }
                Ok(SseEvent::Done) => {
                    let _ = tx.send(StreamEvent::Completed(full_text)).await;
                    return;
                }
                Err(e) => {
                    let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                    return;
                }
            }
        }
    }

    debug!("Stream body ended without [DONE]");
    let _ = tx.send(StreamEvent::Completed(full_text)).await;
}

#[async_trait]
impl LlmGateway for OpenAiCompatGateway {
    fn model(&self) -> &Model {
        &self.model
    }

    async fn generate(
        &self,
        turns: &[Turn],
        config: &GenerationConfig,
    ) -> std::result::Result<String, GatewayError> {
        self.complete(turns, config).await.map_err(GatewayError::from)
    }

    async fn generate_streaming(
        &self,
        turns: &[Turn],
        config: &GenerationConfig,
    ) -> std::result::Result<StreamHandle, GatewayError> {
        let response = self.send(turns, config, true).await?;
        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        tokio::spawn(forward_sse(response, tx));
        Ok(StreamHandle::new(rx))
    }

    async fn available_models(&self) -> std::result::Result<Vec<Model>, GatewayError> {
        let mut models = Model::known_models();
        if !models.contains(&self.model) {
            models.insert(0, self.model.clone());
        }
        Ok(models)
    }
}
