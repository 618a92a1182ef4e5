//! Chat Completions wire format and SSE framing.
//!
//! Request body:
//!
//! ```json
//! {"model": "...", "messages": [{"role": "system", "content": "..."}, ...],
//!  "temperature": 0.7, "max_tokens": 300, "stream": false}
//! ```
//!
//! A streamed reply arrives as `data: {json}` lines terminated by
//! `data: [DONE]`; the text sits in `choices[0].delta.content`.

use super::error::{OpenAiCompatError, Result};
use parley_domain::{GenerationConfig, Turn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub stream: bool,
}

impl<'a> ChatCompletionRequest<'a> {
    pub fn new(model: &'a str, turns: &'a [Turn], config: &GenerationConfig, stream: bool) -> Self {
        Self {
            model,
            messages: turns
                .iter()
                .map(|turn| ChatMessage {
                    role: turn.role.as_str(),
                    content: &turn.content,
                })
                .collect(),
            temperature: config.temperature,
            max_tokens: config.max_output_tokens,
            stream,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Text of the first choice
    pub fn into_reply(self) -> Result<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                OpenAiCompatError::UnexpectedResponse("no choices[0].message.content".to_string())
            })
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// `{"error": {"message": "..."}}` as returned with non-2xx statuses
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Human-readable message from an error response body
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

/// One decoded SSE event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// Text fragment (may be empty for role-only or finish chunks)
    Delta(String),
    Done,
}

/// Parse a single complete SSE line.
///
/// Returns `None` for blank lines, comments and non-`data:` fields.
pub fn parse_sse_data_line(line: &str) -> Option<Result<SseEvent>> {
    let data = line.strip_prefix("data:")?.trim();
    if data.is_empty() {
        return None;
    }
    if data == "[DONE]" {
        return Some(Ok(SseEvent::Done));
    }

    let chunk = match serde_json::from_str::<ChatCompletionChunk>(data) {
        Ok(chunk) => chunk,
        Err(e) => return Some(Err(e.into())),
    };
    let text = chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .unwrap_or_default();
    Some(Ok(SseEvent::Delta(text)))
}

/// Drain all complete `\n`-terminated lines from `buf`.
///
/// A trailing incomplete line stays in `buf` for the next network chunk.
/// The buffer holds raw bytes so a multi-byte character split across chunks
/// is decoded only once it is whole.
pub fn drain_complete_sse_lines(buf: &mut Vec<u8>) -> Vec<Result<SseEvent>> {
    let mut events = Vec::new();
    while let Some(nl_pos) = buf.iter().position(|&b| b == b'\n') {
        let line: Vec<u8> = buf.drain(..=nl_pos).collect();
        let line = String::from_utf8_lossy(&line);
        let line = line.trim_end_matches(['\n', '\r']);
        if let Some(event) = parse_sse_data_line(line) {
            events.push(event);
        }
    }
    events
}
