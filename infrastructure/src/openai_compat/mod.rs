//! OpenAI-compatible chat completions adapter (Groq, OpenAI, local servers).

pub mod error;
pub mod gateway;
pub mod protocol;

pub use error::OpenAiCompatError;
pub use gateway::OpenAiCompatGateway;
