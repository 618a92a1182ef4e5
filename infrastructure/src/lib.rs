//! Infrastructure layer for parley
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod memory;
pub mod openai_compat;

// Re-export commonly used types
pub use config::{ConfigError, ConfigLoader, FileConfig, FileReplConfig};
pub use logging::JsonlConversationLogger;
pub use memory::InMemoryConversationStore;
pub use openai_compat::{OpenAiCompatError, OpenAiCompatGateway};
