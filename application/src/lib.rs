//! Application layer for parley
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{ChatBehavior, RoutingMode};
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    conversation_store::{ConversationStore, SessionHandle},
    llm_gateway::{GatewayError, LlmGateway, StreamHandle},
};
pub use use_cases::advance_turn::{AdvanceTurnError, AdvanceTurnUseCase};
pub use use_cases::turn_stream::TurnStream;
