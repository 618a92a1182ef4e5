//! Domain layer for parley
//!
//! This crate contains the core conversation entities and the built-in tool
//! logic. It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! - **Session**: an ordered transcript of [`Turn`]s keyed by a [`SessionId`].
//!   A system directive, when present, always sits at ordinal 0.
//! - **Persona**: the named system directive new sessions are seeded with.
//! - **Tool Router**: answers arithmetic and string-length queries locally
//!   through typed matchers instead of calling the model.

pub mod core;
pub mod prompt;
pub mod session;
pub mod tool;

// Re-export commonly used types
pub use core::{error::DomainError, model::Model};
pub use prompt::Persona;
pub use session::{
    entities::{Role, Session, Turn},
    generation::GenerationConfig,
    stream::StreamEvent,
    value_objects::SessionId,
};
pub use tool::{
    AmbiguousRouteError, BuiltinTool, RouteDecision, RouteOutcome, TieBreak, ToolDescriptor,
    ToolRouter,
};
