//! Application-level configuration.
//!
//! - [`ChatBehavior`]: responder selection, tie-break and timeout for turns

pub mod chat_behavior;

pub use chat_behavior::{ChatBehavior, RoutingMode};
