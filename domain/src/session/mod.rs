//! Conversation session domain.
//!
//! - [`entities::Session`]: an ordered transcript for one session id
//! - [`entities::Turn`]: a single message within a session
//! - [`value_objects::SessionId`]: opaque, non-empty session key
//! - [`generation::GenerationConfig`]: per-call sampling parameters
//! - [`stream::StreamEvent`]: fragments of a streamed reply

pub mod entities;
pub mod generation;
pub mod stream;
pub mod value_objects;
