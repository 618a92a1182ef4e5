//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod advance_turn;
pub mod turn_stream;
