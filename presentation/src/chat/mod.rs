//! Interactive chat module
//!
//! Provides a readline-based interactive chat interface, plus the
//! send-and-print step shared with one-shot mode.

mod exchange;
mod repl;

pub use exchange::send_and_print;
pub use repl::{ChatRepl, ReplCommand};
