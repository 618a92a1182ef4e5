//! Presentation layer for parley
//!
//! This crate contains CLI definitions, output formatters,
//! the progress spinner, and the interactive chat interface.

pub mod chat;
pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use chat::{ChatRepl, ReplCommand, send_and_print};
pub use cli::commands::{Cli, RoutingArg, TieBreakArg};
pub use output::console::ConsoleFormatter;
pub use progress::spinner::ThinkingSpinner;
