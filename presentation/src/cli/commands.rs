//! CLI command definitions

use clap::{Parser, ValueEnum};
use parley_application::RoutingMode;
use parley_domain::TieBreak;
use std::path::PathBuf;

/// Who answers, as accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoutingArg {
    /// Always ask the model
    Model,
    /// Only the built-in calculator and string-length tools
    Tools,
    /// A matching tool answers, anything else goes to the model
    Hybrid,
}

impl From<RoutingArg> for RoutingMode {
    fn from(arg: RoutingArg) -> Self {
        match arg {
            RoutingArg::Model => RoutingMode::Model,
            RoutingArg::Tools => RoutingMode::Tools,
            RoutingArg::Hybrid => RoutingMode::ToolsThenModel,
        }
    }
}

/// Tie-break for queries several tools accept
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TieBreakArg {
    /// The first registered tool answers
    First,
    /// Reply that the request is ambiguous
    Reject,
}

impl From<TieBreakArg> for TieBreak {
    fn from(arg: TieBreakArg) -> Self {
        match arg {
            TieBreakArg::First => TieBreak::FirstRegistered,
            TieBreakArg::Reject => TieBreak::Reject,
        }
    }
}

/// CLI arguments for parley
#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(author, version, about = "Conversational shell for OpenAI-compatible chat models")]
#[command(long_about = r#"
Parley keeps a conversation with a hosted chat model (Groq by default) and
answers simple arithmetic and string-length questions with built-in tools.

Each session id has its own transcript; every message is sent to the model
together with the full history of that session.

The API key is read from $GROQ_API_KEY (see provider.api_key_env).

Configuration files are loaded from (in priority order):
1. PARLEY_* environment variables (e.g. PARLEY_GENERATION__TEMPERATURE=0.2)
2. --config <path>     Explicit config file
3. ./parley.toml       Project-level config
4. ~/.config/parley/config.toml   Global config

Example:
  parley "Who is Hanuman?"
  parley --routing tools "What is 99 * 3?"
  parley --chat --persona guide --stream
"#)]
pub struct Cli {
    /// The message to send (not required in chat mode)
    pub question: Option<String>,

    /// Start interactive chat mode
    #[arg(short, long)]
    pub chat: bool,

    /// Session id to talk in
    #[arg(short, long, value_name = "ID", default_value = "default")]
    pub session: String,

    /// Model identifier (e.g. llama3-8b-8192)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Persona for new sessions: guide, mentor, explainer or none
    #[arg(short, long, value_name = "NAME")]
    pub persona: Option<String>,

    /// Free-form system prompt (overrides --persona)
    #[arg(long, value_name = "TEXT")]
    pub system_prompt: Option<String>,

    /// Sampling temperature in [0, 1]
    #[arg(short, long, value_name = "T")]
    pub temperature: Option<f32>,

    /// Maximum reply length in tokens
    #[arg(long, value_name = "N")]
    pub max_tokens: Option<u32>,

    /// Print the reply while it is generated
    #[arg(long)]
    pub stream: bool,

    /// Who answers messages
    #[arg(short, long, value_enum)]
    pub routing: Option<RoutingArg>,

    /// What to do when several tools accept a message
    #[arg(long, value_enum)]
    pub tie_break: Option<TieBreakArg>,

    /// Seconds to wait for the model before giving up
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Write diagnostic logs to this file as well
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Append conversation events as JSON lines to this file
    #[arg(long, value_name = "PATH")]
    pub conversation_log: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
