//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Conversion into domain and application types happens through the
//! `parse_*` / `to_*` methods, which is also where validation lives.

mod behavior;
mod generation;
mod logging;
mod provider;
mod repl;
mod session;

pub use behavior::FileBehaviorConfig;
pub use generation::FileGenerationConfig;
pub use logging::FileLoggingConfig;
pub use provider::{DEFAULT_BASE_URL, FileProviderConfig};
pub use repl::FileReplConfig;
pub use session::{DEFAULT_SESSION_CAPACITY, FileSessionConfig};

use super::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// OpenAI-compatible endpoint, model and credential
    pub provider: FileProviderConfig,
    /// Sampling parameters
    pub generation: FileGenerationConfig,
    /// Session store and persona
    pub session: FileSessionConfig,
    /// Responder selection and timeouts
    pub behavior: FileBehaviorConfig,
    /// Conversation log output
    pub logging: FileLoggingConfig,
    /// REPL settings
    pub repl: FileReplConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// The credential is not checked here; see
    /// [`FileProviderConfig::resolve_api_key`].
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut issues = Vec::new();
        self.provider.validate(&mut issues);
        self.generation.validate(&mut issues);
        self.session.validate(&mut issues);
        self.behavior.validate(&mut issues);
        issues
    }
}
