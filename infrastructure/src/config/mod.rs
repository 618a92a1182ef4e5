//! Configuration file loading for parley
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `PARLEY_` environment variables (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./parley.toml` or `./.parley.toml`
//! 4. Global: `$XDG_CONFIG_HOME/parley/config.toml`
//! 5. Default values

mod error;
mod file_config;
mod loader;

pub use error::ConfigError;
pub use file_config::{
    DEFAULT_BASE_URL, DEFAULT_SESSION_CAPACITY, FileBehaviorConfig, FileConfig,
    FileGenerationConfig, FileLoggingConfig, FileProviderConfig, FileReplConfig,
    FileSessionConfig,
};
pub use loader::{ConfigLoader, ENV_PREFIX};
