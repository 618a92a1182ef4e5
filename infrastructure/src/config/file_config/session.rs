//! Session configuration from TOML (`[session]` section)

use crate::config::error::ConfigError;
use parley_domain::Persona;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// Default number of sessions kept in memory
pub const DEFAULT_SESSION_CAPACITY: usize = 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSessionConfig {
    /// Maximum live sessions before least-recently-used eviction
    pub capacity: usize,
    /// Named persona: "guide", "mentor", "explainer" or "none"
    pub persona: String,
    /// Free-form system directive; overrides `persona` when set
    pub system_prompt: Option<String>,
}

impl Default for FileSessionConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_SESSION_CAPACITY,
            persona: Persona::default().name().to_string(),
            system_prompt: None,
        }
    }
}

impl FileSessionConfig {
    pub fn parse_capacity(&self) -> Result<NonZeroUsize, ConfigError> {
        NonZeroUsize::new(self.capacity)
            .ok_or_else(|| ConfigError::invalid("session.capacity", "capacity must be greater than 0"))
    }

    pub fn parse_persona(&self) -> Result<Persona, ConfigError> {
        if let Some(prompt) = self.system_prompt.as_deref().map(str::trim)
            && !prompt.is_empty()
        {
            return Ok(Persona::Custom(prompt.to_string()));
        }
        Persona::from_name(&self.persona).map_err(|e| {
            ConfigError::invalid(
                "session.persona",
                format!("{e} (valid: {})", Persona::NAMES.join(", ")),
            )
        })
    }

    pub(crate) fn validate(&self, issues: &mut Vec<ConfigError>) {
        if let Err(e) = self.parse_capacity() {
            issues.push(e);
        }
        if let Err(e) = self.parse_persona() {
            issues.push(e);
        }
    }
}
