//! Behavior configuration from TOML (`[behavior]` section)

use crate::config::error::ConfigError;
use parley_application::{ChatBehavior, RoutingMode};
use parley_domain::TieBreak;
use serde::{Deserialize, Serialize};

/// Raw behavior settings; enum fields stay strings so every bad value can
/// be reported at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBehaviorConfig {
    /// "model", "tools" or "tools_then_model"
    pub routing: String,
    /// "first_registered" or "reject"
    pub tie_break: String,
    /// Upper bound on one model call
    pub timeout_seconds: u64,
}

impl Default for FileBehaviorConfig {
    fn default() -> Self {
        Self {
            routing: RoutingMode::default().to_string(),
            tie_break: "first_registered".to_string(),
            timeout_seconds: 60,
        }
    }
}

impl FileBehaviorConfig {
    pub fn parse_routing(&self) -> Result<RoutingMode, ConfigError> {
        self.routing
            .trim()
            .to_ascii_lowercase()
            .parse()
            .map_err(|e: String| ConfigError::invalid("behavior.routing", e))
    }

    pub fn parse_tie_break(&self) -> Result<TieBreak, ConfigError> {
        self.tie_break
            .trim()
            .to_ascii_lowercase()
            .parse()
            .map_err(|e: String| ConfigError::invalid("behavior.tie_break", e))
    }

    pub fn to_chat_behavior(&self) -> Result<ChatBehavior, ConfigError> {
        if self.timeout_seconds == 0 {
            return Err(ConfigError::invalid("behavior.timeout_seconds", "timeout cannot be 0"));
        }
        Ok(ChatBehavior::default()
            .with_routing(self.parse_routing()?)
            .with_tie_break(self.parse_tie_break()?)
            .with_timeout_seconds(Some(self.timeout_seconds)))
    }

    pub(crate) fn validate(&self, issues: &mut Vec<ConfigError>) {
        if let Err(e) = self.parse_routing() {
            issues.push(e);
        }
        if let Err(e) = self.parse_tie_break() {
            issues.push(e);
        }
        if self.timeout_seconds == 0 {
            issues.push(ConfigError::invalid(
                "behavior.timeout_seconds",
                "timeout cannot be 0",
            ));
        }
    }
}
