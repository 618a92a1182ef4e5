//! Provider configuration from TOML (`[provider]` section)

use crate::config::error::ConfigError;
use parley_domain::Model;
use serde::{Deserialize, Serialize};

/// Default OpenAI-compatible endpoint (Groq)
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// OpenAI-compatible provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// API base, ending before `/chat/completions`
    pub base_url: String,
    /// Model identifier sent with every request
    pub model: String,
    /// Environment variable holding the API key (default: "GROQ_API_KEY").
    pub api_key_env: String,
    /// Direct API key (not recommended, use the env var instead).
    pub api_key: Option<String>,
    /// HTTP-level timeout for one request
    pub request_timeout_seconds: u64,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: Model::default().to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            api_key: None,
            request_timeout_seconds: 60,
        }
    }
}

impl FileProviderConfig {
    pub fn parse_model(&self) -> Model {
        let Ok(model) = self.model.trim().parse::<Model>();
        model
    }

    /// Resolve the API key from the process environment, then `api_key`.
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    pub(crate) fn resolve_api_key_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<String, ConfigError> {
        let from_env = lookup(&self.api_key_env).filter(|k| !k.trim().is_empty());
        let from_file = self.api_key.clone().filter(|k| !k.trim().is_empty());

        from_env
            .or(from_file)
            .map(|k| k.trim().to_string())
            .ok_or_else(|| ConfigError::MissingCredential {
                env_var: self.api_key_env.clone(),
            })
    }

    pub(crate) fn validate(&self, issues: &mut Vec<ConfigError>) {
        let base = self.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            issues.push(ConfigError::invalid(
                "provider.base_url",
                format!("'{}' is not an http(s) URL", self.base_url),
            ));
        }
        if self.model.trim().is_empty() {
            issues.push(ConfigError::invalid("provider.model", "model name cannot be empty"));
        }
        if self.api_key_env.trim().is_empty() {
            issues.push(ConfigError::invalid(
                "provider.api_key_env",
                "environment variable name cannot be empty",
            ));
        }
        if self.request_timeout_seconds == 0 {
            issues.push(ConfigError::invalid(
                "provider.request_timeout_seconds",
                "timeout cannot be 0",
            ));
        }
    }
}
