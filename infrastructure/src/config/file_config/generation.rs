//! Generation configuration from TOML (`[generation]` section)

use crate::config::error::ConfigError;
use parley_domain::GenerationConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// Print replies while they are generated
    pub streaming: bool,
}

impl Default for FileGenerationConfig {
    fn default() -> Self {
        let defaults = GenerationConfig::default();
        Self {
            temperature: defaults.temperature,
            max_output_tokens: defaults.max_output_tokens,
            streaming: defaults.streaming,
        }
    }
}

impl FileGenerationConfig {
    pub fn to_generation_config(&self) -> Result<GenerationConfig, ConfigError> {
        GenerationConfig::new(self.temperature, self.max_output_tokens, self.streaming)
            .map_err(|e| ConfigError::from_domain("generation", e))
    }

    pub(crate) fn validate(&self, issues: &mut Vec<ConfigError>) {
        if let Err(e) = self.to_generation_config() {
            issues.push(e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_domain() {
        let config = FileGenerationConfig::default().to_generation_config().unwrap();
        assert_eq!(config, GenerationConfig::default());
    }

    #[test]
    fn test_out_of_range_temperature_rejected() {
        let config = FileGenerationConfig {
            temperature: 1.5,
            ..Default::default()
        };
        let err = config.to_generation_config().unwrap_err();
        assert!(err.to_string().contains("1.5"));
    }
}
