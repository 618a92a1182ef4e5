//! Configuration errors

use parley_domain::DomainError;
use thiserror::Error;

/// Problems found while loading or validating configuration.
///
/// All of these are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no API key found: set the {env_var} environment variable or provider.api_key")]
    MissingCredential { env_var: String },

    #[error("{field}: {message}")]
    InvalidValue { field: &'static str, message: String },

    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field,
            message: message.into(),
        }
    }

    pub(crate) fn from_domain(field: &'static str, error: DomainError) -> Self {
        Self::invalid(field, error.to_string())
    }
}
