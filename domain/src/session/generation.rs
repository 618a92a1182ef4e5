//! Generation parameters passed to the model on every request

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Sampling and delivery parameters for one model call (Value Object)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Sampling randomness, within [0, 1]
    pub temperature: f32,
    /// Upper bound on reply length in tokens
    pub max_output_tokens: u32,
    /// Deliver the reply fragment by fragment
    pub streaming: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: 300,
            streaming: false,
        }
    }
}

impl GenerationConfig {
    /// Build a validated config
    pub fn new(temperature: f32, max_output_tokens: u32, streaming: bool) -> Result<Self, DomainError> {
        let config = Self {
            temperature,
            max_output_tokens,
            streaming,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(DomainError::TemperatureOutOfRange(self.temperature));
        }
        if self.max_output_tokens == 0 {
            return Err(DomainError::ZeroMaxOutputTokens);
        }
        Ok(())
    }

    // ==================== Builder Methods ====================

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = max;
        self
    }

    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }
}
