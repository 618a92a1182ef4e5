//! Model value object representing a hosted LLM model

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Hosted chat models (Value Object)
///
/// Known identifiers of the default OpenAI-compatible provider are listed
/// as variants; anything else is carried verbatim in [`Model::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Model {
    // Llama models
    Llama3_8b,
    Llama3_70b,
    Llama31_8bInstant,
    Llama33_70bVersatile,
    // Other open-weight models
    Gemma2_9b,
    Mixtral8x7b,
    // Custom
    Custom(String),
}

impl Model {
    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        match self {
            Model::Llama3_8b => "llama3-8b-8192",
            Model::Llama3_70b => "llama3-70b-8192",
            Model::Llama31_8bInstant => "llama-3.1-8b-instant",
            Model::Llama33_70bVersatile => "llama-3.3-70b-versatile",
            Model::Gemma2_9b => "gemma2-9b-it",
            Model::Mixtral8x7b => "mixtral-8x7b-32768",
            Model::Custom(s) => s,
        }
    }

    /// Models known to be served by the default provider
    pub fn known_models() -> Vec<Model> {
        vec![
            Model::Llama3_8b,
            Model::Llama3_70b,
            Model::Llama31_8bInstant,
            Model::Llama33_70bVersatile,
            Model::Gemma2_9b,
            Model::Mixtral8x7b,
        ]
    }

    /// Check if this is a Llama family model
    pub fn is_llama(&self) -> bool {
        matches!(
            self,
            Model::Llama3_8b
                | Model::Llama3_70b
                | Model::Llama31_8bInstant
                | Model::Llama33_70bVersatile
        )
    }
}

impl Default for Model {
    /// Returns the default model (llama3-8b-8192)
    fn default() -> Self {
        Model::Llama3_8b
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "llama3-8b-8192" => Model::Llama3_8b,
            "llama3-70b-8192" => Model::Llama3_70b,
            "llama-3.1-8b-instant" => Model::Llama31_8bInstant,
            "llama-3.3-70b-versatile" => Model::Llama33_70bVersatile,
            "gemma2-9b-it" => Model::Gemma2_9b,
            "mixtral-8x7b-32768" => Model::Mixtral8x7b,
            other => Model::Custom(other.to_string()),
        })
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let Ok(model) = s.parse::<Model>();
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_roundtrip() {
        for model in Model::known_models() {
            let s = model.to_string();
            let parsed: Model = s.parse().unwrap();
            assert_eq!(model, parsed);
        }
    }

    #[test]
    fn test_custom_model() {
        let model: Model = "qwen-2.5-32b".parse().unwrap();
        assert_eq!(model, Model::Custom("qwen-2.5-32b".to_string()));
        assert_eq!(model.to_string(), "qwen-2.5-32b");
    }

    #[test]
    fn test_model_family_detection() {
        assert!(Model::Llama3_8b.is_llama());
        assert!(!Model::Gemma2_9b.is_llama());
        assert!(!Model::Custom("llama-like".into()).is_llama());
    }

    #[test]
    fn test_model_default() {
        assert_eq!(Model::default(), Model::Llama3_8b);
        assert_eq!(Model::default().as_str(), "llama3-8b-8192");
    }

    #[test]
    fn test_model_serde_as_string() {
        let json = serde_json::to_string(&Model::Gemma2_9b).unwrap();
        assert_eq!(json, "\"gemma2-9b-it\"");
        let back: Model = serde_json::from_str("\"mixtral-8x7b-32768\"").unwrap();
        assert_eq!(back, Model::Mixtral8x7b);
    }
}
