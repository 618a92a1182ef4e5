//! Personas: named system directives seeded at the start of a session

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// System behavior for new sessions
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    /// Calm, devoted guide who explains like a warrior of Dharma
    Guide,
    /// Supportive elder-sibling mentor focused on discipline and courage
    Mentor,
    /// Focused explainer who answers with depth and clarity
    #[default]
    Explainer,
    /// No system directive at all
    None,
    /// Caller-supplied directive
    Custom(String),
}

impl Persona {
    /// Names accepted by [`Persona::from_name`]
    pub const NAMES: [&'static str; 4] = ["guide", "mentor", "explainer", "none"];

    pub fn from_name(name: &str) -> Result<Self, DomainError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "guide" => Ok(Persona::Guide),
            "mentor" => Ok(Persona::Mentor),
            "explainer" => Ok(Persona::Explainer),
            "none" => Ok(Persona::None),
            other => Err(DomainError::UnknownPersona(other.to_string())),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Persona::Guide => "guide",
            Persona::Mentor => "mentor",
            Persona::Explainer => "explainer",
            Persona::None => "none",
            Persona::Custom(_) => "custom",
        }
    }

    /// The system directive text, or `None` for [`Persona::None`]
    pub fn system_prompt(&self) -> Option<&str> {
        match self {
            Persona::Guide => Some(
                "You are Bajrang, an extremely powerful, wise, and emotionally intelligent guide \
                 who explains everything to the user like a calm and devoted warrior of Dharma.",
            ),
            Persona::Mentor => Some(
                "You are a wise, emotionally intelligent, and powerful mentor who helps the user \
                 become stronger mentally, spiritually, and emotionally. You believe in the values \
                 of Hanuman ji: discipline, loyalty, and strength. Be supportive and motivating, \
                 guide like an elder sibling who protects and nurtures, and encourage the user to \
                 focus, be fearless, and walk the path of righteousness.",
            ),
            Persona::Explainer => {
                Some("You are a calm, focused AI who explains everything with depth and clarity.")
            }
            Persona::None => None,
            Persona::Custom(text) => Some(text.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_is_case_insensitive() {
        assert_eq!(Persona::from_name("Guide").unwrap(), Persona::Guide);
        assert_eq!(Persona::from_name(" mentor ").unwrap(), Persona::Mentor);
        assert!(matches!(
            Persona::from_name("pirate"),
            Err(DomainError::UnknownPersona(_))
        ));
    }

    #[test]
    fn test_every_named_persona_roundtrips() {
        for name in Persona::NAMES {
            assert_eq!(Persona::from_name(name).unwrap().name(), name);
        }
    }

    #[test]
    fn test_none_has_no_prompt() {
        assert!(Persona::None.system_prompt().is_none());
        assert!(Persona::default().system_prompt().is_some());
    }

    #[test]
    fn test_custom_prompt_is_verbatim() {
        let persona = Persona::Custom("Answer in haiku.".into());
        assert_eq!(persona.system_prompt(), Some("Answer in haiku."));
        assert_eq!(persona.name(), "custom");
    }
}
