//! Chat behavior: how the Turn Processor produces a reply.
//!
//! [`ChatBehavior`] groups the static parameters that control
//! [`AdvanceTurnUseCase`](crate::use_cases::advance_turn::AdvanceTurnUseCase):
//! which responder answers, how ambiguous tool routes are resolved, and how
//! long a model call may take.

use parley_domain::TieBreak;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Who answers a user turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingMode {
    /// Always call the model
    #[default]
    Model,
    /// Only the built-in tools; unmatched queries get the usage hint
    Tools,
    /// A matching tool answers, anything else goes to the model
    ToolsThenModel,
}

impl std::str::FromStr for RoutingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "model" => Ok(RoutingMode::Model),
            "tools" => Ok(RoutingMode::Tools),
            "tools_then_model" | "hybrid" => Ok(RoutingMode::ToolsThenModel),
            other => Err(format!("unknown routing mode '{other}'")),
        }
    }
}

impl std::fmt::Display for RoutingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RoutingMode::Model => "model",
            RoutingMode::Tools => "tools",
            RoutingMode::ToolsThenModel => "tools_then_model",
        })
    }
}

/// Turn Processor control parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatBehavior {
    pub routing: RoutingMode,
    pub tie_break: TieBreak,
    /// Upper bound on one model call (or on the wait for one stream fragment)
    pub timeout: Option<Duration>,
}

impl Default for ChatBehavior {
    fn default() -> Self {
        Self {
            routing: RoutingMode::default(),
            tie_break: TieBreak::default(),
            timeout: Some(Duration::from_secs(60)),
        }
    }
}

impl ChatBehavior {
    // ==================== Builder Methods ====================

    pub fn with_routing(mut self, routing: RoutingMode) -> Self {
        self.routing = routing;
        self
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the timeout from config seconds; `None` or `0` disables it.
    pub fn with_timeout_seconds(self, seconds: Option<u64>) -> Self {
        let timeout = seconds.filter(|s| *s > 0).map(Duration::from_secs);
        self.with_timeout(timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let behavior = ChatBehavior::default();
        assert_eq!(behavior.routing, RoutingMode::Model);
        assert_eq!(behavior.tie_break, TieBreak::FirstRegistered);
        assert_eq!(behavior.timeout, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_routing_mode_parse_and_display() {
        for mode in [RoutingMode::Model, RoutingMode::Tools, RoutingMode::ToolsThenModel] {
            assert_eq!(mode.to_string().parse::<RoutingMode>().unwrap(), mode);
        }
        assert_eq!("hybrid".parse::<RoutingMode>().unwrap(), RoutingMode::ToolsThenModel);
        assert!("magic".parse::<RoutingMode>().is_err());
    }

    #[test]
    fn test_builder() {
        let behavior = ChatBehavior::default()
            .with_routing(RoutingMode::Tools)
            .with_tie_break(TieBreak::Reject)
            .with_timeout(None);
        assert_eq!(behavior.routing, RoutingMode::Tools);
        assert_eq!(behavior.tie_break, TieBreak::Reject);
        assert!(behavior.timeout.is_none());
    }

    #[test]
    fn test_timeout_seconds() {
        let behavior = ChatBehavior::default().with_timeout_seconds(Some(5));
        assert_eq!(behavior.timeout, Some(Duration::from_secs(5)));
        assert!(ChatBehavior::default().with_timeout_seconds(Some(0)).timeout.is_none());
        assert!(ChatBehavior::default().with_timeout_seconds(None).timeout.is_none());
    }
}
