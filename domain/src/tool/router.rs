//! Tool Router: picks at most one built-in tool for a free-text query.
//!
//! Routing is split into an explicit decision ([`ToolRouter::decide`]) and
//! the dispatch that follows it ([`ToolRouter::route`]), so "no match" and
//! "several matches" are states a caller can inspect instead of
//! fallthroughs.

use super::builtin::{BuiltinTool, ToolInputError};
use super::query::QueryShape;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reply when no tool accepts the query
pub const NO_TOOL_MATCHED: &str = "I can only help with arithmetic or string length. \
Try: What is 5 + 5? or How long is the string 'text'?";

/// How to resolve a query that several tools accept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// The earliest registered matching tool wins
    #[default]
    FirstRegistered,
    /// Refuse to pick; report [`AmbiguousRouteError`]
    Reject,
}

impl std::str::FromStr for TieBreak {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first_registered" | "first" => Ok(TieBreak::FirstRegistered),
            "reject" => Ok(TieBreak::Reject),
            other => Err(format!("unknown tie_break '{other}'")),
        }
    }
}

/// Outcome of matching a query against the registered tools
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Matched(BuiltinTool),
    NoMatch,
    /// Every eligible tool, in registration order
    Ambiguous(Vec<BuiltinTool>),
}

/// What happened after routing a query and invoking the chosen tool
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    Answered { tool: BuiltinTool, reply: String },
    /// The chosen tool could not use the input; `reply` is its fixed text
    Rejected {
        tool: BuiltinTool,
        reply: String,
        error: ToolInputError,
    },
    NoMatch,
}

impl RouteOutcome {
    /// Text shown to the user; no match yields [`NO_TOOL_MATCHED`]
    pub fn into_reply(self) -> String {
        match self {
            RouteOutcome::Answered { reply, .. } | RouteOutcome::Rejected { reply, .. } => reply,
            RouteOutcome::NoMatch => NO_TOOL_MATCHED.to_string(),
        }
    }
}

/// More than one tool accepted the query under [`TieBreak::Reject`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("query matches several tools: {}", names(.candidates))]
pub struct AmbiguousRouteError {
    pub candidates: Vec<BuiltinTool>,
}

impl AmbiguousRouteError {
    /// Conversation-preserving reply for the ambiguous case
    pub fn reply(&self) -> String {
        format!(
            "Ambiguous request: matches {}. Please ask about one thing at a time.",
            names(&self.candidates)
        )
    }
}

fn names(tools: &[BuiltinTool]) -> String {
    tools
        .iter()
        .map(|t| t.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Stateless router over an ordered tool list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolRouter {
    tools: Vec<BuiltinTool>,
    tie_break: TieBreak,
}

impl Default for ToolRouter {
    fn default() -> Self {
        Self::new(BuiltinTool::ALL.to_vec())
    }
}

impl ToolRouter {
    /// Create a router; duplicate registrations are ignored
    pub fn new(tools: Vec<BuiltinTool>) -> Self {
        let mut unique = Vec::with_capacity(tools.len());
        for tool in tools {
            if !unique.contains(&tool) {
                unique.push(tool);
            }
        }
        Self {
            tools: unique,
            tie_break: TieBreak::default(),
        }
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn tools(&self) -> &[BuiltinTool] {
        &self.tools
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Match the query against every tool without invoking any
    pub fn decide(&self, query: &str) -> RouteDecision {
        self.decide_shape(&QueryShape::parse(query))
    }

    fn decide_shape(&self, shape: &QueryShape) -> RouteDecision {
        let eligible: Vec<BuiltinTool> = self
            .tools
            .iter()
            .copied()
            .filter(|tool| tool.matches(shape))
            .collect();

        match eligible.as_slice() {
            [] => RouteDecision::NoMatch,
            [only] => RouteDecision::Matched(*only),
            _ => RouteDecision::Ambiguous(eligible),
        }
    }

    /// Decide, then invoke the chosen tool.
    ///
    /// No match yields [`NO_TOOL_MATCHED`]; several matches are resolved by
    /// the configured [`TieBreak`].
    pub fn route(&self, query: &str) -> Result<String, AmbiguousRouteError> {
        self.resolve(query).map(RouteOutcome::into_reply)
    }

    /// Like [`route`](Self::route), but keeps whether the tool accepted its input.
    pub fn resolve(&self, query: &str) -> Result<RouteOutcome, AmbiguousRouteError> {
        let shape = QueryShape::parse(query);
        let tool = match self.decide_shape(&shape) {
            RouteDecision::Matched(tool) => tool,
            RouteDecision::NoMatch => return Ok(RouteOutcome::NoMatch),
            RouteDecision::Ambiguous(candidates) => match self.tie_break {
                TieBreak::FirstRegistered => candidates[0],
                TieBreak::Reject => return Err(AmbiguousRouteError { candidates }),
            },
        };

        Ok(match tool.try_invoke(&shape) {
            Ok(reply) => RouteOutcome::Answered { tool, reply },
            Err(error) => RouteOutcome::Rejected {
                tool,
                reply: tool.invoke_shape(&shape),
                error,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::builtin::CALCULATOR_INVALID_INPUT;

    // Both a quoted span and an arithmetic tail after "is"
    const AMBIGUOUS: &str = "'abc' is 2 + 3";

    #[test]
    fn test_routes_arithmetic() {
        let router = ToolRouter::default();
        assert_eq!(
            router.decide("What is 99 * 3?"),
            RouteDecision::Matched(BuiltinTool::Calculator)
        );
        assert_eq!(router.route("What is 99 * 3?").unwrap(), "297");
    }

    #[test]
    fn test_routes_string_length() {
        let router = ToolRouter::default();
        let reply = router
            .route("How long is the string 'Jai Bajrang Bali'?")
            .unwrap();
        assert!(reply.contains("16"));
    }

    #[test]
    fn test_no_match_returns_usage_hint() {
        let router = ToolRouter::default();
        assert_eq!(router.decide("Tell me a story"), RouteDecision::NoMatch);
        assert_eq!(router.route("Tell me a story").unwrap(), NO_TOOL_MATCHED);
        assert_eq!(router.resolve("Tell me a story").unwrap(), RouteOutcome::NoMatch);
    }

    #[test]
    fn test_unevaluable_arithmetic_gets_invalid_input_reply() {
        let router = ToolRouter::default();
        for query in ["What is banana?", "What is 1 / 0?", "What is 5 +?"] {
            assert_eq!(
                router.decide(query),
                RouteDecision::Matched(BuiltinTool::Calculator),
                "{query}"
            );
            assert_eq!(router.route(query).unwrap(), CALCULATOR_INVALID_INPUT, "{query}");
        }
    }

    #[test]
    fn test_resolve_reports_rejected_input() {
        let router = ToolRouter::default();
        let outcome = router.resolve("What is 1 / 0?").unwrap();
        assert!(matches!(
            outcome,
            RouteOutcome::Rejected {
                tool: BuiltinTool::Calculator,
                error: ToolInputError::Expression(_),
                ..
            }
        ));
        assert_eq!(
            router.resolve("What is 6 / 4?").unwrap(),
            RouteOutcome::Answered {
                tool: BuiltinTool::Calculator,
                reply: "1.5".to_string(),
            }
        );
    }

    #[test]
    fn test_ambiguous_is_explicit() {
        let router = ToolRouter::default();
        assert_eq!(
            router.decide(AMBIGUOUS),
            RouteDecision::Ambiguous(vec![BuiltinTool::Calculator, BuiltinTool::StringLength])
        );
    }

    #[test]
    fn test_first_registered_wins() {
        let router = ToolRouter::default();
        assert_eq!(router.route(AMBIGUOUS).unwrap(), "5");

        let reversed =
            ToolRouter::new(vec![BuiltinTool::StringLength, BuiltinTool::Calculator]);
        assert_eq!(reversed.route(AMBIGUOUS).unwrap(), "Length of string: 3");
    }

    #[test]
    fn test_reject_tie_break() {
        let router = ToolRouter::default().with_tie_break(TieBreak::Reject);
        let err = router.route(AMBIGUOUS).unwrap_err();
        assert_eq!(err.candidates.len(), 2);
        assert!(err.reply().contains("Calculator, StringLength"));
        // Unambiguous queries are unaffected
        assert_eq!(router.route("What is 2 * 2?").unwrap(), "4");
    }

    #[test]
    fn test_only_registered_tools_are_considered() {
        let router = ToolRouter::new(vec![BuiltinTool::StringLength]);
        assert_eq!(router.decide("What is 2 + 2?"), RouteDecision::NoMatch);
    }

    #[test]
    fn test_duplicate_registration_ignored() {
        let router = ToolRouter::new(vec![BuiltinTool::Calculator, BuiltinTool::Calculator]);
        assert_eq!(router.tools(), &[BuiltinTool::Calculator]);
    }

    #[test]
    fn test_tie_break_from_str() {
        assert_eq!("reject".parse::<TieBreak>().unwrap(), TieBreak::Reject);
        assert_eq!(
            "first_registered".parse::<TieBreak>().unwrap(),
            TieBreak::FirstRegistered
        );
        assert!("random".parse::<TieBreak>().is_err());
    }
}
