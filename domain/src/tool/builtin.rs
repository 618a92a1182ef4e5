//! Built-in tools and their typed matchers.

use super::expression::{self, ExpressionError};
use super::query::QueryShape;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reply when the calculator cannot evaluate its input
pub const CALCULATOR_INVALID_INPUT: &str = "Invalid input. Please use format like: What is 5 + 5?";

/// Reply when the string-length tool finds no quoted span
pub const STRING_LENGTH_USAGE: &str = "Invalid format. Use: How long is the string 'text'?";

/// Name, description and contract of a tool (documentation and routing)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    /// Shape of input the tool expects
    pub usage: &'static str,
}

/// Input a tool could not use.
///
/// Never surfaced to the caller as a failure: [`BuiltinTool::invoke`]
/// converts it to the tool's fixed reply.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolInputError {
    #[error("invalid arithmetic expression: {0}")]
    Expression(#[from] ExpressionError),

    #[error("no quoted text found")]
    NoQuotedSpan,
}

/// The fixed set of tools the router can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinTool {
    Calculator,
    StringLength,
}

impl BuiltinTool {
    /// All built-in tools in registration order
    pub const ALL: [BuiltinTool; 2] = [BuiltinTool::Calculator, BuiltinTool::StringLength];

    pub fn descriptor(&self) -> ToolDescriptor {
        match self {
            BuiltinTool::Calculator => ToolDescriptor {
                name: "Calculator",
                description: "Use this to perform basic math calculations like addition or multiplication.",
                usage: "What is 5 + 5?",
            },
            BuiltinTool::StringLength => ToolDescriptor {
                name: "StringLength",
                description: "Use this to find the length of a string inside quotes.",
                usage: "How long is the string 'text'?",
            },
        }
    }

    pub fn name(&self) -> &'static str {
        self.descriptor().name
    }

    /// Whether the query has the shape this tool understands.
    ///
    /// Matching looks at shape only; a matched calculator query may still
    /// fail to evaluate and get [`CALCULATOR_INVALID_INPUT`].
    pub fn matches(&self, shape: &QueryShape) -> bool {
        match self {
            BuiltinTool::Calculator => looks_arithmetic(shape),
            BuiltinTool::StringLength => shape.quoted().is_some(),
        }
    }

    /// Run the tool, reporting unusable input as a typed error
    pub fn try_invoke(&self, shape: &QueryShape) -> Result<String, ToolInputError> {
        match self {
            BuiltinTool::Calculator => {
                let value = expression::evaluate(shape.arithmetic_candidate())?;
                Ok(expression::format_number(value))
            }
            BuiltinTool::StringLength => {
                let text = shape.quoted().ok_or(ToolInputError::NoQuotedSpan)?;
                Ok(format!("Length of string: {}", text.chars().count()))
            }
        }
    }

    /// Run the tool; unusable input becomes the tool's fixed reply
    pub fn invoke(&self, query: &str) -> String {
        self.invoke_shape(&QueryShape::parse(query))
    }

    pub fn invoke_shape(&self, shape: &QueryShape) -> String {
        self.try_invoke(shape).unwrap_or_else(|_| self.fallback_reply().to_string())
    }

    fn fallback_reply(&self) -> &'static str {
        match self {
            BuiltinTool::Calculator => CALCULATOR_INVALID_INPUT,
            BuiltinTool::StringLength => STRING_LENGTH_USAGE,
        }
    }
}

/// "What is <x>" with an unquoted `x`, or a bare run of expression characters
fn looks_arithmetic(shape: &QueryShape) -> bool {
    let candidate = shape.arithmetic_candidate();
    if candidate.is_empty() || candidate.contains(['\'', '"']) {
        return false;
    }
    shape.follows_is()
        || (candidate.chars().any(|c| c.is_ascii_digit())
            && candidate.chars().all(is_expression_char))
}

fn is_expression_char(c: char) -> bool {
    c.is_ascii_digit() || c.is_whitespace() || "+-*/().".contains(c)
}

impl std::fmt::Display for BuiltinTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculator_evaluates_embedded_expression() {
        let reply = BuiltinTool::Calculator.invoke("What is 99 * 3?");
        assert!(reply.contains("297"));
    }

    #[test]
    fn test_calculator_invalid_input() {
        assert_eq!(
            BuiltinTool::Calculator.invoke("What is banana?"),
            CALCULATOR_INVALID_INPUT
        );
        assert_eq!(
            BuiltinTool::Calculator.invoke("What is 1 / 0?"),
            CALCULATOR_INVALID_INPUT
        );
    }

    #[test]
    fn test_calculator_typed_error() {
        let shape = QueryShape::parse("What is banana?");
        assert!(matches!(
            BuiltinTool::Calculator.try_invoke(&shape),
            Err(ToolInputError::Expression(_))
        ));
    }

    #[test]
    fn test_string_length_counts_characters() {
        let reply = BuiltinTool::StringLength.invoke("How long is the string 'Jai Bajrang Bali'?");
        assert_eq!(reply, "Length of string: 16");
    }

    #[test]
    fn test_string_length_counts_chars_not_bytes() {
        let reply = BuiltinTool::StringLength.invoke("How long is \"हनुमान\"?");
        assert_eq!(reply, "Length of string: 6");
    }

    #[test]
    fn test_string_length_usage_hint() {
        assert_eq!(
            BuiltinTool::StringLength.invoke("How long is my name?"),
            STRING_LENGTH_USAGE
        );
    }

    #[test]
    fn test_matchers() {
        let math = QueryShape::parse("What is 12 * 8?");
        let text = QueryShape::parse("How long is 'Hanuman Bhakt'?");
        assert!(BuiltinTool::Calculator.matches(&math));
        assert!(!BuiltinTool::StringLength.matches(&math));
        assert!(BuiltinTool::StringLength.matches(&text));
        assert!(!BuiltinTool::Calculator.matches(&text));
    }

    #[test]
    fn test_calculator_matches_on_shape_not_result() {
        for query in ["What is banana?", "What is 1 / 0?", "What is 5 +?", "8 * (2 + 1)", "7 /"] {
            assert!(BuiltinTool::Calculator.matches(&QueryShape::parse(query)), "{query}");
        }
        for query in ["Tell me a story", "I have 3 cats", "What is?", "What is 'x'?"] {
            assert!(!BuiltinTool::Calculator.matches(&QueryShape::parse(query)), "{query}");
        }
    }

    #[test]
    fn test_descriptors_have_unique_names() {
        let names: std::collections::HashSet<_> =
            BuiltinTool::ALL.iter().map(|t| t.name()).collect();
        assert_eq!(names.len(), BuiltinTool::ALL.len());
    }
}
