//! Structured view of a free-text query, parsed once per routing decision.

use std::sync::LazyLock;

use regex::Regex;

/// First span enclosed in a matching pair of single or double quotes.
static QUOTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"'([^']*)'|"([^"]*)""#).expect("static regex is valid")
});

/// The standalone word "is", any case.
static IS_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bis\b").expect("static regex is valid"));

const TRAILING_PUNCTUATION: &[char] = &['?', '.', '!'];

/// Parsed query structure that tool matchers inspect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryShape {
    raw: String,
    quoted: Option<String>,
    arithmetic_candidate: String,
    follows_is: bool,
}

impl QueryShape {
    pub fn parse(query: &str) -> Self {
        let quoted = QUOTED.captures(query).and_then(|caps| {
            caps.get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str().to_string())
        });

        let last_is = IS_WORD.find_iter(query).last();
        let tail = match last_is {
            Some(m) => &query[m.end()..],
            None => query,
        };
        let arithmetic_candidate = tail
            .trim()
            .trim_end_matches(|c: char| TRAILING_PUNCTUATION.contains(&c) || c.is_whitespace())
            .to_string();

        Self {
            raw: query.to_string(),
            quoted,
            arithmetic_candidate,
            follows_is: last_is.is_some(),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Content of the first quoted span, if any
    pub fn quoted(&self) -> Option<&str> {
        self.quoted.as_deref()
    }

    /// Text that would be handed to the expression evaluator
    pub fn arithmetic_candidate(&self) -> &str {
        &self.arithmetic_candidate
    }

    /// Whether the candidate was taken from after a word "is"
    pub fn follows_is(&self) -> bool {
        self.follows_is
    }
}
