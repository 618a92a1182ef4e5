//! Restricted arithmetic expression parser.
//!
//! Only numeric literals, `+ - * /`, unary sign and parentheses are
//! accepted. Evaluation is a pure fold over the parsed tree; nothing in the
//! input can name a function, variable or any other construct.
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := factor (('*' | '/') factor)*
//! factor := ('-' | '+') factor | number | '(' expr ')'
//! number := digits ['.' digits]
//! ```

use thiserror::Error;

/// Maximum nesting of parentheses and unary signs.
const MAX_DEPTH: usize = 64;

/// Reasons an expression is rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("empty expression")]
    Empty,

    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("malformed number '{0}'")]
    MalformedNumber(String),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unexpected token {0}")]
    UnexpectedToken(String),

    #[error("unbalanced parentheses")]
    UnbalancedParens,

    #[error("division by zero")]
    DivisionByZero,

    #[error("result is not a finite number")]
    NonFinite,

    #[error("expression nested deeper than {MAX_DEPTH} levels")]
    TooDeep,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{n}"),
            Token::Plus => f.write_str("'+'"),
            Token::Minus => f.write_str("'-'"),
            Token::Star => f.write_str("'*'"),
            Token::Slash => f.write_str("'/'"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, ExpressionError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '0'..='9' | '.' => {
                let mut literal = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        literal.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Number(parse_number(&literal)?));
            }
            '+' | '-' | '*' | '/' | '(' | ')' => {
                tokens.push(match ch {
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' => Token::Star,
                    '/' => Token::Slash,
                    '(' => Token::LParen,
                    _ => Token::RParen,
                });
                chars.next();
            }
            other => return Err(ExpressionError::UnexpectedChar { ch: other, pos }),
        }
    }

    Ok(tokens)
}

fn parse_number(literal: &str) -> Result<f64, ExpressionError> {
    // digits ['.' digits]: no leading/trailing dot, at most one dot
    let mut parts = literal.split('.');
    let whole = parts.next().unwrap_or_default();
    let frac = parts.next();
    let valid = !whole.is_empty()
        && parts.next().is_none()
        && frac.is_none_or(|f| !f.is_empty());
    if !valid {
        return Err(ExpressionError::MalformedNumber(literal.to_string()));
    }
    literal
        .parse::<f64>()
        .map_err(|_| ExpressionError::MalformedNumber(literal.to_string()))
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expr(&mut self) -> Result<f64, ExpressionError> {
        let mut value = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.bump();
            let rhs = self.term()?;
            value = if op == Token::Plus { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, ExpressionError> {
        let mut value = self.factor()?;
        while let Some(op @ (Token::Star | Token::Slash)) = self.peek() {
            self.bump();
            let rhs = self.factor()?;
            value = if op == Token::Star {
                value * rhs
            } else {
                if rhs == 0.0 {
                    return Err(ExpressionError::DivisionByZero);
                }
                value / rhs
            };
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64, ExpressionError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ExpressionError::TooDeep);
        }
        let result = match self.bump() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::Minus) => self.factor().map(|v| -v),
            Some(Token::Plus) => self.factor(),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                match self.bump() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(ExpressionError::UnbalancedParens),
                }
            }
            Some(Token::RParen) => Err(ExpressionError::UnbalancedParens),
            Some(other) => Err(ExpressionError::UnexpectedToken(other.to_string())),
            None => Err(ExpressionError::UnexpectedEnd),
        };
        self.depth -= 1;
        result
    }
}

/// Parse and evaluate an arithmetic expression.
pub fn evaluate(input: &str) -> Result<f64, ExpressionError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ExpressionError::Empty);
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;

    if let Some(extra) = parser.peek() {
        return Err(match extra {
            Token::RParen => ExpressionError::UnbalancedParens,
            other => ExpressionError::UnexpectedToken(other.to_string()),
        });
    }
    if !value.is_finite() {
        return Err(ExpressionError::NonFinite);
    }
    Ok(value)
}

/// Render a result the way a person would write it: `297`, `2.5`, `-0.125`.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        // -0.0 prints as "0"
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
