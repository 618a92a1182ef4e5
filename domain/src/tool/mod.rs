//! Tool domain module
//!
//! Built-in tools answer narrowly-shaped queries without calling the model.
//!
//! ```text
//! query ──▶ QueryShape ──▶ ToolRouter::decide ──▶ RouteDecision
//!                                │                  ├─ Matched(tool) ─▶ BuiltinTool::invoke
//!                                │                  ├─ NoMatch       ─▶ usage hint
//!                                │                  └─ Ambiguous(..) ─▶ TieBreak
//! ```
//!
//! | Tool | Matches when | Unusable input |
//! |------|--------------|----------------|
//! | `Calculator` | unquoted text follows the last word "is", or the query is a bare expression | fixed invalid-input reply |
//! | `StringLength` | the query contains a quoted span | fixed usage reply |
//!
//! Arithmetic goes through the restricted-grammar parser in [`expression`];
//! nothing else is ever evaluated.

pub mod builtin;
pub mod expression;
pub mod query;
pub mod router;

pub use builtin::{BuiltinTool, ToolDescriptor, ToolInputError};
pub use expression::ExpressionError;
pub use query::QueryShape;
pub use router::{AmbiguousRouteError, RouteDecision, RouteOutcome, TieBreak, ToolRouter};
