//! Restricted expression evaluator for variable bindings.
//!
//! A binding's expression is compiled against a fixed grammar rather than
//! handed to a general-purpose interpreter. Checked in order:
//!
//! 1. empty string - no program; the binding is a plain passthrough whose
//!    value is read from the session,
//! 2. `true` / `false` - boolean constant,
//! 3. a double-quoted literal - the unquoted string constant,
//! 4. a numeric literal - that number,
//! 5. anything else - a small expression language with exactly two names in
//!    scope: the utility namespace (called as bare functions, e.g.
//!    `get($res, "data.name")`, `uuid()`, `timestamp()`, `random_int(1, 100)`)
//!    and the last HTTP result, bound as `$res` and only available for
//!    AFTER_RESPONSE evaluation. Property paths (`$res.data.id`,
//!    `$res.data["items"][0]`) walk the result value.
//!
//! Compilation and evaluation failures are surfaced as [`ExprError`] values
//! that callers record on the owning binding; they never abort a request.

pub mod compile;
pub mod parser;
pub mod util;

pub use compile::{compile, CompiledExpr};

use std::fmt;

/// Errors produced while compiling or evaluating a binding expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprError {
    /// The expression text does not match the grammar.
    Compile(String),
    /// The compiled expression failed at invocation time.
    Eval(String),
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprError::Compile(msg) => write!(f, "Compile error: {}", msg),
            ExprError::Eval(msg) => write!(f, "Eval error: {}", msg),
        }
    }
}

impl std::error::Error for ExprError {}
