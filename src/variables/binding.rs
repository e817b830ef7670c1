//! The variable binding model and its evaluation contract.

use crate::expr::{self, ExprError};
use crate::models::HttpResult;
use crate::session::Session;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Cached regex detecting a word-boundary `$res` reference. Case-sensitive;
/// `$result` does not match.
static RESPONSE_TOKEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$res\b").expect("Failed to compile response token regex"));

/// When a binding is evaluated relative to its owning request's HTTP call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EvalOrder {
    /// Evaluated before the request is sent; may feed the URL/body templates.
    BeforeRequest,
    /// Evaluated after the response arrives, with `$res` in scope.
    AfterResponse,
}

impl std::fmt::Display for EvalOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvalOrder::BeforeRequest => write!(f, "BEFORE_REQUEST"),
            EvalOrder::AfterResponse => write!(f, "AFTER_RESPONSE"),
        }
    }
}

/// One named variable attached to a request.
///
/// A binding with an empty expression is a pure consumer: its value is read
/// from the session (typically written there by an earlier request) rather
/// than computed.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableBinding {
    /// Variable name, unique within the owning request.
    pub name: String,

    /// Expression text. Edits take effect immediately - timing is derived
    /// from this text on every access, never cached.
    pub expr: String,

    /// Value from the last evaluation, if it succeeded.
    pub value: Option<Value>,

    /// Error message from the last compile or evaluation failure. Empty when
    /// the last evaluation succeeded.
    pub error: String,

    /// Whether this is a BEFORE_REQUEST binding whose name no longer appears
    /// in the owning request's templates. Refreshed by reconciliation.
    pub unused: bool,

    /// Index of the nearest strictly-earlier request that produces this
    /// variable. Only set on pure consumers; refreshed by reconciliation.
    pub set_by: Option<usize>,
}

impl VariableBinding {
    /// Creates a binding with no cached value or derived state.
    pub fn new(name: impl Into<String>, expr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expr: expr.into(),
            value: None,
            error: String::new(),
            unused: false,
            set_by: None,
        }
    }

    /// Whether this binding consumes its value from the session instead of
    /// computing it (empty expression).
    pub fn is_consumer(&self) -> bool {
        self.expr.trim().is_empty()
    }

    /// Classifies when this binding must be evaluated.
    ///
    /// A pure function of the current expression text: a word-boundary
    /// `$res` token means the expression needs the response, so the binding
    /// is AFTER_RESPONSE; everything else is BEFORE_REQUEST. Recomputed on
    /// every call so that edits to `expr` retime the binding immediately.
    pub fn eval_order(&self) -> EvalOrder {
        if RESPONSE_TOKEN_REGEX.is_match(&self.expr) {
            EvalOrder::AfterResponse
        } else {
            EvalOrder::BeforeRequest
        }
    }

    /// Evaluates this binding against the session and the optional last
    /// HTTP result.
    ///
    /// Empty expression: the value is read straight from the session, no
    /// mutation and no error bookkeeping beyond the read. Otherwise the
    /// expression is compiled (a compile failure records `error` and skips
    /// this cycle), the cached value and error are cleared, the session slot
    /// is reset to `null` so a failing expression never leaves its own stale
    /// prior value observable, and the compiled expression is invoked: on
    /// success the value is cached and written to the session, on failure
    /// the error message is recorded and the value stays unset.
    pub fn eval(&mut self, session: &mut Session, res: Option<&HttpResult>) {
        if self.is_consumer() {
            self.value = session.get(&self.name).cloned();
            return;
        }

        let compiled = match expr::compile(&self.expr) {
            Ok(Some(compiled)) => compiled,
            // Unreachable: a non-consumer expression is non-empty.
            Ok(None) => return,
            Err(err) => {
                self.error = err.to_string();
                return;
            }
        };

        self.value = None;
        self.error.clear();
        session.set(&self.name, Value::Null);

        match compiled.invoke(res) {
            Ok(value) => {
                self.value = Some(value.clone());
                session.set(&self.name, value);
            }
            Err(err) => {
                self.error = err.to_string();
            }
        }
    }

    /// Convenience for error taxonomy checks in callers and tests.
    pub fn last_error(&self) -> Option<ExprError> {
        if self.error.is_empty() {
            return None;
        }
        if let Some(msg) = self.error.strip_prefix("Compile error: ") {
            Some(ExprError::Compile(msg.to_string()))
        } else if let Some(msg) = self.error.strip_prefix("Eval error: ") {
            Some(ExprError::Eval(msg.to_string()))
        } else {
            Some(ExprError::Eval(self.error.clone()))
        }
    }
}
