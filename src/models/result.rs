//! Folded outcome of a single request execution.
//!
//! Every transport outcome - a 2xx response, an HTTP error status, or a
//! network-level failure - is folded into an `HttpResult` before it reaches
//! the engine. Nothing at the transport boundary throws past `execute`; the
//! run loop and AFTER_RESPONSE bindings only ever see this structure.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of one HTTP call, scoped to one request execution.
///
/// Bound as `$res` for AFTER_RESPONSE expression evaluation and consulted by
/// the run loop to decide whether the collection continues. Discarded after
/// the owning request finishes; it is never retained in the data model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpResult {
    /// Whether the call completed with a 2xx status.
    pub ok: bool,

    /// HTTP status code. Transport-level failures report 500.
    pub status: u16,

    /// Status text for HTTP errors, or the transport error message.
    /// Empty on success.
    pub error: String,

    /// Parsed JSON response body. Present only when `ok` is true.
    pub data: Option<Value>,
}

impl HttpResult {
    /// Builds a successful result carrying the parsed response body.
    pub fn success(status: u16, data: Value) -> Self {
        Self {
            ok: true,
            status,
            error: String::new(),
            data: Some(data),
        }
    }

    /// Builds a failed result. `data` is always absent on failure.
    pub fn failure(status: u16, error: impl Into<String>) -> Self {
        Self {
            ok: false,
            status,
            error: error.into(),
            data: None,
        }
    }

    /// Serializes the result into a JSON value for `$res` binding.
    ///
    /// An absent `data` field appears as JSON `null`, mirroring how an unset
    /// session variable serializes during interpolation.
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "ok": self.ok,
            "status": self.status,
            "error": self.error,
            "data": self.data.clone().unwrap_or(Value::Null),
        })
    }
}
