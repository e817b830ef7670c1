//! HTTP transport boundary.
//!
//! The engine talks to the network through the [`Transport`] trait: a
//! fetch-style collaborator that folds every outcome - success, HTTP error
//! status, or transport-level failure - into an [`HttpResult`]. Nothing
//! crossing this boundary throws; the run loop only ever inspects result
//! data. [`NativeTransport`] is the shipped reqwest-backed implementation;
//! tests substitute scripted implementations of the trait.

pub mod error;
pub mod native;

pub use error::TransportError;
pub use native::NativeTransport;

use crate::models::{HttpMethod, HttpResult};
use std::collections::HashMap;

/// A fully interpolated request, ready for the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: HttpMethod,

    /// Absolute URL (base URL already prefixed, placeholders resolved).
    pub url: String,

    /// Request headers. The engine always sets a JSON content type.
    pub headers: HashMap<String, String>,

    /// Request body, present only when the interpolated body template was
    /// non-blank.
    pub body: Option<String>,
}

impl TransportRequest {
    /// Builds a request with the fixed JSON content-type header.
    pub fn new(method: HttpMethod, url: impl Into<String>, body: Option<String>) -> Self {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        Self {
            method,
            url: url.into(),
            headers,
            body,
        }
    }
}

/// Fetch-style HTTP collaborator.
///
/// Implementations must be total: any internal failure is folded into
/// `HttpResult { ok: false, status: 500, error }` rather than propagated.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Performs the call and folds the outcome.
    async fn fetch(&self, request: TransportRequest) -> HttpResult;
}
