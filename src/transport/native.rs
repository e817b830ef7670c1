//! Native HTTP transport using reqwest.
//!
//! Validates the URL, performs the call with a bounded timeout, and folds
//! every outcome into an `HttpResult`. A non-2xx status folds to
//! `ok: false` carrying the canonical status text; any transport exception
//! (connect failure, timeout, invalid URL, JSON parse failure on a
//! successful status) folds to `ok: false` with status 500.

use super::{Transport, TransportError, TransportRequest};
use crate::models::{HttpMethod, HttpResult};
use serde_json::Value;
use std::time::Duration;

/// Default timeout applied to every call.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// reqwest-backed [`Transport`] implementation.
#[derive(Debug, Clone)]
pub struct NativeTransport {
    timeout: Duration,
}

impl NativeTransport {
    /// Creates a transport with the default 30-second timeout.
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a transport with a custom per-call timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn dispatch(&self, request: TransportRequest) -> Result<HttpResult, TransportError> {
        validate_url(&request.url)?;

        let method = match request.method {
            HttpMethod::GET => reqwest::Method::GET,
            HttpMethod::POST => reqwest::Method::POST,
            HttpMethod::PUT => reqwest::Method::PUT,
            HttpMethod::DELETE => reqwest::Method::DELETE,
        };

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;

        let mut builder = client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let status_text = response
                .status()
                .canonical_reason()
                .unwrap_or("Unknown")
                .to_string();
            return Ok(HttpResult::failure(status, status_text));
        }

        let data: Value = response.json().await?;
        Ok(HttpResult::success(status, data))
    }
}

impl Default for NativeTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for NativeTransport {
    async fn fetch(&self, request: TransportRequest) -> HttpResult {
        match self.dispatch(request).await {
            Ok(result) => result,
            Err(err) => HttpResult::failure(500, err.to_string()),
        }
    }
}

/// Validates that the URL is well-formed and uses a supported protocol.
fn validate_url(url: &str) -> Result<(), TransportError> {
    let parsed = url::Url::parse(url)?;

    let scheme = parsed.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(TransportError::UnsupportedProtocol(scheme.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url_valid() {
        assert!(validate_url("http://example.com").is_ok());
        assert!(validate_url("https://api.example.com/v1/pets?tag=dog").is_ok());
        assert!(validate_url("http://localhost:8080/pet").is_ok());
    }

    #[test]
    fn test_validate_url_invalid() {
        assert!(validate_url("not a url").is_err());
        assert!(validate_url("").is_err());
        assert!(validate_url("://missing-scheme").is_err());
    }

    #[test]
    fn test_validate_url_unsupported_protocol() {
        let result = validate_url("ftp://example.com");
        match result {
            Err(TransportError::UnsupportedProtocol(scheme)) => assert_eq!(scheme, "ftp"),
            other => panic!("Expected UnsupportedProtocol error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_folds_invalid_url() {
        let transport = NativeTransport::new();
        let request = TransportRequest::new(HttpMethod::GET, "not a url", None);
        let result = transport.fetch(request).await;

        assert!(!result.ok);
        assert_eq!(result.status, 500);
        assert!(result.error.contains("Invalid URL"));
        assert_eq!(result.data, None);
    }

    #[tokio::test]
    async fn test_fetch_folds_connection_failure() {
        let transport = NativeTransport::with_timeout(Duration::from_secs(2));
        // Reserved TEST-NET-1 address; nothing listens there.
        let request = TransportRequest::new(HttpMethod::GET, "http://192.0.2.1:9/pet", None);
        let result = transport.fetch(request).await;

        assert!(!result.ok);
        assert_eq!(result.status, 500);
        assert!(!result.error.is_empty());
    }
}
