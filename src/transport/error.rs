//! Transport-level error types.
//!
//! These errors exist only inside the native transport: by the time a call
//! returns to the engine they have been folded into an `HttpResult` with
//! `ok: false` and status 500.

use std::fmt;

/// Errors that can occur while building or performing an HTTP call.
#[derive(Debug)]
pub enum TransportError {
    /// Network error: connection failure, DNS resolution, broken pipe.
    Network(String),

    /// The call exceeded the configured timeout.
    Timeout,

    /// The URL could not be parsed.
    InvalidUrl(String),

    /// The URL scheme is not http or https.
    UnsupportedProtocol(String),

    /// The request could not be constructed.
    Build(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Network(msg) => write!(f, "Network error: {}", msg),
            TransportError::Timeout => write!(f, "Request timed out"),
            TransportError::InvalidUrl(url) => write!(f, "Invalid URL: {}", url),
            TransportError::UnsupportedProtocol(protocol) => {
                write!(f, "Unsupported protocol: {}", protocol)
            }
            TransportError::Build(msg) => write!(f, "Request build error: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}

/// Maps reqwest's error types to our variants for consistent folding.
impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_builder() {
            TransportError::Build(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

impl From<url::ParseError> for TransportError {
    fn from(err: url::ParseError) -> Self {
        TransportError::InvalidUrl(err.to_string())
    }
}
