//! Core data models shared across the runner.
//!
//! This module defines the HTTP method enum used by request configurations
//! and the folded per-request outcome (`HttpResult`) consumed by
//! AFTER_RESPONSE variable bindings.

pub mod request;
pub mod result;

pub use request::HttpMethod;
pub use result::HttpResult;
