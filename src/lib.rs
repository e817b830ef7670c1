//! REST Runner
//!
//! A library for running ordered collections of HTTP requests where later
//! requests reference values produced by earlier ones - either literal
//! variables computed before a request is sent or values extracted from a
//! response after it arrives. The interesting machinery is the variable
//! resolution engine; the HTTP call itself sits behind a small transport
//! trait.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - **models**: HTTP method and the folded per-request result
//! - **config**: serde shapes a collection is built from, plus validation
//! - **template**: `{{ name }}` placeholder scanning and interpolation
//! - **expr**: the restricted expression language bindings are written in
//! - **session**: the run-scoped key/value store requests exchange values
//!   through
//! - **variables**: the binding model - expression, cached value/error,
//!   derived timing and provenance
//! - **collection**: requests, binding reconciliation, and the sequential
//!   run protocol
//! - **transport**: the HTTP seam and its reqwest-backed implementation
//!
//! # How a run works
//!
//! `Collection::run` clears the session, then executes each request in
//! order. A request first evaluates its BEFORE_REQUEST bindings (writing
//! their values into the session), interpolates its URL and body templates
//! against the session, performs the call, and then evaluates its
//! AFTER_RESPONSE bindings - the ones whose expressions mention `$res` -
//! against the folded result. A failing result stops the run; the
//! collection's `message` and `state` report what happened.
//!
//! # Example
//!
//! ```no_run
//! use rest_runner::collection::Collection;
//! use rest_runner::config::CollectionConfig;
//! use rest_runner::transport::NativeTransport;
//!
//! # async fn example() -> Result<(), String> {
//! let config: CollectionConfig = serde_json::from_str(
//!     r#"{
//!         "name": "Add Pet Workflow",
//!         "baseUrl": "https://petstore.example/v2",
//!         "requests": [
//!             {
//!                 "name": "Create Pet",
//!                 "method": "POST",
//!                 "url": "/pet",
//!                 "body": "{\"name\":\"{{petName}}\"}",
//!                 "vars": [
//!                     { "name": "petName", "expr": "\"Bruno\"" },
//!                     { "name": "petId", "expr": "$res.data.id" }
//!                 ]
//!             },
//!             { "name": "Get Pet", "method": "GET", "url": "/pet/{{petId}}" }
//!         ]
//!     }"#,
//! )
//! .map_err(|e| e.to_string())?;
//!
//! let mut collection = Collection::from_config(config)?;
//! collection.run(&NativeTransport::new()).await;
//! println!("{}", collection.message());
//! # Ok(())
//! # }
//! ```

pub mod collection;
pub mod config;
pub mod expr;
pub mod models;
pub mod session;
pub mod template;
pub mod transport;
pub mod variables;

pub use collection::{Collection, Request, RunEvent, RunState, SUCCESS_MESSAGE};
pub use config::{CollectionConfig, RequestConfig, VarConfig};
pub use models::{HttpMethod, HttpResult};
pub use session::Session;
pub use transport::{NativeTransport, Transport, TransportRequest};
pub use variables::{EvalOrder, VariableBinding};
