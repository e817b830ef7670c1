//! Variable bindings attached to collection requests.
//!
//! A binding names one variable a request produces or consumes, carries its
//! expression text, and caches the value or error from its last evaluation.
//! Timing (`EvalOrder`), `unused`, and provenance (`set_by`) are derived
//! state: timing is recomputed from the expression text on every access, the
//! other two are refreshed by request reconciliation.

pub mod binding;

pub use binding::{EvalOrder, VariableBinding};
