//! Run-scoped variable store.
//!
//! The session is the single piece of shared mutable state in a run: every
//! request reads the values its predecessors wrote and writes the values its
//! successors will read. It is cleared at the start of each run and never
//! persisted beyond one.

use serde_json::Value;
use std::collections::HashMap;

/// Flat name-to-value store shared by all requests in one run.
///
/// Lookups have no fallback source: a name that was never set simply is not
/// there, and callers decide what that means (interpolation serializes it as
/// JSON `null`). Writes are last-writer-wins with no history kept.
#[derive(Debug, Clone, Default)]
pub struct Session {
    vars: HashMap<String, Value>,
}

impl Session {
    /// Creates an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored value for `name`, or `None` if it was never set.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Upserts `name` to `value`. Overwrites silently if already present.
    pub fn set(&mut self, name: &str, value: Value) {
        self.vars.insert(name.to_string(), value);
    }

    /// Whether `name` has been set in this run (even to `null`).
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Number of variables set in this run.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether no variables have been set.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Removes every variable. Called once at the start of each run.
    pub fn clear(&mut self) {
        self.vars.clear();
    }

    /// Iterates over the stored name/value pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }
}
