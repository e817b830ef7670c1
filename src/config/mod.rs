//! Configuration shapes consumed to build a collection.
//!
//! These structures mirror the external configuration contract: a collection
//! names a base URL and an ordered list of requests, each request an optional
//! body template and variable list. They deserialize from camelCase JSON and
//! carry no behavior beyond validation; `Collection::from_config` turns them
//! into the live, mutable model.

use crate::models::HttpMethod;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Declaration of one variable binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarConfig {
    /// Variable name, unique within its request.
    pub name: String,

    /// Expression text. Empty means the variable is read from the session.
    #[serde(default)]
    pub expr: String,
}

/// Declaration of one request in a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestConfig {
    /// Request name, unique within the collection.
    pub name: String,

    /// HTTP method.
    pub method: HttpMethod,

    /// URL template, appended to the collection's base URL. May contain
    /// `{{ name }}` placeholders.
    pub url: String,

    /// Optional body template. May contain `{{ name }}` placeholders.
    #[serde(default)]
    pub body: Option<String>,

    /// Optional explicit variable bindings. Placeholders referenced by the
    /// templates get consumer bindings auto-created at reconciliation time,
    /// so only producers need declaring.
    #[serde(default)]
    pub vars: Vec<VarConfig>,
}

/// Declaration of a whole collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionConfig {
    /// Collection name.
    pub name: String,

    /// Base URL prefixed to every request URL. Defaults to empty.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Ordered request sequence.
    pub requests: Vec<RequestConfig>,
}

impl CollectionConfig {
    /// Validates the uniqueness invariants and returns errors if any
    /// declaration is invalid.
    ///
    /// # Returns
    ///
    /// `Ok(())` if the configuration is valid, or `Err` with a descriptive
    /// error message.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("collection name must not be empty".to_string());
        }

        let mut request_names = HashSet::new();
        for request in &self.requests {
            if request.name.trim().is_empty() {
                return Err("request name must not be empty".to_string());
            }
            if !request_names.insert(request.name.as_str()) {
                return Err(format!("duplicate request name: {}", request.name));
            }

            let mut var_names = HashSet::new();
            for var in &request.vars {
                if var.name.trim().is_empty() {
                    return Err(format!(
                        "request {} declares a variable with an empty name",
                        request.name
                    ));
                }
                if !var_names.insert(var.name.as_str()) {
                    return Err(format!(
                        "request {} declares duplicate variable: {}",
                        request.name, var.name
                    ));
                }
            }
        }

        Ok(())
    }
}
