//! A single request in a collection: templates, bindings, execution.

use crate::config::{RequestConfig, VarConfig};
use crate::models::{HttpMethod, HttpResult};
use crate::session::Session;
use crate::template;
use crate::transport::{Transport, TransportRequest};
use crate::variables::{EvalOrder, VariableBinding};
use std::collections::HashMap;

/// One named request owning its URL/body templates and variable bindings.
#[derive(Debug, Clone)]
pub struct Request {
    /// Request name, unique within the collection.
    pub name: String,

    /// HTTP method.
    pub method: HttpMethod,

    /// URL template, appended to the collection's base URL.
    pub url: String,

    /// Body template. Blank means the request is sent without a body.
    pub body: String,

    bindings: Vec<VariableBinding>,
}

impl Request {
    /// Creates a request with no bindings.
    pub fn new(
        name: impl Into<String>,
        method: HttpMethod,
        url: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            method,
            url: url.into(),
            body: body.into(),
            bindings: Vec::new(),
        }
    }

    /// Builds a request from its configuration.
    pub fn from_config(config: RequestConfig) -> Self {
        let mut request = Request::new(
            config.name,
            config.method,
            config.url,
            config.body.unwrap_or_default(),
        );
        request.bindings = config
            .vars
            .into_iter()
            .map(|var| VariableBinding::new(var.name, var.expr))
            .collect();
        request
    }

    /// Raw view of the bindings, in their current order.
    ///
    /// For the reconciled view (auto-created consumers, refreshed derived
    /// fields, deterministic order) read through `Collection::bindings`.
    pub fn bindings(&self) -> &[VariableBinding] {
        &self.bindings
    }

    /// Mutable access to a binding by name, for expression edits.
    pub fn binding_mut(&mut self, name: &str) -> Option<&mut VariableBinding> {
        self.bindings.iter_mut().find(|b| b.name == name)
    }

    /// Appends a binding. Refuses a duplicate name and returns `false`.
    pub fn add_binding(&mut self, var: VarConfig) -> bool {
        if self.bindings.iter().any(|b| b.name == var.name) {
            return false;
        }
        self.bindings.push(VariableBinding::new(var.name, var.expr));
        true
    }

    /// Removes a binding by name. Returns whether one was removed.
    pub fn remove_binding(&mut self, name: &str) -> bool {
        let before = self.bindings.len();
        self.bindings.retain(|b| b.name != name);
        self.bindings.len() != before
    }

    /// Names referenced by the URL template, then the body template, in
    /// order of occurrence with duplicates preserved.
    pub fn referenced_names(&self) -> Vec<String> {
        let mut names = template::scan_placeholders(&self.url);
        names.extend(template::scan_placeholders(&self.body));
        names
    }

    /// Reconciles the binding list against the current templates and the
    /// strictly-earlier requests.
    ///
    /// This is the documented read-side reconciliation step, not an implicit
    /// getter side effect:
    ///
    /// 1. every referenced name without a binding gets a consumer binding
    ///    (empty expression) appended,
    /// 2. `unused` is recomputed - true only for a BEFORE_REQUEST binding
    ///    whose name the templates no longer reference (AFTER_RESPONSE
    ///    bindings exist to capture response data and are never unused),
    /// 3. `set_by` is recomputed for pure consumers: the nearest preceding
    ///    request with a producer (non-empty expression) binding of the same
    ///    name wins; producers carry no provenance,
    /// 4. the list is sorted BEFORE_REQUEST before AFTER_RESPONSE, then by
    ///    name, for a stable iteration order.
    pub fn reconcile(&mut self, earlier: &[Request]) {
        let referenced = self.referenced_names();

        for name in &referenced {
            if !self.bindings.iter().any(|b| &b.name == name) {
                self.bindings.push(VariableBinding::new(name.clone(), ""));
            }
        }

        // Later entries overwrite, so the nearest preceding producer wins.
        let mut producers: HashMap<&str, usize> = HashMap::new();
        for (index, request) in earlier.iter().enumerate() {
            for binding in &request.bindings {
                if !binding.is_consumer() {
                    producers.insert(binding.name.as_str(), index);
                }
            }
        }

        for binding in &mut self.bindings {
            binding.unused = binding.eval_order() == EvalOrder::BeforeRequest
                && !referenced.contains(&binding.name);
            binding.set_by = if binding.is_consumer() {
                producers.get(binding.name.as_str()).copied()
            } else {
                None
            };
        }

        self.bindings
            .sort_by(|a, b| (a.eval_order(), &a.name).cmp(&(b.eval_order(), &b.name)));
    }

    /// Executes this request against the session.
    ///
    /// Evaluates BEFORE_REQUEST bindings in list order, interpolates the URL
    /// (prefixed with `base_url`) and body templates, performs the call (the
    /// body is sent only when non-blank after trimming), evaluates
    /// AFTER_RESPONSE bindings against the folded result, and returns it.
    /// Binding errors never abort the request; only the returned result's
    /// `ok` flag decides whether the run continues.
    pub async fn execute<T: Transport>(
        &mut self,
        base_url: &str,
        session: &mut Session,
        transport: &T,
    ) -> HttpResult {
        for binding in &mut self.bindings {
            if binding.eval_order() == EvalOrder::BeforeRequest {
                binding.eval(session, None);
            }
        }

        let url = format!("{}{}", base_url, template::interpolate(&self.url, session));
        let body = template::interpolate(&self.body, session);
        let body = if body.trim().is_empty() { None } else { Some(body) };

        let result = transport
            .fetch(TransportRequest::new(self.method, url, body))
            .await;

        for binding in &mut self.bindings {
            if binding.eval_order() == EvalOrder::AfterResponse {
                binding.eval(session, Some(&result));
            }
        }

        result
    }
}
