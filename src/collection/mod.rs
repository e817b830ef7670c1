//! Collection model and the sequential run protocol.
//!
//! A collection owns its ordered request sequence, the single run-scoped
//! session, and the run-state machine. Requests execute strictly in order:
//! request *n* may read session values written by requests *0..n-1*, and a
//! failing result aborts the run with the remaining requests never executed.
//!
//! State is plain mutable data read through getters; callers that want to
//! watch a run in progress pass an observer callback to
//! [`Collection::run_with_observer`] instead of relying on any reactivity
//! framework.

pub mod request;

pub use request::Request;

use crate::config::CollectionConfig;
use crate::models::HttpResult;
use crate::session::Session;
use crate::transport::Transport;
use crate::variables::VariableBinding;

/// Status message set when every request in a run succeeds.
pub const SUCCESS_MESSAGE: &str = "Collection ran successfully";

/// Where a run currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No run in progress (initial state, and the state each run restarts
    /// from - there is no partial resume).
    Idle,
    /// Executing the request at this index.
    Running(usize),
    /// The last run completed with every request ok.
    Succeeded,
    /// The last run stopped at a failing request.
    Failed,
}

/// Progress notification emitted during [`Collection::run_with_observer`].
#[derive(Debug)]
pub enum RunEvent<'a> {
    /// The session was cleared and the run is starting.
    RunStarted,
    /// A request is about to execute.
    RequestStarted { index: usize, name: &'a str },
    /// A request finished, successfully or not.
    RequestCompleted {
        index: usize,
        name: &'a str,
        result: &'a HttpResult,
    },
    /// The run reached a terminal state.
    RunFinished { state: RunState, message: &'a str },
}

/// An ordered, named set of requests sharing one session and base URL.
#[derive(Debug, Clone)]
pub struct Collection {
    /// Collection name.
    pub name: String,

    /// Base URL prefixed to every request URL template.
    pub base_url: String,

    requests: Vec<Request>,
    session: Session,
    message: String,
    state: RunState,
}

impl Collection {
    /// Creates an empty collection.
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            requests: Vec::new(),
            session: Session::new(),
            message: String::new(),
            state: RunState::Idle,
        }
    }

    /// Builds a collection from its configuration, enforcing the uniqueness
    /// invariants first.
    pub fn from_config(config: CollectionConfig) -> Result<Self, String> {
        config.validate()?;
        let mut collection = Collection::new(config.name, config.base_url.unwrap_or_default());
        collection.requests = config.requests.into_iter().map(Request::from_config).collect();
        Ok(collection)
    }

    /// The ordered request sequence.
    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    /// Mutable access to a request for template/binding edits.
    pub fn request_mut(&mut self, index: usize) -> Option<&mut Request> {
        self.requests.get_mut(index)
    }

    /// Index of a request by name.
    pub fn request_index(&self, name: &str) -> Option<usize> {
        self.requests.iter().position(|r| r.name == name)
    }

    /// The run-scoped session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The last run status message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The current run state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Reconciled view of a request's bindings.
    ///
    /// This is the read described in the binding model: placeholders get
    /// consumer bindings auto-created, `unused` and `set_by` are refreshed
    /// against the current templates and the strictly-earlier requests, and
    /// the list comes back in its stable order.
    pub fn bindings(&mut self, index: usize) -> Option<&[VariableBinding]> {
        if index >= self.requests.len() {
            return None;
        }
        let (earlier, rest) = self.requests.split_at_mut(index);
        let request = &mut rest[0];
        request.reconcile(earlier);
        Some(request.bindings())
    }

    /// Runs the collection, discarding progress events.
    pub async fn run<T: Transport>(&mut self, transport: &T) {
        self.run_with_observer(transport, |_| {}).await;
    }

    /// Runs the collection, emitting a [`RunEvent`] at each step.
    ///
    /// Clears the session and status message, then executes each request in
    /// order. A failing result sets the failure message and stops
    /// immediately - later requests never execute, and session values they
    /// would have produced stay unset. There is no retry and no partial
    /// resume; the next run starts over from a cleared session.
    pub async fn run_with_observer<T, F>(&mut self, transport: &T, mut observer: F)
    where
        T: Transport,
        F: FnMut(&RunEvent),
    {
        self.session.clear();
        self.message.clear();
        self.state = RunState::Idle;
        observer(&RunEvent::RunStarted);

        let mut failed = false;
        for index in 0..self.requests.len() {
            self.state = RunState::Running(index);
            self.message = format!("Running {}", self.requests[index].name);
            observer(&RunEvent::RequestStarted {
                index,
                name: &self.requests[index].name,
            });

            let (earlier, rest) = self.requests.split_at_mut(index);
            let request = &mut rest[0];
            request.reconcile(earlier);
            let result = request
                .execute(&self.base_url, &mut self.session, transport)
                .await;
            observer(&RunEvent::RequestCompleted {
                index,
                name: &request.name,
                result: &result,
            });

            if !result.ok {
                self.message = format!("{} failed. {}", request.name, result.error);
                self.state = RunState::Failed;
                failed = true;
                break;
            }
        }

        if !failed {
            self.state = RunState::Succeeded;
            self.message = SUCCESS_MESSAGE.to_string();
        }
        observer(&RunEvent::RunFinished {
            state: self.state,
            message: &self.message,
        });
    }
}
