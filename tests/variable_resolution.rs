//! Variable resolution scenarios driven through the public API.
//!
//! These tests script the transport so the engine's behavior - timing
//! classification, auto-created consumers, provenance, error recording, and
//! the failure protocol - can be observed without a network.

use rest_runner::{
    Collection, CollectionConfig, EvalOrder, HttpResult, RunState, Transport, TransportRequest,
    VarConfig,
};
use serde_json::{json, Value};
use std::cell::RefCell;

/// Scripted transport: pops one result per call, records every request.
struct ScriptedTransport {
    results: RefCell<Vec<HttpResult>>,
    seen: RefCell<Vec<TransportRequest>>,
}

impl ScriptedTransport {
    fn new(results: Vec<HttpResult>) -> Self {
        let mut results = results;
        results.reverse();
        Self {
            results: RefCell::new(results),
            seen: RefCell::new(Vec::new()),
        }
    }

    fn requests_seen(&self) -> Vec<TransportRequest> {
        self.seen.borrow().clone()
    }
}

impl Transport for ScriptedTransport {
    async fn fetch(&self, request: TransportRequest) -> HttpResult {
        self.seen.borrow_mut().push(request);
        self.results
            .borrow_mut()
            .pop()
            .unwrap_or_else(|| HttpResult::failure(500, "no scripted result"))
    }
}

fn petstore_collection() -> Collection {
    let config: CollectionConfig = serde_json::from_value(json!({
        "name": "Add Pet Workflow",
        "baseUrl": "https://petstore.example/v2",
        "requests": [
            {
                "name": "Create Pet",
                "method": "POST",
                "url": "/pet",
                "body": "{\"name\":\"{{petName}}\"}",
                "vars": [
                    { "name": "petId", "expr": "$res.data.id" },
                    { "name": "petName", "expr": "\"Bruno\"" }
                ]
            },
            {
                "name": "Get Pet",
                "method": "GET",
                "url": "/pet/{{petId}}"
            }
        ]
    }))
    .expect("config should deserialize");
    Collection::from_config(config).expect("config should be valid")
}

// Scenario: a BEFORE_REQUEST literal feeds the body template.
#[tokio::test]
async fn test_literal_binding_interpolates_into_body() {
    let mut collection = petstore_collection();
    let transport = ScriptedTransport::new(vec![
        HttpResult::success(200, json!({"id": 42})),
        HttpResult::success(200, json!({"name": "Bruno"})),
    ]);

    collection.run(&transport).await;

    let seen = transport.requests_seen();
    assert_eq!(seen[0].body.as_deref(), Some(r#"{"name":"Bruno"}"#));
    assert_eq!(
        seen[0].headers.get("content-type").map(String::as_str),
        Some("application/json")
    );
}

// Scenario: an AFTER_RESPONSE capture lands in the session.
#[tokio::test]
async fn test_response_capture_lands_in_session() {
    let mut collection = petstore_collection();
    let transport = ScriptedTransport::new(vec![
        HttpResult::success(200, json!({"id": 42})),
        HttpResult::success(200, json!({"name": "Bruno"})),
    ]);

    collection.run(&transport).await;

    assert_eq!(collection.session().get("petId"), Some(&json!(42)));
    // The captured id drove the second request's URL.
    let seen = transport.requests_seen();
    assert_eq!(seen[1].url, "https://petstore.example/v2/pet/42");
}

// Scenario: a placeholder with no declared binding is auto-created as a
// consumer, resolves provenance to the producing request, and reads its
// value from the session.
#[tokio::test]
async fn test_auto_created_consumer_with_provenance() {
    let mut collection = petstore_collection();
    let transport = ScriptedTransport::new(vec![
        HttpResult::success(200, json!({"id": 42})),
        HttpResult::success(200, json!({"name": "Bruno"})),
    ]);

    collection.run(&transport).await;

    let bindings = collection.bindings(1).expect("request exists");
    let pet_id = bindings.iter().find(|b| b.name == "petId").expect("auto-created");
    assert!(pet_id.is_consumer());
    assert_eq!(pet_id.eval_order(), EvalOrder::BeforeRequest);
    assert_eq!(pet_id.set_by, Some(0));
    assert_eq!(pet_id.value, Some(json!(42)));
}

// Scenario: an expression that fails to compile records its error and the
// request still proceeds.
#[tokio::test]
async fn test_invalid_expression_records_error_and_proceeds() {
    let mut collection = petstore_collection();
    collection
        .request_mut(0)
        .unwrap()
        .add_binding(VarConfig {
            name: "broken".to_string(),
            expr: "not valid js(((".to_string(),
        });

    let transport = ScriptedTransport::new(vec![
        HttpResult::success(200, json!({"id": 42})),
        HttpResult::success(200, json!({"name": "Bruno"})),
    ]);
    collection.run(&transport).await;

    assert_eq!(collection.state(), RunState::Succeeded);
    assert_eq!(transport.requests_seen().len(), 2);

    let bindings = collection.bindings(0).expect("request exists");
    let broken = bindings.iter().find(|b| b.name == "broken").unwrap();
    assert!(!broken.error.is_empty());
    assert_eq!(broken.value, None);
}

// Scenario: the first failing request halts the run with its error in the
// collection message and the tail never executes.
#[tokio::test]
async fn test_failure_halts_run_with_message() {
    let mut collection = petstore_collection();
    let transport = ScriptedTransport::new(vec![HttpResult::failure(404, "Not Found")]);

    collection.run(&transport).await;

    assert_eq!(collection.state(), RunState::Failed);
    assert_eq!(collection.message(), "Create Pet failed. Not Found");
    assert_eq!(transport.requests_seen().len(), 1);
    assert!(!collection.session().contains("myPet"));
}

// Scenario: an unused binding can be deleted without affecting the rest.
#[tokio::test]
async fn test_unused_binding_can_be_removed() {
    let mut collection = petstore_collection();
    collection
        .request_mut(0)
        .unwrap()
        .add_binding(VarConfig {
            name: "leftover".to_string(),
            expr: String::new(),
        });

    let bindings = collection.bindings(0).expect("request exists");
    let leftover = bindings.iter().find(|b| b.name == "leftover").unwrap();
    assert!(leftover.unused);

    assert!(collection.request_mut(0).unwrap().remove_binding("leftover"));

    let bindings = collection.bindings(0).expect("request exists");
    assert!(bindings.iter().all(|b| b.name != "leftover"));
    assert!(bindings.iter().any(|b| b.name == "petName"));
    assert!(bindings.iter().any(|b| b.name == "petId"));
}

// evalOrder is a function of the expression text alone and follows edits.
#[test]
fn test_eval_order_follows_expression_edits() {
    let mut collection = petstore_collection();
    let request = collection.request_mut(0).unwrap();
    let binding = request.binding_mut("petId").unwrap();
    assert_eq!(binding.eval_order(), EvalOrder::AfterResponse);

    binding.expr = "42".to_string();
    assert_eq!(binding.eval_order(), EvalOrder::BeforeRequest);

    binding.expr = "get($res, 'data.id')".to_string();
    assert_eq!(binding.eval_order(), EvalOrder::AfterResponse);
}

// Reconciled binding reads come back in a stable order: BEFORE_REQUEST
// bindings first, each group sorted by name.
#[test]
fn test_binding_list_order_is_deterministic() {
    let mut collection = petstore_collection();

    let names: Vec<String> = collection
        .bindings(0)
        .expect("request exists")
        .iter()
        .map(|b| b.name.clone())
        .collect();
    assert_eq!(names, vec!["petName", "petId"]);

    // Reading again yields the same sequence.
    let again: Vec<String> = collection
        .bindings(0)
        .expect("request exists")
        .iter()
        .map(|b| b.name.clone())
        .collect();
    assert_eq!(names, again);
}

// A consumer shadowed by two producers resolves to the nearest one.
#[tokio::test]
async fn test_nearest_preceding_producer_wins() {
    let config: CollectionConfig = serde_json::from_value(json!({
        "name": "Shadowing",
        "baseUrl": "http://api.example",
        "requests": [
            {
                "name": "First",
                "method": "POST",
                "url": "/a",
                "vars": [ { "name": "token", "expr": "\"first\"" } ]
            },
            {
                "name": "Second",
                "method": "POST",
                "url": "/b",
                "vars": [ { "name": "token", "expr": "\"second\"" } ]
            },
            {
                "name": "Third",
                "method": "GET",
                "url": "/c/{{token}}"
            }
        ]
    }))
    .unwrap();
    let mut collection = Collection::from_config(config).unwrap();

    let bindings = collection.bindings(2).expect("request exists");
    let token = bindings.iter().find(|b| b.name == "token").unwrap();
    assert_eq!(token.set_by, Some(1));

    // And at run time the nearest producer's value is the one in effect.
    let transport = ScriptedTransport::new(vec![
        HttpResult::success(200, json!({})),
        HttpResult::success(200, json!({})),
        HttpResult::success(200, json!({})),
    ]);
    collection.run(&transport).await;
    assert_eq!(
        transport.requests_seen()[2].url,
        "http://api.example/c/\"second\""
    );
}

// An unset variable interpolates as JSON null (documented convention).
#[tokio::test]
async fn test_unset_variable_interpolates_as_null() {
    let config: CollectionConfig = serde_json::from_value(json!({
        "name": "Unset",
        "baseUrl": "http://api.example",
        "requests": [
            { "name": "Lonely", "method": "GET", "url": "/pet/{{nobody}}" }
        ]
    }))
    .unwrap();
    let mut collection = Collection::from_config(config).unwrap();

    let transport = ScriptedTransport::new(vec![HttpResult::success(200, json!({}))]);
    collection.run(&transport).await;

    assert_eq!(
        transport.requests_seen()[0].url,
        "http://api.example/pet/null"
    );
}

// Response-shaped expressions can reach every field of the folded result.
#[tokio::test]
async fn test_result_fields_visible_to_expressions() {
    let config: CollectionConfig = serde_json::from_value(json!({
        "name": "Introspect",
        "baseUrl": "http://api.example",
        "requests": [
            {
                "name": "Probe",
                "method": "GET",
                "url": "/probe",
                "vars": [
                    { "name": "wasOk", "expr": "$res.ok" },
                    { "name": "code", "expr": "$res.status" }
                ]
            }
        ]
    }))
    .unwrap();
    let mut collection = Collection::from_config(config).unwrap();

    let transport = ScriptedTransport::new(vec![HttpResult::success(201, json!({"id": 1}))]);
    collection.run(&transport).await;

    assert_eq!(collection.session().get("wasOk"), Some(&json!(true)));
    assert_eq!(collection.session().get("code"), Some(&json!(201)));
    assert_eq!(collection.session().get("id"), None::<&Value>);
}
