/// Integration tests for the training bridge client and its fallbacks.
mod common;

use chatdash::analytics::EventLog;
use chatdash::training::{
    FALLBACK_INTENTS, Outcome, TRAIN_OFFLINE_MESSAGE, TrainingBackend, TrainingClient,
    TrainingDesk, TrainingError,
};
use common::{MockBackend, dead_url};

fn desk(url: &str) -> TrainingDesk<TrainingClient> {
    TrainingDesk::new(TrainingClient::new(url), EventLog::disabled())
}

// ---------------------------------------------------------------------------
// Bridge unreachable
// ---------------------------------------------------------------------------

#[test]
fn list_intents_falls_back_to_exactly_four_defaults() {
    let intents = desk(&dead_url()).list_intents();
    assert_eq!(intents, ["saludo", "despedida", "cotizar_producto", "fallback"]);
    assert_eq!(intents, FALLBACK_INTENTS);
}

#[test]
fn add_example_offline_references_offline_tool() {
    let outcome = desk(&dead_url()).add_example("saludo", "hola buenas");
    match outcome {
        Outcome::Offline(message) => assert!(message.contains("train_chatbot.py")),
        other => panic!("expected offline outcome, got {other:?}"),
    }
}

#[test]
fn list_examples_offline_is_single_placeholder() {
    let examples = desk(&dead_url()).list_examples("saludo");
    assert_eq!(examples.len(), 1);
    assert!(examples[0].contains("training_api.py"));
}

#[test]
fn train_offline_is_instructional() {
    assert_eq!(
        desk(&dead_url()).train(),
        Outcome::Offline(TRAIN_OFFLINE_MESSAGE.to_string())
    );
}

#[test]
fn raw_client_reports_typed_errors() {
    let client = TrainingClient::new(&dead_url());
    assert!(matches!(client.list_intents(), Err(TrainingError::Unreachable(_))));
}

// ---------------------------------------------------------------------------
// Bridge running
// ---------------------------------------------------------------------------

fn bridge() -> MockBackend {
    MockBackend::start(|method, url, _| match (method, url) {
        ("GET", "/api/intents") => (
            200,
            r#"{"intents":[{"name":"saludo","examples_count":12},{"name":"consultar_stock","examples_count":3}]}"#.to_string(),
        ),
        ("GET", "/api/intents/consultar%20stock/examples") => {
            (200, r#"{"examples":["hay stock?","tienen disponible?"]}"#.to_string())
        }
        ("GET", "/api/intents/vacio/examples") => (200, r#"{"examples":[]}"#.to_string()),
        ("POST", "/api/examples") => (200, r#"{"message":"Example added to saludo"}"#.to_string()),
        ("POST", "/api/train") => (200, r#"{"message":"Model trained successfully","model":"models/20240101.tar.gz"}"#.to_string()),
        _ => (404, r#"{"error":"not found"}"#.to_string()),
    })
}

#[test]
fn lists_real_intents_in_server_order() {
    let mock = bridge();
    assert_eq!(desk(&mock.url).list_intents(), ["saludo", "consultar_stock"]);
}

#[test]
fn add_example_returns_server_message() {
    let mock = bridge();
    let outcome = desk(&mock.url).add_example("saludo", "buenas tardes");
    assert_eq!(outcome, Outcome::Done("Example added to saludo".to_string()));

    let body: serde_json::Value = serde_json::from_str(&mock.requests()[0].body).unwrap();
    assert_eq!(body["intent"], "saludo");
    assert_eq!(body["example"], "buenas tardes");
}

#[test]
fn list_examples_encodes_intent_segment() {
    let mock = bridge();
    assert_eq!(
        desk(&mock.url).list_examples("consultar stock"),
        ["hay stock?", "tienen disponible?"]
    );
}

#[test]
fn empty_examples_become_placeholder() {
    let mock = bridge();
    let examples = desk(&mock.url).list_examples("vacio");
    assert_eq!(examples.len(), 1);
    assert!(examples[0].starts_with("Ejemplos para \"vacio\""));
}

#[test]
fn train_success_returns_confirmation() {
    let mock = bridge();
    assert_eq!(
        desk(&mock.url).train(),
        Outcome::Done("Model trained successfully".to_string())
    );
}

#[test]
fn train_rejection_surfaces_server_error() {
    let mock = MockBackend::start(|_, _, _| (500, r#"{"error":"No training data"}"#.to_string()));
    assert_eq!(
        desk(&mock.url).train(),
        Outcome::Failed("No training data".to_string())
    );
}

#[test]
fn add_example_rejection_degrades_to_offline() {
    let mock = MockBackend::start(|_, _, _| {
        (400, r#"{"error":"Intent and example are required"}"#.to_string())
    });
    assert!(matches!(
        desk(&mock.url).add_example("saludo", "hola"),
        Outcome::Offline(_)
    ));
}

#[test]
fn health_check_hits_api_health() {
    let mock = MockBackend::start(|_, _, _| (200, r#"{"status":"ok"}"#.to_string()));
    assert!(TrainingClient::new(&mock.url).is_healthy());
    assert_eq!(mock.requests()[0].url, "/api/health");
    assert!(!TrainingClient::new(&dead_url()).is_healthy());
}
