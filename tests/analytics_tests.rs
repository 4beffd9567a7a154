/// Integration tests for session analytics: the accumulator invariants and
/// the dashboard view rendered from them, driven through `Session::submit`
/// with a scripted in-memory NLU backend.
use std::collections::VecDeque;
use std::sync::Mutex;

use chatdash::analytics::{Accumulator, Turn};
use chatdash::dashboard;
use chatdash::nlu::{
    BotReply, DeliveryError, Entity, IntentPrediction, NluBackend, ParseResult, Unavailable,
};
use chatdash::session::Session;
use chatdash::training::{TrainingBackend, TrainingError};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Replays queued parse outcomes; every send gets one reply.
struct Scripted {
    parses: Mutex<VecDeque<Result<ParseResult, Unavailable>>>,
}

impl Scripted {
    fn new(parses: Vec<Result<ParseResult, Unavailable>>) -> Self {
        Self {
            parses: Mutex::new(parses.into()),
        }
    }
}

impl NluBackend for Scripted {
    fn parse(&self, _: &str) -> Result<ParseResult, Unavailable> {
        self.parses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(Unavailable::Status(500)))
    }
    fn send(&self, _: &str, _: &str) -> Result<Vec<BotReply>, DeliveryError> {
        Ok(vec![BotReply::text("ok")])
    }
}

struct NoTraining;

impl TrainingBackend for NoTraining {
    fn list_intents(&self) -> Result<Vec<String>, TrainingError> {
        Err(TrainingError::Unreachable("n/a".into()))
    }
    fn add_example(&self, _: &str, _: &str) -> Result<Option<String>, TrainingError> {
        Err(TrainingError::Unreachable("n/a".into()))
    }
    fn list_examples(&self, _: &str) -> Result<Vec<String>, TrainingError> {
        Err(TrainingError::Unreachable("n/a".into()))
    }
    fn train(&self) -> Result<Option<String>, TrainingError> {
        Err(TrainingError::Unreachable("n/a".into()))
    }
}

fn parsed(intent: Option<&str>, confidence: Option<f64>, entities: Vec<Entity>) -> ParseResult {
    ParseResult {
        text: String::new(),
        intent: intent.map(|name| IntentPrediction {
            name: Some(name.to_string()),
            confidence,
        }),
        entities,
    }
}

fn session(parses: Vec<Result<ParseResult, Unavailable>>) -> Session<Scripted, NoTraining> {
    Session::new(
        Scripted::new(parses),
        NoTraining,
        "bmc_user_test",
        chatdash::analytics::EventLog::disabled(),
    )
}

// ---------------------------------------------------------------------------
// Message count
// ---------------------------------------------------------------------------

#[test]
fn every_completed_send_counts_once() {
    let mut s = session(vec![
        Ok(parsed(Some("saludo"), Some(0.9), vec![])),
        Err(Unavailable::Unreachable("timeout".into())),
        Ok(parsed(None, None, vec![])),
        Err(Unavailable::Status(500)),
        Ok(parsed(Some("despedida"), Some(0.7), vec![])),
    ]);
    for text in ["hola", "???", "mmm", "x", "chao"] {
        s.submit(text).unwrap();
    }
    assert_eq!(s.snapshot().total_messages, 5);
    assert_eq!(s.dashboard().total_messages, 5);
    assert_eq!(s.conversation().len(), 5);
}

#[test]
fn intent_total_never_exceeds_message_total() {
    let mut s = session(vec![
        Ok(parsed(Some("saludo"), Some(0.9), vec![])),
        Err(Unavailable::Status(500)),
        Ok(parsed(Some("saludo"), Some(0.8), vec![])),
    ]);
    for text in ["a", "b", "c"] {
        s.submit(text).unwrap();
    }
    let snap = s.snapshot();
    assert_eq!(snap.intent_counts.total(), 2);
    assert!(snap.intent_counts.total() < snap.total_messages);
}

#[test]
fn intent_total_equals_message_total_when_all_recognised() {
    let mut s = session(vec![
        Ok(parsed(Some("saludo"), Some(0.9), vec![])),
        Ok(parsed(Some("info"), Some(0.6), vec![])),
    ]);
    s.submit("a").unwrap();
    s.submit("b").unwrap();
    let snap = s.snapshot();
    assert_eq!(snap.intent_counts.total(), snap.total_messages);
}

// ---------------------------------------------------------------------------
// Confidence
// ---------------------------------------------------------------------------

#[test]
fn average_confidence_is_mean_of_recorded_values() {
    let mut s = session(vec![
        Ok(parsed(Some("saludo"), Some(0.9), vec![])),
        Ok(parsed(Some("saludo"), None, vec![])),
        Err(Unavailable::Status(500)),
        Ok(parsed(Some("info"), Some(0.6), vec![])),
    ]);
    for text in ["a", "b", "c", "d"] {
        s.submit(text).unwrap();
    }
    assert_eq!(s.snapshot().confidence_samples, vec![0.9, 0.6]);
    let avg = s.average_confidence().unwrap();
    assert!((avg - 0.75).abs() < 1e-9);
    assert_eq!(s.dashboard().average_confidence_label, "75.0%");
}

#[test]
fn average_confidence_blank_without_samples() {
    let mut s = session(vec![Err(Unavailable::Status(500))]);
    s.submit("a").unwrap();
    assert_eq!(s.average_confidence(), None);
    assert_eq!(s.dashboard().average_confidence_label, "");
}

// ---------------------------------------------------------------------------
// Distribution
// ---------------------------------------------------------------------------

#[test]
fn distribution_sorted_desc_with_discovery_order_ties() {
    let mut s = session(
        ["greet", "greet", "bye", "greet", "info"]
            .iter()
            .map(|i| Ok(parsed(Some(*i), Some(0.5), vec![])))
            .collect(),
    );
    for _ in 0..5 {
        s.submit("msg").unwrap();
    }
    let rows: Vec<(String, usize)> = s
        .dashboard()
        .distribution
        .iter()
        .map(|r| (r.intent.clone(), r.count))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("greet".to_string(), 3),
            ("bye".to_string(), 1),
            ("info".to_string(), 1)
        ]
    );
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

#[test]
fn repeated_entities_are_not_deduplicated() {
    let mut s = session(vec![Ok(parsed(
        Some("cotizar_producto"),
        Some(0.8),
        vec![Entity::new("producto", "widget"), Entity::new("producto", "widget")],
    ))]);
    s.submit("widget y widget").unwrap();
    assert_eq!(s.snapshot().entity_counts.get("producto"), 2);
    assert_eq!(s.dashboard().entity_chart.values, vec![2.0]);
}

#[test]
fn entities_count_even_without_intent() {
    let mut acc = Accumulator::new();
    let parse = ParseResult {
        text: "widget".into(),
        intent: None,
        entities: vec![Entity::new("producto", "widget")],
    };
    acc.record(&Turn::new("widget", Some(&parse), &[]));
    assert_eq!(acc.snapshot().entity_counts.get("producto"), 1);
    assert_eq!(acc.snapshot().intent_counts.total(), 0);
    assert_eq!(acc.snapshot().total_messages, 1);
}

// ---------------------------------------------------------------------------
// Dashboard charts
// ---------------------------------------------------------------------------

#[test]
fn charts_rerender_from_full_snapshot() {
    let mut acc = Accumulator::new();
    let greet = parsed(Some("greet"), Some(1.0), vec![Entity::new("ciudad", "Lima")]);
    let bye = parsed(Some("bye"), Some(0.5), vec![]);

    acc.record(&Turn::new("hola", Some(&greet), &[]));
    let first = dashboard::render(acc.snapshot());
    assert_eq!(first.intent_chart.values, vec![100.0]);

    acc.record(&Turn::new("chao", Some(&bye), &[]));
    let second = dashboard::render(acc.snapshot());
    assert_eq!(second.intent_chart.labels, vec!["greet", "bye"]);
    assert_eq!(second.intent_chart.values, vec![50.0, 50.0]);
    assert_eq!(second.entity_chart.labels, vec!["ciudad"]);
    assert_eq!(second.distinct_intents, 2);
    assert_eq!(second.distinct_entities, 1);
}
