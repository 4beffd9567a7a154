//! Remote training client and its offline fallbacks.
//!
//! The training bridge is optional. [`TrainingClient`] reports every failure
//! as a typed [`TrainingError`]; [`TrainingDesk`] is the single place where
//! those failures are turned into the instructional fallbacks the operator
//! sees (default intents, placeholder examples, "use the offline tool"
//! outcomes). Nothing here ever propagates an error to the caller.

pub mod client;

pub use client::TrainingClient;

use serde::Serialize;

use crate::analytics::events::EventLog;

/// Intents offered when the training API cannot list the real ones.
pub const FALLBACK_INTENTS: [&str; 4] = ["saludo", "despedida", "cotizar_producto", "fallback"];

/// Shown when training is requested without a reachable bridge.
pub const TRAIN_OFFLINE_MESSAGE: &str =
    "⚠️ Inicia training_api.py o usa train_chatbot.py directamente";

/// Default failure text when the bridge rejects a training run without detail.
const TRAIN_FAILED_MESSAGE: &str = "Training failed";

const TRAIN_DONE_MESSAGE: &str = "Modelo entrenado";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrainingError {
    #[error("training API unreachable: {0}")]
    Unreachable(String),
    #[error("training API returned HTTP {status}")]
    Rejected { status: u16, error: Option<String> },
    #[error("malformed training API response: {0}")]
    Malformed(String),
}

/// Training bridge operations. Each is independent and non-retrying.
pub trait TrainingBackend {
    fn list_intents(&self) -> Result<Vec<String>, TrainingError>;
    /// Returns the server's confirmation message, if it sent one.
    fn add_example(&self, intent: &str, example: &str) -> Result<Option<String>, TrainingError>;
    fn list_examples(&self, intent: &str) -> Result<Vec<String>, TrainingError>;
    /// Returns the server's confirmation message, if it sent one.
    fn train(&self) -> Result<Option<String>, TrainingError>;
}

/// Result of a training operation as presented to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum Outcome {
    /// The bridge accepted the request.
    Done(String),
    /// The bridge is absent; the message points to the offline tooling.
    Offline(String),
    /// The bridge rejected the request with its own error message.
    Failed(String),
}

impl Outcome {
    pub fn message(&self) -> &str {
        match self {
            Self::Done(m) | Self::Offline(m) | Self::Failed(m) => m,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }
}

/// Resolves training calls into operator-facing results.
pub struct TrainingDesk<T> {
    backend: T,
    events: EventLog,
}

impl<T: TrainingBackend> TrainingDesk<T> {
    pub fn new(backend: T, events: EventLog) -> Self {
        Self { backend, events }
    }

    pub fn backend(&self) -> &T {
        &self.backend
    }

    /// Available intents, or [`FALLBACK_INTENTS`] when the bridge fails.
    pub fn list_intents(&self) -> Vec<String> {
        match self.backend.list_intents() {
            Ok(intents) => intents,
            Err(e) => {
                self.events.training_fallback("list_intents", &e.to_string());
                FALLBACK_INTENTS.iter().map(|s| s.to_string()).collect()
            }
        }
    }

    /// Submit a training example. Inputs are validated by the caller.
    ///
    /// Any failure, rejection included, degrades to the offline outcome.
    pub fn add_example(&self, intent: &str, example: &str) -> Outcome {
        match self.backend.add_example(intent, example) {
            Ok(message) => Outcome::Done(
                message.unwrap_or_else(|| format!("Ejemplo agregado a \"{intent}\"")),
            ),
            Err(e) => {
                self.events.training_fallback("add_example", &e.to_string());
                Outcome::Offline(format!(
                    "Ejemplo preparado para \"{intent}\". Usa train_chatbot.py para guardarlo."
                ))
            }
        }
    }

    /// Examples for an intent; never empty.
    pub fn list_examples(&self, intent: &str) -> Vec<String> {
        match self.backend.list_examples(intent) {
            Ok(examples) if !examples.is_empty() => examples,
            Ok(_) => vec![examples_placeholder(intent)],
            Err(e) => {
                self.events.training_fallback("list_examples", &e.to_string());
                vec![examples_placeholder(intent)]
            }
        }
    }

    /// Trigger a training run.
    ///
    /// A rejection surfaces the server's own error; only an unreachable or
    /// unintelligible bridge degrades to the offline instruction.
    pub fn train(&self) -> Outcome {
        match self.backend.train() {
            Ok(message) => Outcome::Done(message.unwrap_or_else(|| TRAIN_DONE_MESSAGE.to_string())),
            Err(TrainingError::Rejected { error, .. }) => {
                Outcome::Failed(error.unwrap_or_else(|| TRAIN_FAILED_MESSAGE.to_string()))
            }
            Err(e) => {
                self.events.training_fallback("train", &e.to_string());
                Outcome::Offline(TRAIN_OFFLINE_MESSAGE.to_string())
            }
        }
    }
}

fn examples_placeholder(intent: &str) -> String {
    format!("Ejemplos para \"{intent}\" - Inicia training_api.py para ver ejemplos reales")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
