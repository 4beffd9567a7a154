/// Training API client.
///
/// Talks to the optional training bridge that edits the NLU data and runs
/// `rasa train`. Calls carry no timeout (training takes minutes) and are
/// never retried.
use serde::Deserialize;

use super::{TrainingBackend, TrainingError};
use crate::config::schema::TrainingConfig;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// `GET /api/intents`
#[derive(Debug, Deserialize)]
struct IntentsResponse {
    intents: Vec<IntentEntry>,
}

#[derive(Debug, Deserialize)]
struct IntentEntry {
    name: String,
}

/// `GET /api/intents/{intent}/examples`
#[derive(Debug, Deserialize)]
struct ExamplesResponse {
    #[serde(default)]
    examples: Vec<String>,
}

/// `POST /api/examples`, `POST /api/train` on success.
#[derive(Debug, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    message: Option<String>,
}

/// Error body, e.g. `{"error": "Training failed"}`.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TrainingClient {
    base_url: String,
}

impl TrainingClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &TrainingConfig) -> Self {
        Self::new(&config.url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /api/health`: whether the training bridge is running at all.
    pub fn is_healthy(&self) -> bool {
        ureq::get(&self.endpoint("/api/health"))
            .timeout(std::time::Duration::from_secs(5))
            .call()
            .is_ok()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path).replace("://localhost", "://127.0.0.1")
    }
}

impl TrainingBackend for TrainingClient {
    fn list_intents(&self) -> Result<Vec<String>, TrainingError> {
        let resp = ureq::get(&self.endpoint("/api/intents"))
            .call()
            .map_err(training_error)?;
        let body: IntentsResponse = resp
            .into_json()
            .map_err(|e| TrainingError::Malformed(e.to_string()))?;
        Ok(body.intents.into_iter().map(|i| i.name).collect())
    }

    fn add_example(&self, intent: &str, example: &str) -> Result<Option<String>, TrainingError> {
        let resp = ureq::post(&self.endpoint("/api/examples"))
            .send_json(serde_json::json!({ "intent": intent, "example": example }))
            .map_err(training_error)?;
        let body: MessageResponse = resp
            .into_json()
            .map_err(|e| TrainingError::Malformed(e.to_string()))?;
        Ok(body.message)
    }

    fn list_examples(&self, intent: &str) -> Result<Vec<String>, TrainingError> {
        let path = format!("/api/intents/{}/examples", urlencoding::encode(intent));
        let resp = ureq::get(&self.endpoint(&path))
            .call()
            .map_err(training_error)?;
        let body: ExamplesResponse = resp
            .into_json()
            .map_err(|e| TrainingError::Malformed(e.to_string()))?;
        Ok(body.examples)
    }

    fn train(&self) -> Result<Option<String>, TrainingError> {
        let resp = ureq::post(&self.endpoint("/api/train"))
            .set("Content-Type", "application/json")
            .call()
            .map_err(training_error)?;
        let body: MessageResponse = resp
            .into_json()
            .map_err(|e| TrainingError::Malformed(e.to_string()))?;
        Ok(body.message)
    }
}

/// Map a `ureq` error, pulling the server's `error` field out of rejections.
fn training_error(err: ureq::Error) -> TrainingError {
    match err {
        ureq::Error::Status(status, resp) => {
            let error = resp
                .into_json::<ErrorResponse>()
                .ok()
                .and_then(|body| body.error);
            TrainingError::Rejected { status, error }
        }
        ureq::Error::Transport(t) => TrainingError::Unreachable(t.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
