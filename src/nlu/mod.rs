//! Remote NLU client: the Rasa HTTP API consumed by every chat turn.
//!
//! Each user turn issues two calls against the configured base endpoint:
//!
//! - **Parse** (`POST /model/parse`) with a bounded timeout. Failure is
//!   reported as [`Unavailable`]; callers treat the intent analysis as
//!   optional.
//! - **Send** (`POST /webhooks/rest/webhook`) with no timeout. A non-success
//!   status is a [`DeliveryError`]; an empty reply list is a valid answer.
//!
//! `GET /status` backs the connectivity indicator via [`StatusProbe`].
//!
//! No retries, no caching: every failure is surfaced once to the caller.

pub mod rasa;
pub mod types;

pub use rasa::NluClient;
pub use types::{BotReply, Entity, IntentPrediction, ParseResult, ReplyButton, reply_texts};

use serde::Serialize;

/// The parse endpoint could not produce an analysis.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Unavailable {
    #[error("NLU backend unreachable: {0}")]
    Unreachable(String),
    #[error("NLU backend returned HTTP {0}")]
    Status(u16),
    #[error("malformed NLU response: {0}")]
    Malformed(String),
}

/// The message-delivery call failed; no turn is recorded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("Server error: {0}")]
    Status(u16),
    #[error("backend unreachable: {0}")]
    Unreachable(String),
    #[error("malformed webhook response: {0}")]
    Malformed(String),
}

/// Liveness of the NLU backend as shown by the status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityState {
    Connected,
    Disconnected,
}

impl ConnectivityState {
    /// Indicator text shown to the user.
    pub fn label(self) -> &'static str {
        match self {
            Self::Connected => "✅ Conectado",
            Self::Disconnected => "❌ Desconectado",
        }
    }

    pub fn is_connected(self) -> bool {
        self == Self::Connected
    }
}

impl std::fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The two per-turn calls the session controller depends on.
pub trait NluBackend {
    fn parse(&self, text: &str) -> Result<ParseResult, Unavailable>;
    fn send(&self, text: &str, sender: &str) -> Result<Vec<BotReply>, DeliveryError>;

    /// Raw dialogue state kept for `sender`, if the backend tracks one.
    fn tracker(&self, _sender: &str) -> Result<serde_json::Value, Unavailable> {
        Err(Unavailable::Unreachable("conversation tracker not supported".into()))
    }
}

/// A liveness check usable from the background poller.
pub trait StatusProbe {
    fn probe(&self) -> ConnectivityState;
}
