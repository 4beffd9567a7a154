/// Configuration schema and defaults for chatdash.
///
/// Defines the TOML-serializable configuration structure with all sections:
/// `[nlu]`, `[training]`, `[session]`, `[web]`, and `[logging]`.
///
/// Every field has a sensible built-in default pointing at a local Rasa
/// stack. Users only need to set the values they want to override.
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level chatdash configuration.
///
/// Maps directly to the `~/.chatdash/config.toml` and `.chatdash.toml` file
/// schemas. All sections and fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatdashConfig {
    pub nlu: NluConfig,
    pub training: TrainingConfig,
    pub session: SessionConfig,
    pub web: WebConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [nlu]
// ---------------------------------------------------------------------------

/// NLU / dialogue backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NluConfig {
    /// Base URL of the Rasa HTTP API.
    pub url: String,
    /// Timeout for `POST /model/parse` (milliseconds).
    pub parse_timeout_ms: u64,
    /// Timeout for the `GET /status` liveness probe (milliseconds).
    pub status_timeout_ms: u64,
}

impl Default for NluConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:5005".to_string(),
            parse_timeout_ms: 5000,
            status_timeout_ms: 5000,
        }
    }
}

// ---------------------------------------------------------------------------
// [training]
// ---------------------------------------------------------------------------

/// Optional training API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Base URL of the training API.
    pub url: String,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:5006".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [session]
// ---------------------------------------------------------------------------

/// Chat session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Prefix of the generated sender id (`<prefix>_<unix millis>`).
    pub sender_prefix: String,
    /// Interval between connectivity probes (seconds).
    pub status_poll_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sender_prefix: "bmc_user".to_string(),
            status_poll_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// [web]
// ---------------------------------------------------------------------------

/// Embedded dashboard server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Listen address for `chatdash web`.
    pub addr: String,
    /// Open the dashboard in the default browser on start.
    pub open_browser: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8085".to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Event log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether session events are appended to the event log.
    pub enabled: bool,
    /// Path to the event log file. `~` is expanded to the home directory.
    pub path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "~/.chatdash/events.jsonl".to_string(),
        }
    }
}

impl ChatdashConfig {
    /// Annotated default config written by `chatdash config init`.
    pub fn default_toml() -> String {
        r#"# chatdash configuration
# Values below are the built-in defaults. Delete any line to keep the default.

[nlu]
url = "http://localhost:5005"         # Rasa server (rasa run --enable-api --cors '*')
parse_timeout_ms = 5000               # POST /model/parse gives up after this
status_timeout_ms = 5000              # GET /status liveness probe

[training]
url = "http://localhost:5006"         # Optional training API (training_api.py)

[session]
sender_prefix = "bmc_user"            # Sender id is "<prefix>_<unix millis>"
status_poll_secs = 30                 # Connectivity indicator refresh

[web]
addr = "127.0.0.1:8085"
open_browser = true

[logging]
enabled = true
path = "~/.chatdash/events.jsonl"
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
