//! Session event log: one JSON line per notable session event.
//!
//! Records turns, parse/delivery failures, training fallbacks and
//! connectivity changes so a session can be reviewed after the fact. This
//! is diagnostics only: nothing is ever read back into a session.
//!
//! Log file: `~/.chatdash/events.jsonl` (see `[logging]` in the config).

use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config;
use crate::config::schema::LoggingConfig;
use crate::nlu::ConnectivityState;

// ---------------------------------------------------------------------------
// Event entry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    TurnRecorded,
    ParseUnavailable,
    DeliveryFailed,
    TrainingFallback,
    ConnectivityChanged,
}

/// A single event-log line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEvent {
    pub timestamp: String,
    pub kind: EventKind,
    /// Sender id of the chat session, for per-turn events.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sender: Option<String>,
    /// Recognised intent (turn events only).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub intent: Option<String>,
    /// Free-form detail: failure reason, operation name, new state.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub detail: Option<String>,
}

impl SessionEvent {
    fn new(kind: EventKind) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            kind,
            sender: None,
            intent: None,
            detail: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Handle to the event log file. Cheap to clone; `None` path disables it.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    path: Option<PathBuf>,
}

impl EventLog {
    pub fn from_config(config: &LoggingConfig) -> Self {
        if !config.enabled {
            return Self::disabled();
        }
        Self {
            path: config::expand_home(&config.path),
        }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append an event. Best-effort; failures are silently ignored.
    pub fn record(&self, event: &SessionEvent) {
        let _ = self.append(event);
    }

    pub fn turn_recorded(&self, sender: &str, intent: Option<&str>) {
        let mut event = SessionEvent::new(EventKind::TurnRecorded);
        event.sender = Some(sender.to_string());
        event.intent = intent.map(str::to_string);
        self.record(&event);
    }

    pub fn parse_unavailable(&self, sender: &str, reason: &str) {
        let mut event = SessionEvent::new(EventKind::ParseUnavailable);
        event.sender = Some(sender.to_string());
        event.detail = Some(reason.to_string());
        self.record(&event);
    }

    pub fn delivery_failed(&self, sender: &str, reason: &str) {
        let mut event = SessionEvent::new(EventKind::DeliveryFailed);
        event.sender = Some(sender.to_string());
        event.detail = Some(reason.to_string());
        self.record(&event);
    }

    pub fn training_fallback(&self, operation: &str, reason: &str) {
        let mut event = SessionEvent::new(EventKind::TrainingFallback);
        event.detail = Some(format!("{operation}: {reason}"));
        self.record(&event);
    }

    pub fn connectivity_changed(&self, state: ConnectivityState) {
        let mut event = SessionEvent::new(EventKind::ConnectivityChanged);
        event.detail = Some(state.label().to_string());
        self.record(&event);
    }

    /// Read every well-formed entry back. Malformed lines are skipped.
    pub fn read_all(&self) -> Vec<SessionEvent> {
        let Some(path) = &self.path else {
            return Vec::new();
        };
        let Ok(file) = fs::File::open(path) else {
            return Vec::new();
        };

        BufReader::new(file)
            .lines()
            .map_while(Result::ok)
            .filter_map(|line| serde_json::from_str::<SessionEvent>(&line).ok())
            .collect()
    }

    fn append(&self, event: &SessionEvent) -> anyhow::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let json = serde_json::to_string(event)?;
        writeln!(file, "{json}")?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
