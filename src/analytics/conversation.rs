//! Conversation log: the append-only record of completed turns.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::nlu::{BotReply, Entity, ParseResult, reply_texts};

/// One completed exchange: the user's message, what the NLU made of it, and
/// what the bot answered. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub timestamp: DateTime<Utc>,
    pub user_text: String,
    pub intent: Option<String>,
    pub confidence: Option<f64>,
    pub entities: Vec<Entity>,
    pub bot_replies: Vec<String>,
}

impl Turn {
    /// Build a turn from a delivered message. `parse` is `None` when the
    /// parse call was unavailable.
    pub fn new(user_text: &str, parse: Option<&ParseResult>, replies: &[BotReply]) -> Self {
        Self {
            timestamp: Utc::now(),
            user_text: user_text.to_string(),
            intent: parse.and_then(|p| p.intent_name()).map(str::to_string),
            confidence: parse.and_then(ParseResult::confidence),
            entities: parse.map(|p| p.entities.clone()).unwrap_or_default(),
            bot_replies: reply_texts(replies),
        }
    }

    /// The bot answered with nothing displayable.
    pub fn is_unanswered(&self) -> bool {
        self.bot_replies.is_empty()
    }
}

/// Turns of the current session, oldest first. Never shrinks.
#[derive(Debug, Clone, Default)]
pub struct ConversationLog {
    turns: Vec<Turn>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: Turn) -> &Turn {
        self.turns.push(turn);
        &self.turns[self.turns.len() - 1]
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.turns).context("failed to serialize conversation")
    }

    /// Export the conversation as pretty JSON. This is a user-requested
    /// snapshot; sessions are never restored from it.
    pub fn export(&self, path: &Path) -> Result<()> {
        let json = self.to_json_pretty()?;
        fs::write(path, json)
            .with_context(|| format!("failed to write conversation to {}", path.display()))
    }
}

/// Default export file name: `conversation_<YYYYmmdd_HHMMSS>.json`.
pub fn default_export_name() -> String {
    format!(
        "conversation_{}.json",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlu::IntentPrediction;

    fn parse(intent: &str, confidence: f64) -> ParseResult {
        ParseResult {
            text: String::new(),
            intent: Some(IntentPrediction {
                name: Some(intent.to_string()),
                confidence: Some(confidence),
            }),
            entities: vec![Entity::new("producto", "widget")],
        }
    }

    #[test]
    fn turn_captures_parse_and_reply_text() {
        let replies = vec![BotReply::text("Hola!"), BotReply::default()];
        let turn = Turn::new("hola", Some(&parse("saludo", 0.9)), &replies);
        assert_eq!(turn.intent.as_deref(), Some("saludo"));
        assert_eq!(turn.confidence, Some(0.9));
        assert_eq!(turn.entities.len(), 1);
        assert_eq!(turn.bot_replies, vec!["Hola!"]);
        assert!(!turn.is_unanswered());
    }

    #[test]
    fn turn_without_parse_has_no_analysis() {
        let turn = Turn::new("hola", None, &[]);
        assert!(turn.intent.is_none());
        assert!(turn.confidence.is_none());
        assert!(turn.entities.is_empty());
        assert!(turn.is_unanswered());
    }

    #[test]
    fn log_appends_in_order() {
        let mut log = ConversationLog::new();
        log.append(Turn::new("uno", None, &[]));
        log.append(Turn::new("dos", None, &[]));
        let texts: Vec<_> = log.turns().iter().map(|t| t.user_text.as_str()).collect();
        assert_eq!(texts, vec!["uno", "dos"]);
    }

    #[test]
    fn export_json_uses_entity_wire_names() {
        let mut log = ConversationLog::new();
        log.append(Turn::new("quiero un widget", Some(&parse("cotizar_producto", 0.8)), &[]));
        let json = log.to_json_pretty().unwrap();
        assert!(json.contains("\"entity\": \"producto\""));
        assert!(json.contains("\"user_text\": \"quiero un widget\""));
    }

    #[test]
    fn default_export_name_shape() {
        let name = default_export_name();
        assert!(name.starts_with("conversation_"));
        assert!(name.ends_with(".json"));
    }
}
