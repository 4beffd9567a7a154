//! Wire types for the Rasa HTTP API.
//!
//! Only the fields chatdash reads are modelled; everything else in the
//! payloads is ignored on deserialization.

use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// POST /model/parse
// ---------------------------------------------------------------------------

/// Request body for `POST /model/parse`.
#[derive(Debug, Serialize)]
pub(crate) struct ParseRequest<'a> {
    pub text: &'a str,
}

/// Intent analysis returned by `POST /model/parse`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub intent: Option<IntentPrediction>,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

impl ParseResult {
    /// Name of the top intent, if the model recognised one.
    pub fn intent_name(&self) -> Option<&str> {
        self.intent.as_ref()?.name.as_deref()
    }

    /// Confidence of the top intent (0.0–1.0), if reported.
    pub fn confidence(&self) -> Option<f64> {
        self.intent.as_ref()?.confidence
    }
}

/// Top intent classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntentPrediction {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// An extracted entity span.
///
/// Rasa reports `value` as any JSON type (numbers and objects come from
/// duckling-style extractors); it is kept as display text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "entity")]
    pub entity_type: String,
    #[serde(deserialize_with = "value_as_text")]
    pub value: String,
}

impl Entity {
    pub fn new(entity_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            value: value.into(),
        }
    }
}

fn value_as_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

// ---------------------------------------------------------------------------
// POST /webhooks/rest/webhook
// ---------------------------------------------------------------------------

/// Request body for the REST channel webhook.
#[derive(Debug, Serialize)]
pub(crate) struct WebhookRequest<'a> {
    pub sender: &'a str,
    pub message: &'a str,
}

/// One bot message returned by the REST channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BotReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<ReplyButton>,
}

impl BotReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}

/// Quick-reply button attached to a bot message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyButton {
    pub title: String,
    #[serde(default)]
    pub payload: String,
}

/// Collect the displayable text of a reply batch, skipping non-text messages.
pub fn reply_texts(replies: &[BotReply]) -> Vec<String> {
    replies
        .iter()
        .filter_map(|r| r.text.as_deref())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_result_deserializes_rasa_payload() {
        let json = r#"{
            "text": "quiero un widget",
            "intent": {"name": "cotizar_producto", "confidence": 0.93},
            "entities": [
                {"entity": "producto", "value": "widget", "start": 10, "end": 16, "extractor": "DIETClassifier"}
            ],
            "intent_ranking": []
        }"#;
        let parsed: ParseResult = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.intent_name(), Some("cotizar_producto"));
        assert_eq!(parsed.confidence(), Some(0.93));
        assert_eq!(parsed.entities, vec![Entity::new("producto", "widget")]);
    }

    #[test]
    fn parse_result_tolerates_missing_intent() {
        let parsed: ParseResult = serde_json::from_str(r#"{"text": "hola", "intent": null}"#).unwrap();
        assert_eq!(parsed.intent_name(), None);
        assert_eq!(parsed.confidence(), None);
        assert!(parsed.entities.is_empty());
    }

    #[test]
    fn entity_value_accepts_non_string_json() {
        let json = r#"[{"entity": "cantidad", "value": 3}, {"entity": "nota", "value": null}]"#;
        let entities: Vec<Entity> = serde_json::from_str(json).unwrap();
        assert_eq!(entities[0].value, "3");
        assert_eq!(entities[1].value, "");
    }

    #[test]
    fn reply_texts_skips_image_only_messages() {
        let json = r#"[
            {"recipient_id": "u1", "text": "Hola"},
            {"recipient_id": "u1", "image": "https://example.org/cat.png"},
            {"recipient_id": "u1", "text": "¿En qué te ayudo?", "buttons": [{"title": "Precios", "payload": "/cotizar_producto"}]}
        ]"#;
        let replies: Vec<BotReply> = serde_json::from_str(json).unwrap();
        assert_eq!(replies[2].buttons[0].title, "Precios");
        assert_eq!(reply_texts(&replies), vec!["Hola", "¿En qué te ayudo?"]);
    }
}
