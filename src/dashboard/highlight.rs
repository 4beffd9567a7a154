//! Entity highlighting for displayed messages.
//!
//! Splits a message into plain and entity-tagged segments so a front end
//! can style recognised values without re-implementing the matching.

use regex::RegexBuilder;
use serde::Serialize;

use crate::nlu::Entity;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub text: String,
    /// Entity type when this segment is a recognised value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl Segment {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            entity: None,
        }
    }
}

/// Split `text` at every case-insensitive occurrence of each entity value.
///
/// Values are matched literally. Where matches overlap, the earliest (then
/// longest) wins.
pub fn segments(text: &str, entities: &[Entity]) -> Vec<Segment> {
    let mut spans: Vec<(usize, usize, &str)> = Vec::new();

    for entity in entities {
        if entity.value.is_empty() {
            continue;
        }
        let Ok(re) = RegexBuilder::new(&regex::escape(&entity.value))
            .case_insensitive(true)
            .build()
        else {
            continue;
        };
        spans.extend(
            re.find_iter(text)
                .map(|m| (m.start(), m.end(), entity.entity_type.as_str())),
        );
    }

    spans.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

    let mut out = Vec::new();
    let mut cursor = 0;
    for (start, end, entity_type) in spans {
        if start < cursor {
            continue;
        }
        if start > cursor {
            out.push(Segment::plain(&text[cursor..start]));
        }
        out.push(Segment {
            text: text[start..end].to_string(),
            entity: Some(entity_type.to_string()),
        });
        cursor = end;
    }
    if cursor < text.len() || out.is_empty() {
        out.push(Segment::plain(&text[cursor..]));
    }

    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
