//! Running usage statistics for one chat session.
//!
//! Every completed send is folded into an [`AnalyticsSnapshot`]: message
//! count, per-intent and per-entity tallies, and the confidence samples
//! used for the average.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::conversation::Turn;

// ---------------------------------------------------------------------------
// Ordered tally
// ---------------------------------------------------------------------------

/// Name → count mapping that remembers first-seen order.
///
/// Discovery order is the tie-break for the sorted distribution, so a plain
/// hash map is not enough. Cardinality is tiny (a model's intent set), so
/// lookups are linear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    entries: Vec<(String, usize)>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, key: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((key.to_string(), 1)),
        }
    }

    pub fn get(&self, key: &str) -> usize {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map_or(0, |(_, c)| *c)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(k, c)| (k.as_str(), *c))
    }

    /// Entries by count descending; equal counts keep first-seen order.
    pub fn sorted_desc(&self) -> Vec<(&str, usize)> {
        let mut sorted: Vec<_> = self.iter().collect();
        // `sort_by` is stable
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        sorted
    }
}

impl Serialize for Tally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, c) in &self.entries {
            map.serialize_entry(k, c)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Session usage statistics.
///
/// Invariant: `intent_counts.total() <= total_messages`, with equality only
/// when every send carried a recognised intent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalyticsSnapshot {
    pub total_messages: usize,
    pub intent_counts: Tally,
    pub entity_counts: Tally,
    pub confidence_samples: Vec<f64>,
}

impl AnalyticsSnapshot {
    /// Arithmetic mean of the confidence samples; `None` when there are none.
    pub fn average_confidence(&self) -> Option<f64> {
        if self.confidence_samples.is_empty() {
            return None;
        }
        let sum: f64 = self.confidence_samples.iter().sum();
        Some(sum / self.confidence_samples.len() as f64)
    }
}

// ---------------------------------------------------------------------------
// Accumulator
// ---------------------------------------------------------------------------

/// Folds completed turns into the session snapshot.
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    snapshot: AnalyticsSnapshot,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed send, whether or not parsing succeeded.
    ///
    /// - the message count always goes up by one
    /// - a recognised intent is tallied, and its confidence sampled
    /// - every entity occurrence is tallied, repeats included
    pub fn record(&mut self, turn: &Turn) -> &AnalyticsSnapshot {
        let snap = &mut self.snapshot;
        snap.total_messages += 1;

        if let Some(intent) = turn.intent.as_deref() {
            snap.intent_counts.increment(intent);
            if let Some(confidence) = turn.confidence {
                snap.confidence_samples.push(confidence);
            }
        }

        for entity in &turn.entities {
            snap.entity_counts.increment(&entity.entity_type);
        }

        &self.snapshot
    }

    pub fn snapshot(&self) -> &AnalyticsSnapshot {
        &self.snapshot
    }

    pub fn average_confidence(&self) -> Option<f64> {
        self.snapshot.average_confidence()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlu::Entity;

    fn turn(intent: Option<&str>, confidence: Option<f64>, entities: &[(&str, &str)]) -> Turn {
        Turn {
            timestamp: chrono::Utc::now(),
            user_text: "x".to_string(),
            intent: intent.map(str::to_string),
            confidence,
            entities: entities.iter().map(|(t, v)| Entity::new(*t, *v)).collect(),
            bot_replies: Vec::new(),
        }
    }

    #[test]
    fn tally_counts_and_keeps_first_seen_order() {
        let mut tally = Tally::new();
        for key in ["b", "a", "b", "c"] {
            tally.increment(key);
        }
        assert_eq!(tally.get("b"), 2);
        assert_eq!(tally.get("missing"), 0);
        assert_eq!(tally.len(), 3);
        assert_eq!(tally.total(), 4);
        let order: Vec<_> = tally.iter().map(|(k, _)| k).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn sorted_desc_is_stable_for_ties() {
        let mut tally = Tally::new();
        for key in ["bye", "info", "greet", "greet"] {
            tally.increment(key);
        }
        assert_eq!(
            tally.sorted_desc(),
            vec![("greet", 2), ("bye", 1), ("info", 1)]
        );
    }

    #[test]
    fn tally_serializes_as_ordered_map() {
        let mut tally = Tally::new();
        tally.increment("zeta");
        tally.increment("alfa");
        assert_eq!(serde_json::to_string(&tally).unwrap(), r#"{"zeta":1,"alfa":1}"#);
    }

    #[test]
    fn record_counts_every_send() {
        let mut acc = Accumulator::new();
        acc.record(&turn(Some("saludo"), Some(0.9), &[]));
        acc.record(&turn(None, None, &[]));
        let snap = acc.snapshot();
        assert_eq!(snap.total_messages, 2);
        assert_eq!(snap.intent_counts.total(), 1);
    }

    #[test]
    fn confidence_only_sampled_with_intent() {
        let mut acc = Accumulator::new();
        acc.record(&turn(None, Some(0.4), &[]));
        assert!(acc.average_confidence().is_none());

        acc.record(&turn(Some("saludo"), Some(0.0), &[]));
        assert_eq!(acc.snapshot().confidence_samples, vec![0.0]);
    }

    #[test]
    fn entities_counted_without_intent() {
        let mut acc = Accumulator::new();
        acc.record(&turn(None, None, &[("producto", "widget")]));
        assert_eq!(acc.snapshot().entity_counts.get("producto"), 1);
    }

    #[test]
    fn average_confidence_is_mean() {
        let mut acc = Accumulator::new();
        acc.record(&turn(Some("a"), Some(0.5), &[]));
        acc.record(&turn(Some("b"), Some(1.0), &[]));
        let avg = acc.average_confidence().unwrap();
        assert!((avg - 0.75).abs() < 1e-9);
    }
}
