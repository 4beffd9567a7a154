//! Dashboard presenter.
//!
//! Turns an [`AnalyticsSnapshot`] into plain display data: headline counts,
//! the sorted intent distribution, and the label/value arrays for the two
//! charts. Front ends draw whatever [`DashboardView`] they are handed and
//! redraw both charts in full on every update.

pub mod highlight;

use serde::Serialize;

use crate::analytics::AnalyticsSnapshot;

/// Everything a front end needs to draw the analytics panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardView {
    pub total_messages: usize,
    pub distinct_intents: usize,
    pub distinct_entities: usize,
    /// Mean confidence (0.0–1.0), absent until one is recorded.
    pub average_confidence: Option<f64>,
    /// `"87.5%"`, or empty when there is no average.
    pub average_confidence_label: String,
    /// Intents by count descending, ties in discovery order.
    pub distribution: Vec<IntentRow>,
    pub intent_chart: ChartData,
    pub entity_chart: ChartData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntentRow {
    pub intent: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    #[default]
    Bar,
    /// Parts of a whole (doughnut/stacked bar).
    Proportional,
}

/// Parallel label/value arrays for one chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

/// Derive the full dashboard view from a snapshot.
pub fn render(snapshot: &AnalyticsSnapshot) -> DashboardView {
    let average_confidence = snapshot.average_confidence();

    DashboardView {
        total_messages: snapshot.total_messages,
        distinct_intents: snapshot.intent_counts.len(),
        distinct_entities: snapshot.entity_counts.len(),
        average_confidence,
        average_confidence_label: average_confidence.map(format_percentage).unwrap_or_default(),
        distribution: snapshot
            .intent_counts
            .sorted_desc()
            .into_iter()
            .map(|(intent, count)| IntentRow {
                intent: intent.to_string(),
                count,
            })
            .collect(),
        intent_chart: intent_chart(snapshot),
        entity_chart: entity_chart(snapshot),
    }
}

/// Bar chart of each intent's share (%) of all recognised intents.
fn intent_chart(snapshot: &AnalyticsSnapshot) -> ChartData {
    let total = snapshot.intent_counts.total();
    let (labels, values) = snapshot
        .intent_counts
        .iter()
        .map(|(intent, count)| {
            let pct = if total == 0 {
                0.0
            } else {
                count as f64 / total as f64 * 100.0
            };
            (intent.to_string(), pct)
        })
        .unzip();

    ChartData {
        kind: ChartKind::Bar,
        labels,
        values,
    }
}

/// Proportional chart of raw entity counts.
fn entity_chart(snapshot: &AnalyticsSnapshot) -> ChartData {
    let (labels, values) = snapshot
        .entity_counts
        .iter()
        .map(|(entity, count)| (entity.to_string(), count as f64))
        .unzip();

    ChartData {
        kind: ChartKind::Proportional,
        labels,
        values,
    }
}

/// Format a 0.0–1.0 ratio as a percentage with one decimal, e.g. `"93.4%"`.
pub fn format_percentage(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

/// Holds the last rendered view; re-renders from scratch on every refresh.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    view: DashboardView,
    revision: u64,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refresh(&mut self, snapshot: &AnalyticsSnapshot) -> &DashboardView {
        self.view = render(snapshot);
        self.revision += 1;
        &self.view
    }

    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    /// Number of renders so far; front ends poll this to know when to redraw.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
