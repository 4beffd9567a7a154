//! Session controller.
//!
//! One [`Session`] owns everything a chat session accumulates: the
//! conversation log, the analytics accumulator, the rendered dashboard,
//! the intent catalog and the panel state. Front ends (REPL, web) call its
//! methods and draw what comes back; validation and state transitions all
//! live here.
//!
//! A send runs `Idle -> Sending -> Idle`. The send affordance is disabled
//! for the whole call and re-enabled by a drop guard whatever the result.

pub mod affordance;
pub mod catalog;
pub mod connectivity;

pub use affordance::{SendAffordance, SendGuard, SendState};
pub use catalog::{CatalogError, IntentCatalog, normalize_intent_name};
pub use connectivity::{ConnectivityIndicator, StatusPoller};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::analytics::{Accumulator, AnalyticsSnapshot, ConversationLog, EventLog, Turn};
use crate::dashboard::highlight::{self, Segment};
use crate::dashboard::{Dashboard, DashboardView, format_percentage};
use crate::nlu::{BotReply, DeliveryError, NluBackend, ParseResult, Unavailable};
use crate::training::{Outcome, TrainingBackend, TrainingDesk};

/// Shown in place of bot replies when delivery succeeds with none.
pub const NO_RESPONSE_TEXT: &str = "No hay respuesta del chatbot";

/// Toast shown after a successful training run.
pub const TRAIN_DONE_TOAST: &str = "Modelo entrenado exitosamente";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    #[error("El mensaje está vacío")]
    EmptyMessage,
    /// A send is already in flight.
    #[error("Ya hay un mensaje en curso")]
    Busy,
    #[error("Error: {0}")]
    Delivery(#[from] DeliveryError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrainingInputError {
    #[error("Por favor selecciona un intent")]
    MissingIntent,
    #[error("Por favor ingresa un ejemplo")]
    MissingExample,
}

// ---------------------------------------------------------------------------
// Panels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    #[default]
    Chat,
    Training,
}

/// Which panel is visible and whether analytics is collapsed.
///
/// Independent of the send state: switching never touches a send.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PanelState {
    pub active: Panel,
    pub analytics_collapsed: bool,
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Intent badge shown under bot replies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplyAnnotation {
    pub intent: String,
    /// `"Confianza: 93.4%"`
    pub confidence_label: String,
}

impl ReplyAnnotation {
    fn from_parse(parse: &ParseResult) -> Self {
        Self {
            intent: parse.intent_name().unwrap_or("unknown").to_string(),
            confidence_label: format!(
                "Confianza: {}",
                format_percentage(parse.confidence().unwrap_or(0.0))
            ),
        }
    }
}

/// Everything a front end needs to display one completed send.
#[derive(Debug, Clone, Serialize)]
pub struct Exchange {
    pub turn: Turn,
    pub replies: Vec<BotReply>,
    /// Absent when the parse call was unavailable.
    pub parse: Option<ParseResult>,
    /// Delivery succeeded but the bot said nothing.
    pub no_response: bool,
    /// User text split for entity highlighting.
    pub highlighted: Vec<Segment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<ReplyAnnotation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExampleAdded {
    pub outcome: Outcome,
    /// Refreshed example list, only after the bridge accepted the example.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct Session<N, T> {
    sender_id: String,
    nlu: N,
    training: TrainingDesk<T>,
    conversation: ConversationLog,
    accumulator: Accumulator,
    dashboard: Dashboard,
    catalog: IntentCatalog,
    panels: PanelState,
    affordance: SendAffordance,
    connectivity: ConnectivityIndicator,
    events: EventLog,
}

impl<N: NluBackend, T: TrainingBackend> Session<N, T> {
    pub fn new(nlu: N, training: T, sender_id: impl Into<String>, events: EventLog) -> Self {
        Self {
            sender_id: sender_id.into(),
            nlu,
            training: TrainingDesk::new(training, events.clone()),
            conversation: ConversationLog::new(),
            accumulator: Accumulator::new(),
            dashboard: Dashboard::new(),
            catalog: IntentCatalog::new(),
            panels: PanelState::default(),
            affordance: SendAffordance::new(),
            connectivity: ConnectivityIndicator::new(),
            events,
        }
    }

    pub fn sender_id(&self) -> &str {
        &self.sender_id
    }

    pub fn nlu(&self) -> &N {
        &self.nlu
    }

    pub fn training(&self) -> &TrainingDesk<T> {
        &self.training
    }

    // -- chat ---------------------------------------------------------------

    /// Submit one user message.
    ///
    /// Parse failure is tolerated (the turn is recorded without intent
    /// data). Delivery failure commits nothing: no turn, no analytics.
    pub fn submit(&mut self, text: &str) -> Result<Exchange, SendError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SendError::EmptyMessage);
        }
        if !self.affordance.is_enabled() {
            return Err(SendError::Busy);
        }
        let _guard = self.affordance.disable();

        let parse = match self.nlu.parse(text) {
            Ok(result) => Some(result),
            Err(e) => {
                self.events.parse_unavailable(&self.sender_id, &e.to_string());
                None
            }
        };

        let replies = match self.nlu.send(text, &self.sender_id) {
            Ok(replies) => replies,
            Err(e) => {
                self.events.delivery_failed(&self.sender_id, &e.to_string());
                return Err(e.into());
            }
        };

        let turn = Turn::new(text, parse.as_ref(), &replies);
        let snapshot = self.accumulator.record(&turn);
        self.dashboard.refresh(snapshot);
        self.events
            .turn_recorded(&self.sender_id, turn.intent.as_deref());
        self.conversation.append(turn.clone());

        let highlighted = highlight::segments(text, &turn.entities);
        let annotation = parse.as_ref().map(ReplyAnnotation::from_parse);
        Ok(Exchange {
            no_response: replies.is_empty(),
            turn,
            replies,
            parse,
            highlighted,
            annotation,
        })
    }

    /// Intent analysis only; records nothing.
    pub fn parse_only(&self, text: &str) -> Result<ParseResult, Unavailable> {
        self.nlu.parse(text.trim())
    }

    /// Backend-side dialogue state for this session's sender.
    pub fn tracker(&self) -> Result<serde_json::Value, Unavailable> {
        self.nlu.tracker(&self.sender_id)
    }

    pub fn conversation(&self) -> &ConversationLog {
        &self.conversation
    }

    pub fn snapshot(&self) -> &AnalyticsSnapshot {
        self.accumulator.snapshot()
    }

    pub fn average_confidence(&self) -> Option<f64> {
        self.accumulator.average_confidence()
    }

    pub fn dashboard(&self) -> &DashboardView {
        self.dashboard.view()
    }

    pub fn dashboard_revision(&self) -> u64 {
        self.dashboard.revision()
    }

    /// Shared handle to the send control, for front ends that render it.
    pub fn affordance(&self) -> &SendAffordance {
        &self.affordance
    }

    pub fn send_state(&self) -> SendState {
        self.affordance.state()
    }

    /// Shared handle to the connectivity indicator; give a clone to a
    /// [`StatusPoller`].
    pub fn connectivity(&self) -> &ConnectivityIndicator {
        &self.connectivity
    }

    // -- panels -------------------------------------------------------------

    pub fn panels(&self) -> PanelState {
        self.panels
    }

    pub fn switch_panel(&mut self, panel: Panel) -> PanelState {
        self.panels.active = panel;
        self.panels
    }

    pub fn toggle_analytics(&mut self) -> PanelState {
        self.panels.analytics_collapsed = !self.panels.analytics_collapsed;
        self.panels
    }

    // -- training -----------------------------------------------------------

    /// Reload the catalog from the training bridge (or its fallback set).
    pub fn load_intents(&mut self) -> &[String] {
        self.catalog.replace(self.training.list_intents());
        self.catalog.names()
    }

    pub fn intents(&self) -> &[String] {
        self.catalog.names()
    }

    /// Add a locally created intent; returns its normalised name.
    pub fn new_intent(&mut self, raw: &str) -> Result<String, CatalogError> {
        self.catalog.add_local(raw)
    }

    /// Validate and submit a training example.
    ///
    /// After the bridge accepts it, the examples for that intent are
    /// re-fetched so the caller can show the updated list.
    pub fn add_example(
        &mut self,
        intent: &str,
        example: &str,
    ) -> Result<ExampleAdded, TrainingInputError> {
        let intent = intent.trim();
        let example = example.trim();
        if intent.is_empty() {
            return Err(TrainingInputError::MissingIntent);
        }
        if example.is_empty() {
            return Err(TrainingInputError::MissingExample);
        }

        let outcome = self.training.add_example(intent, example);
        let examples = outcome
            .is_done()
            .then(|| self.training.list_examples(intent));
        Ok(ExampleAdded { outcome, examples })
    }

    /// Examples for `intent`. A blank intent never reaches the bridge.
    pub fn examples(&self, intent: &str) -> Result<Vec<String>, TrainingInputError> {
        let intent = intent.trim();
        if intent.is_empty() {
            return Err(TrainingInputError::MissingIntent);
        }
        Ok(self.training.list_examples(intent))
    }

    pub fn train(&self) -> Outcome {
        self.training.train()
    }
}

/// Per-session sender id: `"<prefix>_<unix millis>"`.
pub fn generate_sender_id(prefix: &str) -> String {
    format!("{prefix}_{}", Utc::now().timestamp_millis())
}

/// Message for a freshly created intent.
pub fn intent_created_message(name: &str) -> String {
    format!("Intent \"{name}\" creado")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlu::{Entity, IntentPrediction};
    use crate::training::TrainingError;

    struct EchoNlu;

    impl NluBackend for EchoNlu {
        fn parse(&self, text: &str) -> Result<ParseResult, Unavailable> {
            Ok(ParseResult {
                text: text.to_string(),
                intent: Some(IntentPrediction {
                    name: Some("saludo".into()),
                    confidence: Some(0.9),
                }),
                entities: vec![Entity::new("producto", "widget")],
            })
        }
        fn send(&self, text: &str, _: &str) -> Result<Vec<BotReply>, DeliveryError> {
            Ok(vec![BotReply::text(format!("eco: {text}"))])
        }
    }

    struct NoTraining;

    impl TrainingBackend for NoTraining {
        fn list_intents(&self) -> Result<Vec<String>, TrainingError> {
            Err(TrainingError::Unreachable("down".into()))
        }
        fn add_example(&self, _: &str, _: &str) -> Result<Option<String>, TrainingError> {
            Err(TrainingError::Unreachable("down".into()))
        }
        fn list_examples(&self, _: &str) -> Result<Vec<String>, TrainingError> {
            Err(TrainingError::Unreachable("down".into()))
        }
        fn train(&self) -> Result<Option<String>, TrainingError> {
            Err(TrainingError::Unreachable("down".into()))
        }
    }

    fn session() -> Session<EchoNlu, NoTraining> {
        Session::new(EchoNlu, NoTraining, "bmc_user_1", EventLog::disabled())
    }

    #[test]
    fn submit_records_turn_and_refreshes_dashboard() {
        let mut s = session();
        let exchange = s.submit("  quiero un widget ").unwrap();
        assert_eq!(exchange.turn.user_text, "quiero un widget");
        assert_eq!(exchange.turn.bot_replies, vec!["eco: quiero un widget"]);
        assert!(!exchange.no_response);
        assert_eq!(s.conversation().len(), 1);
        assert_eq!(s.dashboard().total_messages, 1);
        assert_eq!(s.dashboard_revision(), 1);
        assert_eq!(s.send_state(), SendState::Idle);
    }

    #[test]
    fn submit_annotates_and_highlights() {
        let mut s = session();
        let exchange = s.submit("un Widget").unwrap();
        let annotation = exchange.annotation.unwrap();
        assert_eq!(annotation.intent, "saludo");
        assert_eq!(annotation.confidence_label, "Confianza: 90.0%");
        assert_eq!(exchange.highlighted[1].entity.as_deref(), Some("producto"));
    }

    #[test]
    fn empty_submission_is_rejected_without_effect() {
        let mut s = session();
        assert_eq!(s.submit("   ").unwrap_err(), SendError::EmptyMessage);
        assert!(s.conversation().is_empty());
        assert_eq!(s.snapshot().total_messages, 0);
    }

    #[test]
    fn submit_while_disabled_is_busy() {
        let mut s = session();
        let guard = s.affordance().disable();
        assert_eq!(s.submit("hola").unwrap_err(), SendError::Busy);
        drop(guard);
        assert!(s.submit("hola").is_ok());
    }

    #[test]
    fn panels_are_independent_toggles() {
        let mut s = session();
        assert_eq!(s.panels().active, Panel::Chat);
        s.switch_panel(Panel::Training);
        let state = s.toggle_analytics();
        assert_eq!(state.active, Panel::Training);
        assert!(state.analytics_collapsed);
        assert!(!s.toggle_analytics().analytics_collapsed);
    }

    #[test]
    fn load_intents_uses_fallback() {
        let mut s = session();
        assert_eq!(
            s.load_intents(),
            ["saludo", "despedida", "cotizar_producto", "fallback"]
        );
        assert_eq!(s.new_intent("Pedir Factura").unwrap(), "pedir_factura");
        assert_eq!(s.intents().len(), 5);
    }

    #[test]
    fn add_example_validates_before_calling_bridge() {
        let mut s = session();
        assert_eq!(
            s.add_example("", "hola").unwrap_err(),
            TrainingInputError::MissingIntent
        );
        assert_eq!(
            s.add_example("saludo", "  ").unwrap_err(),
            TrainingInputError::MissingExample
        );

        let added = s.add_example("saludo", "hola buenas").unwrap();
        assert!(matches!(added.outcome, Outcome::Offline(_)));
        assert_eq!(added.examples, None);
    }

    #[test]
    fn sender_id_has_prefix_and_millis() {
        let id = generate_sender_id("bmc_user");
        let millis = id.strip_prefix("bmc_user_").unwrap();
        assert!(millis.parse::<i64>().is_ok());
    }

    #[test]
    fn intent_created_text() {
        assert_eq!(intent_created_message("pedir_factura"), "Intent \"pedir_factura\" creado");
    }
}
