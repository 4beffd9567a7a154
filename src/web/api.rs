//! JSON API handlers for the web dashboard.
//!
//! Each handler maps one endpoint onto a [`Session`] method and returns a
//! `Response<Cursor<Vec<u8>>>` with JSON content. User mistakes (empty
//! message, missing intent) come back as `400` with an `error` field; a
//! failed delivery is `502`.

use std::io::Cursor;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tiny_http::{Response, StatusCode};

use crate::analytics::Turn;
use crate::dashboard::DashboardView;
use crate::nlu::{ConnectivityState, NluBackend};
use crate::session::{
    Panel, PanelState, SendError, SendState, Session, TRAIN_DONE_TOAST, intent_created_message,
};
use crate::training::{Outcome, TrainingBackend};

use super::content_type_json;

type JsonResponse = Response<Cursor<Vec<u8>>>;

// ---------------------------------------------------------------------------
// JSON request/response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct StatusResponse<'a> {
    sender_id: &'a str,
    connectivity: ConnectivityState,
    label: &'static str,
    send_state: SendState,
    dashboard_revision: u64,
}

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
}

#[derive(Serialize)]
struct DashboardResponse<'a> {
    revision: u64,
    panels: PanelState,
    view: &'a DashboardView,
}

#[derive(Serialize)]
struct HistoryResponse<'a> {
    turns: &'a [Turn],
}

#[derive(Serialize)]
struct IntentsResponse<'a> {
    intents: &'a [String],
}

#[derive(Deserialize)]
struct NewIntentRequest {
    name: String,
}

#[derive(Serialize)]
struct NewIntentResponse<'a> {
    name: String,
    message: String,
    intents: &'a [String],
}

#[derive(Serialize)]
struct ExamplesResponse {
    intent: String,
    examples: Vec<String>,
}

#[derive(Deserialize)]
struct ExampleRequest {
    #[serde(default)]
    intent: String,
    #[serde(default)]
    example: String,
}

#[derive(Serialize)]
struct TrainResponse {
    outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    toast: Option<&'static str>,
}

#[derive(Deserialize)]
struct PanelRequest {
    panel: Panel,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a JSON success response.
fn json_response<T: Serialize>(data: &T) -> Result<JsonResponse> {
    json_with_status(data, 200)
}

fn json_with_status<T: Serialize>(data: &T, status: u16) -> Result<JsonResponse> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(status)))
}

fn json_error(status: u16, message: impl std::fmt::Display) -> Result<JsonResponse> {
    json_with_status(&serde_json::json!({ "error": message.to_string() }), status)
}

/// Extract `{intent}` from `/api/intents/{intent}/examples`.
///
/// `None` for nested paths or escapes that do not decode to UTF-8.
pub fn examples_path_intent(path: &str) -> Option<String> {
    let intent = path
        .strip_prefix("/api/intents/")?
        .strip_suffix("/examples")?;
    if intent.is_empty() || intent.contains('/') {
        return None;
    }
    urlencoding::decode(intent).ok().map(|decoded| decoded.into_owned())
}

// ---------------------------------------------------------------------------
// API Handlers
// ---------------------------------------------------------------------------

/// `GET /api/status`: connectivity indicator and send state.
pub fn get_status<N: NluBackend, T: TrainingBackend>(
    session: &Session<N, T>,
) -> Result<JsonResponse> {
    let connectivity = session.connectivity().state();
    json_response(&StatusResponse {
        sender_id: session.sender_id(),
        connectivity,
        label: connectivity.label(),
        send_state: session.send_state(),
        dashboard_revision: session.dashboard_revision(),
    })
}

/// `POST /api/chat`: submit one message, body `{"message": "..."}`.
pub fn post_chat<N: NluBackend, T: TrainingBackend>(
    session: &mut Session<N, T>,
    body: &str,
) -> Result<JsonResponse> {
    let req: ChatRequest =
        serde_json::from_str(body).context("invalid JSON in chat request")?;

    match session.submit(&req.message) {
        Ok(exchange) => json_response(&exchange),
        Err(e @ (SendError::EmptyMessage | SendError::Busy)) => json_error(400, e),
        Err(e @ SendError::Delivery(_)) => json_error(502, e),
    }
}

/// `GET /api/dashboard`: the rendered analytics view.
pub fn get_dashboard<N: NluBackend, T: TrainingBackend>(
    session: &Session<N, T>,
) -> Result<JsonResponse> {
    json_response(&DashboardResponse {
        revision: session.dashboard_revision(),
        panels: session.panels(),
        view: session.dashboard(),
    })
}

/// `GET /api/history`: every recorded turn, oldest first.
pub fn get_history<N: NluBackend, T: TrainingBackend>(
    session: &Session<N, T>,
) -> Result<JsonResponse> {
    json_response(&HistoryResponse {
        turns: session.conversation().turns(),
    })
}

/// `GET /api/intents`: reload the catalog from the training bridge.
pub fn get_intents<N: NluBackend, T: TrainingBackend>(
    session: &mut Session<N, T>,
) -> Result<JsonResponse> {
    let intents = session.load_intents();
    json_response(&IntentsResponse { intents })
}

/// `POST /api/intents`: create a local intent, body `{"name": "..."}`.
pub fn post_intent<N: NluBackend, T: TrainingBackend>(
    session: &mut Session<N, T>,
    body: &str,
) -> Result<JsonResponse> {
    let req: NewIntentRequest =
        serde_json::from_str(body).context("invalid JSON in intent request")?;

    match session.new_intent(&req.name) {
        Ok(name) => json_response(&NewIntentResponse {
            message: intent_created_message(&name),
            name,
            intents: session.intents(),
        }),
        Err(e) => json_error(400, e),
    }
}

/// `GET /api/intents/{intent}/examples`
pub fn get_examples<N: NluBackend, T: TrainingBackend>(
    session: &Session<N, T>,
    intent: &str,
) -> Result<JsonResponse> {
    match session.examples(intent) {
        Ok(examples) => json_response(&ExamplesResponse {
            intent: intent.to_string(),
            examples,
        }),
        Err(e) => json_error(400, e),
    }
}

/// `POST /api/examples`: body `{"intent": "...", "example": "..."}`.
pub fn post_example<N: NluBackend, T: TrainingBackend>(
    session: &mut Session<N, T>,
    body: &str,
) -> Result<JsonResponse> {
    let req: ExampleRequest =
        serde_json::from_str(body).context("invalid JSON in example request")?;

    match session.add_example(&req.intent, &req.example) {
        Ok(added) => json_response(&added),
        Err(e) => json_error(400, e),
    }
}

/// `POST /api/train`: trigger a training run.
pub fn post_train<N: NluBackend, T: TrainingBackend>(
    session: &Session<N, T>,
) -> Result<JsonResponse> {
    let outcome = session.train();
    let toast = outcome.is_done().then_some(TRAIN_DONE_TOAST);
    json_response(&TrainResponse { outcome, toast })
}

/// `GET /api/panel`
pub fn get_panel<N: NluBackend, T: TrainingBackend>(
    session: &Session<N, T>,
) -> Result<JsonResponse> {
    json_response(&session.panels())
}

/// `POST /api/panel`: body `{"panel": "chat" | "training"}`.
pub fn post_panel<N: NluBackend, T: TrainingBackend>(
    session: &mut Session<N, T>,
    body: &str,
) -> Result<JsonResponse> {
    let req: PanelRequest =
        serde_json::from_str(body).context("invalid JSON in panel request")?;
    json_response(&session.switch_panel(req.panel))
}

/// `POST /api/panel/analytics/toggle`
pub fn post_analytics_toggle<N: NluBackend, T: TrainingBackend>(
    session: &mut Session<N, T>,
) -> Result<JsonResponse> {
    json_response(&session.toggle_analytics())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::EventLog;
    use crate::nlu::{BotReply, DeliveryError, ParseResult, Unavailable};
    use crate::training::TrainingError;
    use std::io::Read;

    struct DownNlu;

    impl NluBackend for DownNlu {
        fn parse(&self, _: &str) -> Result<ParseResult, Unavailable> {
            Err(Unavailable::Status(500))
        }
        fn send(&self, _: &str, _: &str) -> Result<Vec<BotReply>, DeliveryError> {
            Err(DeliveryError::Status(500))
        }
    }

    struct QuietNlu;

    impl NluBackend for QuietNlu {
        fn parse(&self, text: &str) -> Result<ParseResult, Unavailable> {
            Ok(ParseResult {
                text: text.to_string(),
                ..Default::default()
            })
        }
        fn send(&self, _: &str, _: &str) -> Result<Vec<BotReply>, DeliveryError> {
            Ok(Vec::new())
        }
    }

    struct OfflineTraining;

    impl TrainingBackend for OfflineTraining {
        fn list_intents(&self) -> Result<Vec<String>, TrainingError> {
            Err(TrainingError::Unreachable("refused".into()))
        }
        fn add_example(&self, _: &str, _: &str) -> Result<Option<String>, TrainingError> {
            Err(TrainingError::Unreachable("refused".into()))
        }
        fn list_examples(&self, _: &str) -> Result<Vec<String>, TrainingError> {
            Err(TrainingError::Unreachable("refused".into()))
        }
        fn train(&self) -> Result<Option<String>, TrainingError> {
            Ok(Some("Model trained successfully".into()))
        }
    }

    fn body_of(resp: JsonResponse) -> serde_json::Value {
        let mut s = String::new();
        resp.into_reader().read_to_string(&mut s).unwrap();
        serde_json::from_str(&s).unwrap()
    }

    fn session<N: NluBackend>(nlu: N) -> Session<N, OfflineTraining> {
        Session::new(nlu, OfflineTraining, "bmc_user_1", EventLog::disabled())
    }

    #[test]
    fn examples_path_decodes_escapes() {
        assert_eq!(
            examples_path_intent("/api/intents/consultar%20stock/examples"),
            Some("consultar stock".to_string())
        );
        assert_eq!(
            examples_path_intent("/api/intents/a%C3%B1o/examples"),
            Some("año".to_string())
        );
        assert_eq!(examples_path_intent("/api/intents/%FF/examples"), None);
    }

    #[test]
    fn examples_path_extracts_intent() {
        assert_eq!(
            examples_path_intent("/api/intents/saludo/examples"),
            Some("saludo".to_string())
        );
        assert_eq!(examples_path_intent("/api/intents//examples"), None);
        assert_eq!(examples_path_intent("/api/intents/a/b/examples"), None);
        assert_eq!(examples_path_intent("/api/intents"), None);
    }

    #[test]
    fn chat_delivery_failure_is_502_and_records_nothing() {
        let mut s = session(DownNlu);
        let resp = post_chat(&mut s, r#"{"message":"hola"}"#).unwrap();
        assert_eq!(resp.status_code(), StatusCode(502));
        assert_eq!(body_of(resp)["error"], "Error: Server error: 500");
        assert!(s.conversation().is_empty());
    }

    #[test]
    fn chat_empty_message_is_400() {
        let mut s = session(QuietNlu);
        let resp = post_chat(&mut s, r#"{"message":"   "}"#).unwrap();
        assert_eq!(resp.status_code(), StatusCode(400));
    }

    #[test]
    fn chat_with_no_replies_flags_no_response() {
        let mut s = session(QuietNlu);
        let json = body_of(post_chat(&mut s, r#"{"message":"hola"}"#).unwrap());
        assert_eq!(json["no_response"], true);
        assert_eq!(s.snapshot().total_messages, 1);
    }

    #[test]
    fn example_without_intent_is_400_with_message() {
        let mut s = session(QuietNlu);
        let resp = post_example(&mut s, r#"{"example":"hola"}"#).unwrap();
        assert_eq!(resp.status_code(), StatusCode(400));
        assert_eq!(body_of(resp)["error"], "Por favor selecciona un intent");
    }

    #[test]
    fn train_success_carries_toast() {
        let s = session(QuietNlu);
        let json = body_of(post_train(&s).unwrap());
        assert_eq!(json["outcome"]["status"], "done");
        assert_eq!(json["toast"], "Modelo entrenado exitosamente");
    }

    #[test]
    fn intents_fall_back_when_offline() {
        let mut s = session(QuietNlu);
        let json = body_of(get_intents(&mut s).unwrap());
        assert_eq!(json["intents"][0], "saludo");
        assert_eq!(json["intents"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn panel_switch_and_toggle() {
        let mut s = session(QuietNlu);
        let json = body_of(post_panel(&mut s, r#"{"panel":"training"}"#).unwrap());
        assert_eq!(json["active"], "training");
        let json = body_of(post_analytics_toggle(&mut s).unwrap());
        assert_eq!(json["analytics_collapsed"], true);
        assert_eq!(json["active"], "training");
    }

    #[test]
    fn status_reports_disconnected_by_default() {
        let s = session(QuietNlu);
        let json = body_of(get_status(&s).unwrap());
        assert_eq!(json["connectivity"], "disconnected");
        assert_eq!(json["send_state"], "idle");
    }
}
