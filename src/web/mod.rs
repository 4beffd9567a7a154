//! Embedded web dashboard for chatdash.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - A single-page chat, training and analytics dashboard
//! - JSON API endpoints backed by one [`Session`]
//!
//! Launched via `chatdash web` (default: `http://127.0.0.1:8085`).

mod api;
mod frontend;

use std::io::Cursor;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::nlu::NluBackend;
use crate::session::Session;
use crate::training::TrainingBackend;

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the web dashboard on `addr`, serving `session`.
///
/// Blocks the current thread. Requests are handled one at a time, so a
/// chat send in flight holds later requests until it completes. Errors are
/// answered per request without stopping the server.
pub fn serve<N: NluBackend, T: TrainingBackend>(
    addr: &str,
    open: bool,
    session: &mut Session<N, T>,
) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    println!("chatdash dashboard running at http://{addr}");
    println!("Session: {}", session.sender_id());
    println!("Press Ctrl+C to stop.\n");

    if open {
        let _ = open_browser(&format!("http://{addr}"));
    }

    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let body = if matches!(method, Method::Put | Method::Post | Method::Patch) {
            let mut buf = String::new();
            let _ = request.as_reader().read_to_string(&mut buf);
            Some(buf)
        } else {
            None
        };

        let response = dispatch(session, &method, &url, body.as_deref())
            .unwrap_or_else(|e| internal_error(&e));
        let _ = request.respond(response);

        // Brief access log
        println!(
            "{} {} {}",
            method,
            url,
            chrono::Local::now().format("%H:%M:%S")
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Dispatch an incoming request to the appropriate handler.
fn dispatch<N: NluBackend, T: TrainingBackend>(
    session: &mut Session<N, T>,
    method: &Method,
    url: &str,
    body: Option<&str>,
) -> Result<Response<Cursor<Vec<u8>>>> {
    let path = url.split('?').next().unwrap_or(url);
    let body = body.unwrap_or("{}");

    match (method, path) {
        (&Method::Get, "/") | (&Method::Get, "/index.html") => Ok(serve_frontend()),

        // Chat
        (&Method::Get, "/api/status") => api::get_status(session),
        (&Method::Post, "/api/chat") => api::post_chat(session, body),
        (&Method::Get, "/api/history") => api::get_history(session),

        // Analytics
        (&Method::Get, "/api/dashboard") => api::get_dashboard(session),

        // Training
        (&Method::Get, "/api/intents") => api::get_intents(session),
        (&Method::Post, "/api/intents") => api::post_intent(session, body),
        (&Method::Post, "/api/examples") => api::post_example(session, body),
        (&Method::Post, "/api/train") => api::post_train(session),
        (&Method::Get, p) if p.starts_with("/api/intents/") => match api::examples_path_intent(p) {
            Some(intent) => api::get_examples(session, &intent),
            None => Ok(not_found()),
        },

        // Panels
        (&Method::Get, "/api/panel") => api::get_panel(session),
        (&Method::Post, "/api/panel") => api::post_panel(session, body),
        (&Method::Post, "/api/panel/analytics/toggle") => api::post_analytics_toggle(session),

        _ => Ok(not_found()),
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Serve the embedded single-page frontend.
fn serve_frontend() -> Response<Cursor<Vec<u8>>> {
    Response::from_data(frontend::INDEX_HTML.as_bytes().to_vec())
        .with_header(content_type_html())
        .with_status_code(StatusCode(200))
}

fn not_found() -> Response<Cursor<Vec<u8>>> {
    let body = r#"{"error": "not found"}"#;
    Response::from_data(body.as_bytes().to_vec())
        .with_header(content_type_json())
        .with_status_code(StatusCode(404))
}

fn internal_error(err: &anyhow::Error) -> Response<Cursor<Vec<u8>>> {
    let body = serde_json::json!({ "error": format!("{err:#}") }).to_string();
    Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(500))
}

/// JSON content type header.
pub(crate) fn content_type_json() -> Header {
    Header::from_bytes("Content-Type", "application/json; charset=utf-8").unwrap()
}

fn content_type_html() -> Header {
    Header::from_bytes("Content-Type", "text/html; charset=utf-8").unwrap()
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
