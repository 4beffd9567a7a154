/// Rasa HTTP API client.
///
/// Synchronous, built on `ureq`. One client is created per session and
/// cloned into the connectivity poller; it holds no connection state.
use std::time::Duration;

use super::types::{BotReply, ParseRequest, ParseResult, WebhookRequest};
use super::{ConnectivityState, DeliveryError, NluBackend, StatusProbe, Unavailable};
use crate::config::schema::NluConfig;

/// Default bound on `POST /model/parse` and `GET /status`.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct NluClient {
    base_url: String,
    parse_timeout: Duration,
    status_timeout: Duration,
}

impl NluClient {
    /// Build a client against `base_url` with the default 5 s timeouts.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            parse_timeout: DEFAULT_TIMEOUT,
            status_timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Build a client from the resolved `[nlu]` config section.
    pub fn from_config(config: &NluConfig) -> Self {
        Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            parse_timeout: Duration::from_millis(config.parse_timeout_ms),
            status_timeout: Duration::from_millis(config.status_timeout_ms),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /status`: any 2xx means connected.
    pub fn status(&self) -> ConnectivityState {
        match ureq::get(&self.endpoint("/status"))
            .timeout(self.status_timeout)
            .call()
        {
            Ok(_) => ConnectivityState::Connected,
            Err(_) => ConnectivityState::Disconnected,
        }
    }

    /// Join a path onto the base URL.
    ///
    /// On Windows, "localhost" may resolve to IPv6 (::1) first and stall
    /// when Rasa only binds IPv4, so it is pinned to 127.0.0.1.
    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path).replace("://localhost", "://127.0.0.1")
    }
}

impl NluBackend for NluClient {
    fn parse(&self, text: &str) -> Result<ParseResult, Unavailable> {
        let resp = ureq::post(&self.endpoint("/model/parse"))
            .timeout(self.parse_timeout)
            .send_json(ParseRequest { text })
            .map_err(unavailable)?;

        resp.into_json()
            .map_err(|e| Unavailable::Malformed(e.to_string()))
    }

    // No timeout: the webhook waits for the dialogue policy to finish,
    // however long custom actions take.
    fn send(&self, text: &str, sender: &str) -> Result<Vec<BotReply>, DeliveryError> {
        let body = WebhookRequest {
            sender,
            message: text,
        };
        let resp = ureq::post(&self.endpoint("/webhooks/rest/webhook"))
            .send_json(body)
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => DeliveryError::Status(code),
                ureq::Error::Transport(t) => DeliveryError::Unreachable(t.to_string()),
            })?;

        let replies: Option<Vec<BotReply>> = resp
            .into_json()
            .map_err(|e| DeliveryError::Malformed(e.to_string()))?;
        Ok(replies.unwrap_or_default())
    }

    fn tracker(&self, sender: &str) -> Result<serde_json::Value, Unavailable> {
        let url = self.endpoint(&format!("/conversations/{sender}/tracker"));
        let resp = ureq::get(&url)
            .timeout(self.parse_timeout)
            .call()
            .map_err(unavailable)?;

        resp.into_json()
            .map_err(|e| Unavailable::Malformed(e.to_string()))
    }
}

impl StatusProbe for NluClient {
    fn probe(&self) -> ConnectivityState {
        self.status()
    }
}

fn unavailable(err: ureq::Error) -> Unavailable {
    match err {
        ureq::Error::Status(code, _) => Unavailable::Status(code),
        ureq::Error::Transport(t) => Unavailable::Unreachable(t.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_from_default_config() {
        let client = NluClient::from_config(&NluConfig::default());
        assert_eq!(client.base_url, "http://localhost:5005");
        assert_eq!(client.parse_timeout, Duration::from_secs(5));
        assert_eq!(client.status_timeout, Duration::from_secs(5));
    }

    #[test]
    fn client_strips_trailing_slash() {
        let client = NluClient::new("http://localhost:5005/");
        assert_eq!(client.base_url(), "http://localhost:5005");
    }

    #[test]
    fn endpoint_pins_localhost_to_ipv4() {
        let client = NluClient::new("http://localhost:5005");
        assert_eq!(client.endpoint("/status"), "http://127.0.0.1:5005/status");

        let remote = NluClient::new("https://rasa.example.org");
        assert_eq!(
            remote.endpoint("/model/parse"),
            "https://rasa.example.org/model/parse"
        );
    }
}
