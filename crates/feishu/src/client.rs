//! Feishu open-platform client.
//!
//! Blocking reqwest client (no Tokio runtime required). Covers the
//! card flow: tenant token → image uploads → send or reply.

use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde_json::{json, Value};

use crate::card::{card_payload, element_json, CardElement, Section, sections_to_elements};
use crate::config::{load_credentials, CardCredentials};

/// Error type for card operations.
#[derive(Debug)]
pub enum CardError {
    /// Credentials missing or unreadable
    NotConfigured(String),
    /// Network error
    Network(String),
    /// HTTP error with status code
    Http(u16, String),
    /// The platform replied with a non-zero code
    Api { code: i64, msg: String },
    /// JSON parsing error
    Parse(String),
    /// Local file I/O error
    Io(String),
}

impl std::fmt::Display for CardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CardError::NotConfigured(msg) => write!(f, "Not configured: {}", msg),
            CardError::Network(msg) => write!(f, "Network error: {}", msg),
            CardError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            CardError::Api { code, msg } => write!(f, "API error {}: {}", code, msg),
            CardError::Parse(msg) => write!(f, "Parse error: {}", msg),
            CardError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for CardError {}

/// Receipt for a sent message.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SendReceipt {
    pub message_id: String,
}

/// A token this close to expiry is not reused.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Feishu card client (blocking).
pub struct CardClient {
    http: reqwest::blocking::Client,
    api_base: String,
    creds: CardCredentials,
    token: Mutex<Option<CachedToken>>,
}

impl CardClient {
    /// Create a client from the shared automation config file.
    pub fn from_default_config() -> Result<Self, CardError> {
        Ok(Self::new(load_credentials()?))
    }

    /// Create a client with explicit credentials.
    pub fn new(creds: CardCredentials) -> Self {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("rkit/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        let api_base = creds.api_base();
        Self {
            http,
            api_base,
            creds,
            token: Mutex::new(None),
        }
    }

    /// Override the API base URL (tests, private deployments).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Upload a local image and return its image key.
    pub fn upload_image(&self, image_path: &Path) -> Result<String, CardError> {
        let token = self.tenant_token()?;
        let file_name = image_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image.png")
            .to_string();
        let bytes = std::fs::read(image_path)
            .map_err(|e| CardError::Io(format!("{}: {}", image_path.display(), e)))?;

        let part = reqwest::blocking::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("image/png")
            .map_err(|e| CardError::Parse(e.to_string()))?;
        let form = reqwest::blocking::multipart::Form::new()
            .text("image_type", "message")
            .part("image", part);

        let url = format!("{}/im/v1/images", self.api_base);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .multipart(form)
            .send()
            .map_err(|e| CardError::Network(e.to_string()))?;
        let json = check_status(response)?
            .json::<Value>()
            .map_err(|e| CardError::Parse(e.to_string()))?;
        check_api_code(&json)?;

        json["data"]["image_key"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| CardError::Parse("Missing image_key in response".into()))
    }

    /// Send a rich card with mixed text and images. Local images are
    /// uploaded first; `reply_to` threads the card under an existing
    /// message instead of posting to the chat directly.
    pub fn send_rich_card(
        &self,
        chat_id: &str,
        title: &str,
        elements: &[CardElement],
        template: &str,
        reply_to: Option<&str>,
    ) -> Result<SendReceipt, CardError> {
        let rendered = elements
            .iter()
            .map(|e| self.render_element(e))
            .collect::<Result<Vec<_>, _>>()?;
        let card = card_payload(title, template, &rendered);
        let content =
            serde_json::to_string(&card).map_err(|e| CardError::Parse(e.to_string()))?;
        let token = self.tenant_token()?;

        let response = if let Some(message_id) = reply_to {
            let url = format!("{}/im/v1/messages/{}/reply", self.api_base, message_id);
            self.http
                .post(&url)
                .bearer_auth(&token)
                .json(&json!({ "msg_type": "interactive", "content": content }))
                .send()
        } else {
            let url = format!("{}/im/v1/messages", self.api_base);
            self.http
                .post(&url)
                .bearer_auth(&token)
                .query(&[("receive_id_type", "chat_id")])
                .json(&json!({
                    "receive_id": chat_id,
                    "msg_type": "interactive",
                    "content": content,
                }))
                .send()
        }
        .map_err(|e| CardError::Network(e.to_string()))?;

        let json = check_status(response)?
            .json::<Value>()
            .map_err(|e| CardError::Parse(e.to_string()))?;
        check_api_code(&json)?;

        let message_id = json["data"]["message_id"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| CardError::Parse("Missing message_id in response".into()))?;
        log::info!("card sent: {}", message_id);
        Ok(SendReceipt { message_id })
    }

    /// Quick helper: single-image report card.
    pub fn send_image_report(
        &self,
        chat_id: &str,
        title: &str,
        image_path: &Path,
        intro: &str,
        conclusion: &str,
        template: &str,
    ) -> Result<SendReceipt, CardError> {
        let mut elements = Vec::new();
        if !intro.is_empty() {
            elements.push(CardElement::Markdown(intro.to_string()));
        }
        elements.push(CardElement::Image {
            path: image_path.to_path_buf(),
            alt: title.to_string(),
        });
        if !conclusion.is_empty() {
            elements.push(CardElement::Markdown(conclusion.to_string()));
        }
        self.send_rich_card(chat_id, title, &elements, template, None)
    }

    /// Structured progress report: rule-separated sections, each with
    /// a heading, body, and optional image.
    pub fn send_progress_report(
        &self,
        chat_id: &str,
        title: &str,
        sections: &[Section],
        template: &str,
    ) -> Result<SendReceipt, CardError> {
        self.send_rich_card(chat_id, title, &sections_to_elements(sections), template, None)
    }

    // ── Internal helpers ────────────────────────────────────────────

    /// Get or refresh the tenant access token.
    fn tenant_token(&self) -> Result<String, CardError> {
        let mut cache = self.token.lock().unwrap();
        if let Some(cached) = cache.as_ref() {
            if cached.expires_at > Instant::now() + TOKEN_EXPIRY_MARGIN {
                return Ok(cached.token.clone());
            }
        }

        let url = format!("{}/auth/v3/tenant_access_token/internal", self.api_base);
        let response = self
            .http
            .post(&url)
            .json(&json!({
                "app_id": self.creds.app_id,
                "app_secret": self.creds.app_secret,
            }))
            .send()
            .map_err(|e| CardError::Network(e.to_string()))?;
        let json = check_status(response)?
            .json::<Value>()
            .map_err(|e| CardError::Parse(e.to_string()))?;
        check_api_code(&json)?;

        let token = json["tenant_access_token"]
            .as_str()
            .ok_or_else(|| CardError::Parse("Missing tenant_access_token in response".into()))?
            .to_string();
        let expire = json["expire"].as_u64().unwrap_or(7200);
        *cache = Some(CachedToken {
            token: token.clone(),
            expires_at: Instant::now() + Duration::from_secs(expire),
        });
        Ok(token)
    }

    fn render_element(&self, element: &CardElement) -> Result<Value, CardError> {
        let resolved = match element {
            CardElement::Image { path, alt } => {
                let key = self.upload_image(path)?;
                CardElement::ImageKey {
                    key,
                    alt: alt.clone(),
                }
            }
            other => other.clone(),
        };
        element_json(&resolved)
            .ok_or_else(|| CardError::Parse("unrenderable card element".into()))
    }
}

fn check_status(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, CardError> {
    let status = response.status().as_u16();
    if !response.status().is_success() {
        let body = response.text().unwrap_or_default();
        return Err(CardError::Http(status, body));
    }
    Ok(response)
}

fn check_api_code(json: &Value) -> Result<(), CardError> {
    let code = json["code"].as_i64().unwrap_or(0);
    if code != 0 {
        return Err(CardError::Api {
            code,
            msg: json["msg"].as_str().unwrap_or("unknown error").to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client_for(server: &MockServer) -> CardClient {
        CardClient::new(CardCredentials::new("app-id", "app-secret"))
            .with_api_base(server.base_url())
    }

    fn mock_token(server: &MockServer) -> httpmock::Mock<'_> {
        server.mock(|when, then| {
            when.method(POST).path("/auth/v3/tenant_access_token/internal");
            then.status(200).json_body(serde_json::json!({
                "code": 0,
                "msg": "ok",
                "tenant_access_token": "t-abc",
                "expire": 7200,
            }));
        })
    }

    #[test]
    fn sends_card_and_returns_message_id() {
        let server = MockServer::start();
        let token = mock_token(&server);
        let send = server.mock(|when, then| {
            when.method(POST)
                .path("/im/v1/messages")
                .query_param("receive_id_type", "chat_id")
                .header("Authorization", "Bearer t-abc")
                .json_body_includes(r#"{ "receive_id": "oc_123", "msg_type": "interactive" }"#);
            then.status(200).json_body(serde_json::json!({
                "code": 0,
                "msg": "success",
                "data": { "message_id": "om_42" },
            }));
        });

        let client = client_for(&server);
        let elements = [CardElement::Markdown("hello".into())];
        let receipt = client
            .send_rich_card("oc_123", "Title", &elements, "blue", None)
            .unwrap();

        assert_eq!(receipt.message_id, "om_42");
        token.assert();
        send.assert();
    }

    #[test]
    fn token_is_cached_across_sends() {
        let server = MockServer::start();
        let token = mock_token(&server);
        let send = server.mock(|when, then| {
            when.method(POST).path("/im/v1/messages");
            then.status(200).json_body(serde_json::json!({
                "code": 0,
                "data": { "message_id": "om_1" },
            }));
        });

        let client = client_for(&server);
        let elements = [CardElement::Hr];
        client
            .send_rich_card("oc_1", "a", &elements, "blue", None)
            .unwrap();
        client
            .send_rich_card("oc_1", "b", &elements, "blue", None)
            .unwrap();

        assert_eq!(send.hits(), 2);
        assert_eq!(token.hits(), 1);
    }

    #[test]
    fn reply_posts_to_reply_endpoint() {
        let server = MockServer::start();
        mock_token(&server);
        let reply = server.mock(|when, then| {
            when.method(POST)
                .path("/im/v1/messages/om_parent/reply")
                .json_body_includes(r#"{ "msg_type": "interactive" }"#);
            then.status(200).json_body(serde_json::json!({
                "code": 0,
                "data": { "message_id": "om_child" },
            }));
        });

        let client = client_for(&server);
        let elements = [CardElement::Note("footer".into())];
        let receipt = client
            .send_rich_card("oc_ignored", "t", &elements, "blue", Some("om_parent"))
            .unwrap();

        assert_eq!(receipt.message_id, "om_child");
        reply.assert();
    }

    #[test]
    fn nonzero_api_code_is_api_error() {
        let server = MockServer::start();
        mock_token(&server);
        server.mock(|when, then| {
            when.method(POST).path("/im/v1/messages");
            then.status(200).json_body(serde_json::json!({
                "code": 230001,
                "msg": "Your request contains an invalid request parameter",
            }));
        });

        let client = client_for(&server);
        let err = client
            .send_rich_card("bad", "t", &[CardElement::Hr], "blue", None)
            .unwrap_err();

        match err {
            CardError::Api { code, .. } => assert_eq!(code, 230001),
            other => panic!("expected Api error, got {}", other),
        }
    }

    #[test]
    fn http_failure_is_http_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/auth/v3/tenant_access_token/internal");
            then.status(500).body("internal error");
        });

        let client = client_for(&server);
        let err = client
            .send_rich_card("oc", "t", &[CardElement::Hr], "blue", None)
            .unwrap_err();
        assert!(matches!(err, CardError::Http(500, _)));
    }

    #[test]
    fn image_element_uploads_before_send() {
        let server = MockServer::start();
        mock_token(&server);
        let upload = server.mock(|when, then| {
            when.method(POST)
                .path("/im/v1/images")
                .header("Authorization", "Bearer t-abc");
            then.status(200).json_body(serde_json::json!({
                "code": 0,
                "data": { "image_key": "img_v3_key" },
            }));
        });
        let send = server.mock(|when, then| {
            when.method(POST).path("/im/v1/messages");
            then.status(200).json_body(serde_json::json!({
                "code": 0,
                "data": { "message_id": "om_img" },
            }));
        });

        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("plot.png");
        std::fs::write(&image, b"\x89PNG\r\n\x1a\nfake").unwrap();

        let client = client_for(&server);
        let elements = [CardElement::Image {
            path: image,
            alt: "plot".into(),
        }];
        let receipt = client
            .send_rich_card("oc_1", "t", &elements, "blue", None)
            .unwrap();

        assert_eq!(receipt.message_id, "om_img");
        upload.assert();
        send.assert();
    }

    #[test]
    fn missing_image_file_is_io_error() {
        let server = MockServer::start();
        mock_token(&server);

        let client = client_for(&server);
        let elements = [CardElement::Image {
            path: "/no/such/plot.png".into(),
            alt: "plot".into(),
        }];
        let err = client
            .send_rich_card("oc_1", "t", &elements, "blue", None)
            .unwrap_err();
        assert!(matches!(err, CardError::Io(_)));
    }
}
