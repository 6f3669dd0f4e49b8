//! Credential loading, shared with the chat automation stack.
//!
//! Reads `~/.openclaw/openclaw.json` and pulls the Feishu app
//! credentials out of `channels.feishu`. Account entries win over
//! top-level keys; the first configured account is used.

use std::path::PathBuf;

use crate::client::CardError;

/// Feishu app credentials plus the API domain they belong to.
#[derive(Debug, Clone, PartialEq)]
pub struct CardCredentials {
    pub app_id: String,
    pub app_secret: String,
    /// `"feishu"` (open.feishu.cn) or `"lark"` (open.larksuite.com).
    pub domain: String,
}

impl CardCredentials {
    pub fn new(app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_secret: app_secret.into(),
            domain: "feishu".to_string(),
        }
    }

    /// Base URL of the open-platform API for this domain.
    pub fn api_base(&self) -> String {
        if self.domain == "lark" {
            "https://open.larksuite.com/open-apis".to_string()
        } else {
            "https://open.feishu.cn/open-apis".to_string()
        }
    }
}

/// Path to the shared automation config file.
pub fn config_file_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".openclaw/openclaw.json"))
}

/// Load credentials from the shared config file.
pub fn load_credentials() -> Result<CardCredentials, CardError> {
    let path = config_file_path()
        .ok_or_else(|| CardError::NotConfigured("could not determine home directory".into()))?;
    let contents = std::fs::read_to_string(&path)
        .map_err(|_| CardError::NotConfigured(format!("cannot read {}", path.display())))?;
    let cfg: serde_json::Value =
        serde_json::from_str(&contents).map_err(|e| CardError::Parse(e.to_string()))?;
    credentials_from_value(&cfg).ok_or_else(|| {
        CardError::NotConfigured(format!("no feishu appId/appSecret in {}", path.display()))
    })
}

/// Extract credentials from a parsed config. The first account wins;
/// top-level `channels.feishu` keys fill any gaps.
pub(crate) fn credentials_from_value(cfg: &serde_json::Value) -> Option<CardCredentials> {
    let feishu = cfg.get("channels")?.get("feishu")?;
    let account = feishu
        .get("accounts")
        .and_then(|a| a.as_object())
        .and_then(|m| m.values().next());

    let field = |key: &str| -> Option<String> {
        account
            .and_then(|a| a.get(key))
            .and_then(|v| v.as_str())
            .or_else(|| feishu.get(key).and_then(|v| v.as_str()))
            .map(String::from)
    };

    Some(CardCredentials {
        app_id: field("appId")?,
        app_secret: field("appSecret")?,
        domain: field("domain").unwrap_or_else(|| "feishu".to_string()),
    })
}

/// Default chat id from the environment.
pub fn default_chat_id() -> Option<String> {
    std::env::var("FEISHU_DEFAULT_CHAT_ID")
        .ok()
        .filter(|s| !s.is_empty())
}
