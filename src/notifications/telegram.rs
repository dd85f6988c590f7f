//! Thin Telegram Bot API client: `sendMessage` for outbound texts and
//! `getUpdates` for the command poller.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;
use std::time::Duration;

use super::{NotificationError, NotificationSink};

/// Extra time allowed on top of a long-poll timeout before the HTTP request
/// itself is abandoned
const LONG_POLL_GRACE: Duration = Duration::from_secs(10);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Clone)]
pub struct TelegramClient {
    api_base: String,
    token: String,
    client: reqwest::Client,
}

// Token stays out of Debug output.
impl fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramClient")
            .field("api_base", &self.api_base)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl TelegramClient {
    pub fn new(api_base: &str, token: &str) -> Result<Self, NotificationError> {
        if token.trim().is_empty() {
            return Err(NotificationError::Unavailable("bot token is empty".to_string()));
        }
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| NotificationError::Transport(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.trim().to_string(),
            client,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<T, NotificationError> {
        let response = self
            .client
            .post(self.method_url(method))
            .timeout(timeout)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        let parsed: ApiResponse<T> = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(NotificationError::Rejected {
                    status: status.as_u16(),
                    description: text,
                })
            }
            Err(e) => {
                return Err(NotificationError::InvalidResponse(format!("{method}: {e}")));
            }
        };

        if !status.is_success() || !parsed.ok {
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                description: parsed
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            });
        }

        parsed
            .result
            .ok_or_else(|| NotificationError::InvalidResponse(format!("{method}: missing result")))
    }

    /// `sendMessage` with an optional reply markup object
    pub async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        reply_markup: Option<Value>,
    ) -> Result<Message, NotificationError> {
        let mut body = json!({ "chat_id": chat_id, "text": text });
        if let Some(markup) = reply_markup {
            body["reply_markup"] = markup;
        }
        self.call("sendMessage", &body, REQUEST_TIMEOUT).await
    }

    /// Long-poll `getUpdates`, returning after at most `timeout_seconds` when
    /// nothing arrives.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_seconds: u64,
    ) -> Result<Vec<Update>, NotificationError> {
        let mut body = json!({
            "timeout": timeout_seconds,
            "allowed_updates": ["message"],
        });
        if let Some(offset) = offset {
            body["offset"] = json!(offset);
        }
        let timeout = Duration::from_secs(timeout_seconds) + LONG_POLL_GRACE;
        self.call("getUpdates", &body, timeout).await
    }
}

/// Delivers notifications as Telegram chat messages. The address is the chat
/// id, which for private chats equals the user's external id.
#[derive(Debug, Clone)]
pub struct TelegramSink {
    client: TelegramClient,
}

impl TelegramSink {
    pub fn new(client: TelegramClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NotificationSink for TelegramSink {
    async fn send(&self, address: &str, text: &str) -> Result<(), NotificationError> {
        self.client.send_message(address, text, None).await.map(|_| ())
    }
}
