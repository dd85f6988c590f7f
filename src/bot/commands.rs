use serde_json::{json, Value};

use crate::notifications::telegram::{Message, TelegramClient};
use crate::notifications::NotificationError;

pub const OPEN_BUTTON_TEXT: &str = "Open ToDo+";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Todo,
}

impl BotCommand {
    /// Recognizes `/start` and `/todo` at the beginning of a message,
    /// including the `/todo@BotName` form and trailing arguments.
    pub fn parse(text: &str) -> Option<Self> {
        let first = text.split_whitespace().next()?;
        let command = first.split('@').next().unwrap_or(first);
        match command {
            "/start" => Some(BotCommand::Start),
            "/todo" => Some(BotCommand::Todo),
            _ => None,
        }
    }
}

pub fn greeting(first_name: &str) -> String {
    format!("Hi, {first_name}! This is ToDo+, open the mini app with the button below.")
}

pub fn web_app_keyboard(webapp_url: &str) -> Value {
    json!({
        "keyboard": [[{ "text": OPEN_BUTTON_TEXT, "web_app": { "url": webapp_url } }]],
        "resize_keyboard": true
    })
}

pub fn fallback_link(webapp_url: &str) -> String {
    format!("{OPEN_BUTTON_TEXT}: {webapp_url}")
}

/// Answers recognized commands through the Bot API
#[derive(Debug, Clone)]
pub struct CommandResponder {
    client: TelegramClient,
    webapp_url: String,
}

impl CommandResponder {
    pub fn new(client: TelegramClient, webapp_url: impl Into<String>) -> Self {
        Self {
            client,
            webapp_url: webapp_url.into(),
        }
    }

    /// Reply to `message` if it carries a command. Returns the command that
    /// was handled, if any.
    pub async fn respond(
        &self,
        message: &Message,
    ) -> Result<Option<BotCommand>, NotificationError> {
        let Some(command) = message.text.as_deref().and_then(BotCommand::parse) else {
            return Ok(None);
        };
        let chat_id = message.chat.id.to_string();

        match command {
            BotCommand::Start => {
                let first_name = message
                    .from
                    .as_ref()
                    .map(|user| user.first_name.as_str())
                    .unwrap_or_default();
                self.client
                    .send_message(&chat_id, &greeting(first_name), None)
                    .await?;
            }
            BotCommand::Todo => {
                let keyboard = web_app_keyboard(&self.webapp_url);
                if let Err(e) = self
                    .client
                    .send_message(&chat_id, "Opening ToDo+", Some(keyboard))
                    .await
                {
                    tracing::warn!(
                        chat_id = %chat_id,
                        error = %e,
                        "Keyboard reply failed, sending plain link"
                    );
                    self.client
                        .send_message(&chat_id, &fallback_link(&self.webapp_url), None)
                        .await?;
                }
            }
        }

        tracing::debug!(chat_id = %chat_id, command = ?command, "Bot command answered");
        Ok(Some(command))
    }
}
