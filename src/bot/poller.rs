use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::commands::CommandResponder;
use crate::config::TelegramConfig;
use crate::logging::log_error;
use crate::notifications::telegram::{TelegramClient, Update};

#[derive(Debug, Clone)]
pub struct BotPollerConfig {
    pub poll_timeout_seconds: u64,
    /// Pause after a failed `getUpdates` call
    pub retry_delay: Duration,
    pub webapp_url: String,
}

impl From<&TelegramConfig> for BotPollerConfig {
    fn from(config: &TelegramConfig) -> Self {
        Self {
            poll_timeout_seconds: config.poll_timeout_seconds,
            retry_delay: Duration::from_secs(config.retry_delay_seconds),
            webapp_url: config.webapp_url.clone(),
        }
    }
}

/// Background long-polling loop for bot commands
pub struct BotCommandPoller {
    poller_id: Uuid,
    client: TelegramClient,
    config: BotPollerConfig,
    handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for BotCommandPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotCommandPoller")
            .field("poller_id", &self.poller_id)
            .field("config", &self.config)
            .field("running", &self.handle.is_some())
            .finish()
    }
}

impl BotCommandPoller {
    pub fn new(client: TelegramClient, config: BotPollerConfig) -> Self {
        Self {
            poller_id: Uuid::new_v4(),
            client,
            config,
            handle: None,
        }
    }

    pub fn start(&mut self) {
        if self.handle.is_some() {
            warn!(poller_id = %self.poller_id, "Bot command poller already running");
            return;
        }

        info!(
            poller_id = %self.poller_id,
            poll_timeout_seconds = self.config.poll_timeout_seconds,
            "Starting bot command poller"
        );

        let responder = Arc::new(CommandResponder::new(
            self.client.clone(),
            self.config.webapp_url.clone(),
        ));
        self.handle = Some(tokio::spawn(poll_loop(
            self.client.clone(),
            responder,
            self.config.clone(),
            self.poller_id,
        )));
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            info!(poller_id = %self.poller_id, "Stopping bot command poller");
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for BotCommandPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_loop(
    client: TelegramClient,
    responder: Arc<CommandResponder>,
    config: BotPollerConfig,
    poller_id: Uuid,
) {
    let mut offset: Option<i64> = None;

    loop {
        let updates = match client.get_updates(offset, config.poll_timeout_seconds).await {
            Ok(updates) => updates,
            Err(e) => {
                log_error("bot_poller", "get_updates", &e.to_string(), None);
                tokio::time::sleep(config.retry_delay).await;
                continue;
            }
        };

        if !updates.is_empty() {
            debug!(poller_id = %poller_id, count = updates.len(), "Received bot updates");
        }
        offset = next_offset(offset, &updates);

        for update in &updates {
            handle_update(&responder, update).await;
        }
    }
}

async fn handle_update(responder: &CommandResponder, update: &Update) {
    let Some(message) = &update.message else {
        return;
    };
    if let Err(e) = responder.respond(message).await {
        log_error(
            "bot_poller",
            "respond",
            &e.to_string(),
            Some(&format!("update_id={}", update.update_id)),
        );
    }
}

/// Offset that acknowledges every update received so far
fn next_offset(current: Option<i64>, updates: &[Update]) -> Option<i64> {
    updates
        .iter()
        .map(|u| u.update_id + 1)
        .max()
        .max(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn update(id: i64) -> Update {
        Update {
            update_id: id,
            message: None,
        }
    }

    #[test]
    fn test_next_offset_acknowledges_highest_update() {
        assert_eq!(next_offset(None, &[]), None);
        assert_eq!(next_offset(Some(5), &[]), Some(5));
        assert_eq!(next_offset(None, &[update(7), update(9), update(8)]), Some(10));
    }

    #[tokio::test]
    async fn test_poller_answers_start_command() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botT/getUpdates"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": [{
                    "update_id": 1,
                    "message": {
                        "message_id": 1,
                        "chat": { "id": 42 },
                        "from": { "id": 42, "first_name": "Ann" },
                        "text": "/start"
                    }
                }]
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/botT/getUpdates"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": [] })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/botT/sendMessage"))
            .and(body_partial_json(json!({ "chat_id": "42" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": { "message_id": 2, "chat": { "id": 42 } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = TelegramClient::new(&server.uri(), "T").unwrap();
        let mut poller = BotCommandPoller::new(
            client,
            BotPollerConfig {
                poll_timeout_seconds: 0,
                retry_delay: Duration::from_millis(10),
                webapp_url: "https://app".to_string(),
            },
        );
        poller.start();
        assert!(poller.is_running());

        tokio::time::sleep(Duration::from_millis(200)).await;
        poller.stop();
        assert!(!poller.is_running());
    }
}
