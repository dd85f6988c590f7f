//! # Notifications
//!
//! Outbound delivery of reminder texts. The reminder sweep only knows the
//! [`NotificationSink`] contract; [`TelegramSink`] delivers through the Bot
//! API and [`RecordingSink`] keeps messages in memory for tests.

pub mod memory;
pub mod telegram;

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use thiserror::Error;

use crate::error::TodoError;

pub use memory::{RecordingSink, SentNotification};
pub use telegram::{TelegramClient, TelegramSink};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NotificationError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("rejected by provider ({status}): {description}")]
    Rejected { status: u16, description: String },
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
    #[error("sink unavailable: {0}")]
    Unavailable(String),
}

// The request URL carries the bot token and must not reach the message.
impl From<reqwest::Error> for NotificationError {
    fn from(err: reqwest::Error) -> Self {
        NotificationError::Transport(err.without_url().to_string())
    }
}

impl From<NotificationError> for TodoError {
    fn from(err: NotificationError) -> Self {
        TodoError::NotificationError(err.to_string())
    }
}

/// Destination for user-facing notifications
#[async_trait]
pub trait NotificationSink: Send + Sync + Debug {
    /// Deliver `text` to `address` (the owner's external id). Success means
    /// the provider accepted the message.
    async fn send(&self, address: &str, text: &str) -> Result<(), NotificationError>;
}

pub type SharedSink = Arc<dyn NotificationSink>;
