use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{NotificationError, NotificationSink};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub address: String,
    pub text: String,
}

/// In-memory sink that records every delivery attempt.
///
/// Attempts are recorded whether or not they succeed. Failure can be switched
/// on for every address or for selected ones.
#[derive(Debug, Default)]
pub struct RecordingSink {
    attempts: Mutex<Vec<SentNotification>>,
    fail_all: AtomicBool,
    failing_addresses: Mutex<HashSet<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_all.store(failing, Ordering::SeqCst);
    }

    pub fn fail_for(&self, address: impl Into<String>) {
        self.failing_addresses.lock().insert(address.into());
    }

    /// Every attempt so far, in order
    pub fn calls(&self) -> Vec<SentNotification> {
        self.attempts.lock().clone()
    }

    pub fn calls_to(&self, address: &str) -> Vec<SentNotification> {
        self.attempts
            .lock()
            .iter()
            .filter(|n| n.address == address)
            .cloned()
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.attempts.lock().len()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn send(&self, address: &str, text: &str) -> Result<(), NotificationError> {
        self.attempts.lock().push(SentNotification {
            address: address.to_string(),
            text: text.to_string(),
        });

        if self.fail_all.load(Ordering::SeqCst) || self.failing_addresses.lock().contains(address)
        {
            return Err(NotificationError::Unavailable(format!(
                "recording sink set to fail for {address}"
            )));
        }
        Ok(())
    }
}
