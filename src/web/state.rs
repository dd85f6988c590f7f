//! # Web API Application State

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::clock::SharedClock;
use crate::config::WebConfig;
use crate::identity::SharedVerifier;

/// Shared state handed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub clock: SharedClock,
    pub verifier: SharedVerifier,
    pub config: Arc<WebConfig>,
}

impl AppState {
    pub fn new(
        pool: SqlitePool,
        clock: SharedClock,
        verifier: SharedVerifier,
        config: WebConfig,
    ) -> Self {
        Self {
            pool,
            clock,
            verifier,
            config: Arc::new(config),
        }
    }
}
