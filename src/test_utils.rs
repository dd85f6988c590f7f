//! # Test Utilities
//!
//! Shared fixtures for unit and integration tests: a migrated in-memory
//! database, timestamp literals and a controllable clock.

use chrono::NaiveDateTime;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::clock::ManualClock;
use crate::database::DatabaseConnection;
use crate::models::timestamp;

/// Fresh, migrated, private in-memory database.
///
/// # Panics
/// Panics if the database cannot be opened or migrated.
pub async fn test_pool() -> SqlitePool {
    let connection = DatabaseConnection::in_memory()
        .await
        .expect("open in-memory database");
    connection.migrate().await.expect("apply migrations");
    connection.pool().clone()
}

/// Parse a `YYYY-MM-DD HH:MM:SS` literal.
///
/// # Panics
/// Panics on a malformed literal.
pub fn at(raw: &str) -> NaiveDateTime {
    timestamp::parse_stored(raw).unwrap_or_else(|e| panic!("bad test timestamp '{raw}': {e}"))
}

/// Manual clock starting at the given literal.
pub fn manual_clock(start: &str) -> Arc<ManualClock> {
    Arc::new(ManualClock::new(at(start)))
}
