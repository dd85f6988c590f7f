use async_trait::async_trait;
use chrono::Duration;
use sqlx::SqlitePool;

use super::{Sweep, SweepSummary};
use crate::clock::SharedClock;
use crate::error::Result;
use crate::models::Task;

/// Deletes completed tasks created more than `retention` ago.
#[derive(Debug, Clone)]
pub struct ArchivalSweep {
    pool: SqlitePool,
    clock: SharedClock,
    retention: Duration,
}

impl ArchivalSweep {
    pub fn new(pool: SqlitePool, clock: SharedClock, retention_days: i64) -> Self {
        Self {
            pool,
            clock,
            retention: Duration::days(retention_days),
        }
    }

    /// Run one pass and return the number of deleted tasks.
    pub async fn run_once(&self) -> Result<u64> {
        let cutoff = self.clock.now() - self.retention;
        let deleted = Task::delete_completed_created_before(&self.pool, cutoff).await?;
        tracing::debug!(cutoff = %cutoff, deleted = deleted, "Archival pass finished");
        Ok(deleted)
    }
}

#[async_trait]
impl Sweep for ArchivalSweep {
    fn name(&self) -> &'static str {
        "archival"
    }

    async fn run(&self) -> Result<SweepSummary> {
        let deleted = self.run_once().await?;
        Ok(SweepSummary::Archival { deleted })
    }
}
