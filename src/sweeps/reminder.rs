use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{Sweep, SweepSummary};
use crate::clock::SharedClock;
use crate::error::Result;
use crate::models::{timestamp, Task};
use crate::notifications::SharedSink;

/// Shown in place of a missing due date
const NO_DUE_DATE: &str = "none";

/// Counts for one reminder run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReminderOutcome {
    pub selected: usize,
    pub sent: usize,
    pub failed: usize,
    /// The run did nothing because a previous run was still in progress
    pub skipped: bool,
}

impl ReminderOutcome {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}

enum Dispatch {
    Sent,
    Failed,
}

/// Reminder message for a task
pub fn reminder_text(task: &Task) -> String {
    let due = task
        .due_at
        .as_ref()
        .map(timestamp::format)
        .unwrap_or_else(|| NO_DUE_DATE.to_string());
    format!(
        "🔔 Reminder: {}\n{}\nDue: {}",
        task.title, task.description, due
    )
}

/// Sends every due, unsent reminder of an incomplete task.
///
/// Delivery is at-least-once: a task is flagged only after the sink accepted
/// the message, and a failed send leaves it to be picked up again next run.
#[derive(Debug)]
pub struct ReminderSweep {
    pool: SqlitePool,
    clock: SharedClock,
    sink: SharedSink,
    max_concurrent: usize,
    in_progress: AtomicBool,
}

/// Clears the in-progress flag when a run ends, however it ends.
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ReminderSweep {
    pub fn new(
        pool: SqlitePool,
        clock: SharedClock,
        sink: SharedSink,
        max_concurrent: usize,
    ) -> Self {
        Self {
            pool,
            clock,
            sink,
            max_concurrent: max_concurrent.max(1),
            in_progress: AtomicBool::new(false),
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.in_progress.load(Ordering::SeqCst)
    }

    /// Run one pass. Returns a skipped outcome if another pass is running.
    pub async fn run_once(&self) -> Result<ReminderOutcome> {
        if self
            .in_progress
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::warn!("Reminder pass still running, skipping this tick");
            return Ok(ReminderOutcome::skipped());
        }
        let _guard = RunGuard(&self.in_progress);

        let now = self.clock.now();
        let due = Task::due_for_reminder(&self.pool, now).await?;
        let selected = due.len();

        let results: Vec<Dispatch> = stream::iter(due)
            .map(|task| self.dispatch(task))
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        let sent = results.iter().filter(|r| matches!(r, Dispatch::Sent)).count();
        Ok(ReminderOutcome {
            selected,
            sent,
            failed: selected - sent,
            skipped: false,
        })
    }

    async fn dispatch(&self, task: Task) -> Dispatch {
        let text = reminder_text(&task);

        if let Err(e) = self.sink.send(&task.owner_external_id, &text).await {
            tracing::warn!(
                task_id = task.id,
                owner = %task.owner_external_id,
                error = %e,
                "Reminder delivery failed, will retry next pass"
            );
            return Dispatch::Failed;
        }

        match Task::mark_reminder_sent(&self.pool, task.id).await {
            Ok(_) => {
                tracing::debug!(task_id = task.id, "Reminder sent");
                Dispatch::Sent
            }
            Err(e) => {
                tracing::error!(
                    task_id = task.id,
                    error = %e,
                    "Reminder delivered but not flagged, it may be sent again"
                );
                Dispatch::Failed
            }
        }
    }
}

#[async_trait]
impl Sweep for ReminderSweep {
    fn name(&self) -> &'static str {
        "reminders"
    }

    async fn run(&self) -> Result<SweepSummary> {
        self.run_once().await.map(SweepSummary::Reminder)
    }
}
