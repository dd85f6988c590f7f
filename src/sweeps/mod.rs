//! # Background Sweeps
//!
//! Periodic scan-and-act jobs over the task store:
//!
//! - [`ArchivalSweep`] deletes completed tasks past the retention window
//! - [`ReminderSweep`] sends due reminders through a notification sink
//!
//! Both implement [`Sweep`] and are driven by the [`SweepScheduler`], which
//! runs each on its own interval and keeps going when a run fails. Each sweep
//! can also be run once directly, which is how the tests drive them with a
//! manual clock.

pub mod archival;
pub mod reminder;
pub mod scheduler;

use async_trait::async_trait;
use std::fmt;

use crate::error::Result;

pub use archival::ArchivalSweep;
pub use reminder::{reminder_text, ReminderOutcome, ReminderSweep};
pub use scheduler::{ScheduledSweep, SweepScheduler};

/// Result of one sweep run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepSummary {
    Archival { deleted: u64 },
    Reminder(ReminderOutcome),
}

impl SweepSummary {
    /// True when the run changed something or was skipped
    pub fn is_noteworthy(&self) -> bool {
        match self {
            SweepSummary::Archival { deleted } => *deleted > 0,
            SweepSummary::Reminder(outcome) => outcome.selected > 0 || outcome.skipped,
        }
    }
}

impl fmt::Display for SweepSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepSummary::Archival { deleted } => write!(f, "deleted={deleted}"),
            SweepSummary::Reminder(outcome) => write!(
                f,
                "selected={} sent={} failed={} skipped={}",
                outcome.selected, outcome.sent, outcome.failed, outcome.skipped
            ),
        }
    }
}

#[async_trait]
pub trait Sweep: Send + Sync + fmt::Debug {
    /// Stable name used in logs
    fn name(&self) -> &'static str;

    async fn run(&self) -> Result<SweepSummary>;
}
