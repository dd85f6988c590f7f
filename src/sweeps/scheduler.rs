//! Runs each sweep on its own fixed interval as a background tokio task.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::Sweep;
use crate::logging::{log_error, log_sweep_operation};

/// A sweep together with its schedule
#[derive(Debug, Clone)]
pub struct ScheduledSweep {
    pub sweep: Arc<dyn Sweep>,
    pub interval: Duration,
    pub enabled: bool,
}

impl ScheduledSweep {
    pub fn new(sweep: Arc<dyn Sweep>, interval: Duration, enabled: bool) -> Self {
        Self {
            sweep,
            interval,
            enabled,
        }
    }
}

pub struct SweepScheduler {
    scheduler_id: Uuid,
    sweeps: Vec<ScheduledSweep>,
    handles: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for SweepScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SweepScheduler")
            .field("scheduler_id", &self.scheduler_id)
            .field("sweeps", &self.sweeps)
            .field("running_loops", &self.handles.len())
            .finish()
    }
}

impl SweepScheduler {
    pub fn new(sweeps: Vec<ScheduledSweep>) -> Self {
        Self {
            scheduler_id: Uuid::new_v4(),
            sweeps,
            handles: Vec::new(),
        }
    }

    /// Spawn one loop per enabled sweep. Calling it again while running does
    /// nothing.
    pub fn start(&mut self) {
        if self.is_running() {
            warn!(scheduler_id = %self.scheduler_id, "Sweep scheduler already running");
            return;
        }

        for scheduled in &self.sweeps {
            let name = scheduled.sweep.name();
            if !scheduled.enabled {
                info!(scheduler_id = %self.scheduler_id, sweep = name, "Sweep disabled");
                continue;
            }

            info!(
                scheduler_id = %self.scheduler_id,
                sweep = name,
                interval_seconds = scheduled.interval.as_secs_f64(),
                "Starting sweep loop"
            );
            self.handles
                .push(tokio::spawn(run_loop(scheduled.clone(), self.scheduler_id)));
        }
    }

    /// Abort every loop. A run in flight is cancelled at its next await point.
    pub fn stop(&mut self) {
        if self.handles.is_empty() {
            return;
        }
        info!(scheduler_id = %self.scheduler_id, "Stopping sweep scheduler");
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        !self.handles.is_empty()
    }

    pub fn sweeps(&self) -> &[ScheduledSweep] {
        &self.sweeps
    }
}

impl Drop for SweepScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_loop(scheduled: ScheduledSweep, scheduler_id: Uuid) {
    let name = scheduled.sweep.name();
    let mut ticker = interval(scheduled.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        debug!(scheduler_id = %scheduler_id, sweep = name, "Running sweep");

        match scheduled.sweep.run().await {
            Ok(summary) if summary.is_noteworthy() => {
                log_sweep_operation(name, "completed", Some(&summary.to_string()));
            }
            Ok(summary) => {
                debug!(sweep = name, summary = %summary, "Sweep found nothing to do");
            }
            Err(e) => {
                log_error("sweep_scheduler", name, &e.to_string(), None);
            }
        }
    }
}
