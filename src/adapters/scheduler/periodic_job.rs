//! PeriodicJob - background runner for lifecycle jobs.
//!
//! Runs a [`ScheduledJob`] on a [`Schedule`] until the shutdown signal
//! flips to `true`. A run in progress is allowed to finish; the signal is
//! only observed between runs.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::application::handlers::evaluation::{PublicityWindowWatcher, StatusLifecycleEngine};
use crate::domain::foundation::Timestamp;

use super::Schedule;

/// A unit of background work.
///
/// Implementations log their own outcome; nothing is returned to the runner.
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    async fn run(&self);
}

#[async_trait]
impl ScheduledJob for StatusLifecycleEngine {
    fn name(&self) -> &'static str {
        "review-transition"
    }

    async fn run(&self) {
        self.run_scheduled_transition().await;
    }
}

#[async_trait]
impl ScheduledJob for PublicityWindowWatcher {
    fn name(&self) -> &'static str {
        "publicity-watch"
    }

    async fn run(&self) {
        self.run_scheduled_check().await;
    }
}

/// Background service that fires a job on its schedule.
pub struct PeriodicJob {
    job: Arc<dyn ScheduledJob>,
    schedule: Schedule,
}

impl PeriodicJob {
    pub fn new(job: Arc<dyn ScheduledJob>, schedule: Schedule) -> Self {
        Self { job, schedule }
    }

    /// Run the job loop until shutdown signal is received.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(job = self.job.name(), schedule = %self.schedule, "Background job started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            let delay = self.schedule.delay_from(*Timestamp::now().as_naive());

            tokio::select! {
                changed = shutdown.changed() => {
                    // A dropped sender also means shutdown
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }

                _ = tokio::time::sleep(delay) => {
                    tracing::debug!(job = self.job.name(), "Background job firing");
                    self.job.run().await;
                }
            }
        }

        tracing::info!(job = self.job.name(), "Background job stopped");
    }

    /// Spawns the loop onto the runtime.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}
