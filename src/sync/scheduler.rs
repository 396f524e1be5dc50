//! Fixed-interval driver for sync cycles.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use super::engine::{SyncCoordinator, SyncOutcome};

/// Counters for a scheduler run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerSummary {
    pub cycles: u64,
    pub merged: u64,
    pub conflicts: u64,
    pub failures: u64,
}

/// Stops a running [`SyncScheduler`] from elsewhere.
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    stop_tx: Arc<watch::Sender<bool>>,
}

impl SchedulerHandle {
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }
}

pub struct SyncScheduler {
    period: Duration,
    max_cycles: Option<u64>,
    stop_tx: Arc<watch::Sender<bool>>,
}

impl SyncScheduler {
    pub fn new(period: Duration) -> Self {
        let (stop_tx, _) = watch::channel(false);
        Self {
            period: period.max(Duration::from_millis(1)),
            max_cycles: None,
            stop_tx: Arc::new(stop_tx),
        }
    }

    /// Return after this many cycles instead of running until stopped.
    #[must_use]
    pub const fn with_max_cycles(mut self, max_cycles: Option<u64>) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            stop_tx: Arc::clone(&self.stop_tx),
        }
    }

    /// Run cycles until stopped through a [`SchedulerHandle`] or until
    /// `shutdown` completes. The first cycle starts immediately.
    ///
    /// A cycle that fails is logged and the loop carries on. Stopping drops
    /// any cycle in flight and shuts the coordinator down.
    pub async fn run(
        &self,
        coordinator: &SyncCoordinator,
        shutdown: impl Future<Output = ()>,
    ) -> SchedulerSummary {
        tokio::pin!(shutdown);
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut stop_rx = self.stop_tx.subscribe();
        let mut summary = SchedulerSummary::default();

        info!(interval_secs = self.period.as_secs_f64(), "sync scheduler started");

        loop {
            if *stop_rx.borrow_and_update() {
                break;
            }
            if self.max_cycles.is_some_and(|max| summary.cycles >= max) {
                break;
            }

            tokio::select! {
                biased;
                _ = stop_rx.changed() => break,
                () = &mut shutdown => break,
                _ = ticker.tick() => {}
            }

            tokio::select! {
                biased;
                _ = stop_rx.changed() => {
                    debug!("stop requested during sync cycle");
                    break;
                }
                () = &mut shutdown => {
                    debug!("shutdown during sync cycle");
                    break;
                }
                result = coordinator.run_sync_cycle() => {
                    summary.cycles += 1;
                    match result {
                        Ok(report) => match report.outcome {
                            SyncOutcome::Merged => summary.merged += 1,
                            SyncOutcome::Conflict | SyncOutcome::ConflictPending => {
                                summary.conflicts += 1;
                            }
                            SyncOutcome::Discarded => {}
                        },
                        Err(err) => {
                            summary.failures += 1;
                            warn!(error = %err, "scheduled sync failed; will retry next tick");
                        }
                    }
                }
            }
        }

        coordinator.shutdown();
        info!(
            cycles = summary.cycles,
            failures = summary.failures,
            "sync scheduler stopped"
        );
        summary
    }
}
