use crate::config::SweepConfig;
use crate::food::models::PurgeRule;
use crate::food::FoodStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

/// Outcome of one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Listings removed because their expiry passed
    pub expired: u64,
    /// Picked-up listings removed after the retention window
    pub picked_up: u64,
    /// Deletion batches that failed
    pub failed_batches: usize,
}

impl SweepReport {
    pub fn removed(&self) -> u64 {
        self.expired + self.picked_up
    }
}

/// Periodically purges expired listings and picked-up listings past retention
///
/// Works directly against the store and never reports errors to a caller.
pub struct CleanupSweeper<S: FoodStore> {
    store: Arc<S>,
    interval: Duration,
    retention: chrono::Duration,
}

impl<S: FoodStore> CleanupSweeper<S> {
    pub fn new(store: Arc<S>, config: &SweepConfig) -> Self {
        Self {
            store,
            interval: config.interval(),
            retention: config.retention(),
        }
    }

    /// Run one sweep against the current time
    pub async fn sweep(&self) -> SweepReport {
        self.sweep_at(Utc::now()).await
    }

    /// Run one sweep as if the current time were `now`
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> SweepReport {
        let mut report = SweepReport::default();

        match self.purge(PurgeRule::ExpiredBefore(now)).await {
            Some(count) => report.expired = count,
            None => report.failed_batches += 1,
        }
        match now.checked_sub_signed(self.retention) {
            Some(cutoff) => match self.purge(PurgeRule::PickedUpBefore(cutoff)).await {
                Some(count) => report.picked_up = count,
                None => report.failed_batches += 1,
            },
            None => debug!("Retention window starts before the earliest representable time"),
        }

        if report.removed() > 0 {
            info!(
                "Cleaned up {} old food items ({} expired, {} picked up)",
                report.removed(),
                report.expired,
                report.picked_up
            );
        } else {
            debug!("Sweep found nothing to remove");
        }
        report
    }

    async fn purge(&self, rule: PurgeRule) -> Option<u64> {
        match self.store.delete_where(rule).await {
            Ok(count) => Some(count),
            Err(e) => {
                error!("Error cleaning {} food items: {}", rule.name(), e);
                None
            }
        }
    }

    /// Sweep on every tick until `shutdown` resolves
    ///
    /// The first sweep runs immediately. A slow sweep delays the next tick rather
    /// than causing a burst of catch-up sweeps.
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!(
            "Starting cleanup sweeper: interval={:?}, retention={}s",
            self.interval,
            self.retention.num_seconds()
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Cleanup sweeper stopping");
                    break;
                }
                _ = ticker.tick() => {
                    self.sweep().await;
                }
            }
        }
    }
}
