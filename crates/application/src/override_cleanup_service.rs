use std::sync::Arc;
use std::time::Duration;

use agrinova_core::AppResult;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::rbac_ports::UserOverrideRepository;

/// Background sweep deleting expired user overrides.
///
/// Decisions already ignore expired rows, so the sweep only reclaims storage
/// and may run alongside live checks.
#[derive(Clone)]
pub struct OverrideCleanupService {
    overrides: Arc<dyn UserOverrideRepository>,
    clock: Arc<dyn Clock>,
}

impl OverrideCleanupService {
    /// Creates the sweep service.
    #[must_use]
    pub fn new(overrides: Arc<dyn UserOverrideRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { overrides, clock }
    }

    /// Deletes every override whose expiry lies in the past.
    pub async fn run_once(&self) -> AppResult<u64> {
        let removed = self
            .overrides
            .cleanup_expired_overrides(self.clock.now())
            .await?;
        if removed > 0 {
            info!(removed, "expired user overrides purged");
        }

        Ok(removed)
    }

    /// Runs the sweep on every tick until `shutdown` turns `true` or its
    /// sender is dropped. Returns the total number of purged rows.
    pub async fn run_periodic(&self, interval: Duration, mut shutdown: watch::Receiver<bool>) -> u64 {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut total = 0_u64;

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {
                    match self.run_once().await {
                        Ok(removed) => total = total.saturating_add(removed),
                        Err(error) => warn!(error = %error, "expired override sweep failed"),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!(total, "override cleanup stopped");
        total
    }
}
