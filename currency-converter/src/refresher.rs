use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, instrument, warn};

use crate::CurrencyService;

/// Background task that refreshes the rate cache on a fixed interval.
///
/// The first refresh happens one interval after the task starts; callers
/// warm the cache themselves beforehand.
pub struct RateRefresher {
    service: Arc<CurrencyService>,
    interval: Duration,
}

impl RateRefresher {
    pub fn new(service: Arc<CurrencyService>, interval: Duration) -> Self {
        Self { service, interval }
    }

    #[instrument(skip(self), fields(interval = ?self.interval))]
    pub async fn run(self) {
        info!("Starting currency rate refresher");
        let start = tokio::time::Instant::now() + self.interval;
        let mut ticker = tokio::time::interval_at(start, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = self.service.refresh_rates().await {
                warn!("Scheduled rate refresh failed: {}", e);
            }
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
