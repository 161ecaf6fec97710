use log::{error, info, warn};
use std::sync::Arc;
use time::{OffsetDateTime, Time, UtcOffset};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::collector::Collector;

/// Triggers the collector once at startup and then daily at a fixed
/// site-local hour.
///
/// Single-flight: a tick that finds the previous cycle still in flight is
/// skipped, never run concurrently. Cycle failures are logged and the loop
/// keeps going; cancellation lets an in-flight cycle finish.
pub struct Scheduler {
    collector: Arc<Collector>,
    collect_hour: u8,
    site_offset: UtcOffset,
    in_flight: Arc<Mutex<()>>,
}

impl Scheduler {
    pub fn new(collector: Arc<Collector>, collect_hour: u8, site_offset: UtcOffset) -> Self {
        Self {
            collector,
            collect_hour,
            site_offset,
            in_flight: Arc::new(Mutex::new(())),
        }
    }

    pub async fn run(self, cancel: CancellationToken) {
        info!(
            "scheduler started, daily collection at {:02}:00 (UTC{})",
            self.collect_hour, self.site_offset
        );

        // First cycle runs immediately at service start
        self.trigger().await;

        loop {
            let now_local = OffsetDateTime::now_utc().to_offset(self.site_offset);
            let next = next_run_after(now_local, self.collect_hour);
            let wait = (next - now_local).unsigned_abs();
            info!("next collection cycle at {}", next);

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("scheduler stopping");
                    return;
                }
                _ = tokio::time::sleep(wait) => {
                    self.trigger().await;
                }
            }
        }
    }

    /// Run one cycle unless one is already in flight.
    pub async fn trigger(&self) {
        let Ok(_guard) = self.in_flight.try_lock() else {
            warn!("previous collection cycle still running, skipping this tick");
            return;
        };

        match self.collector.run_cycle().await {
            Ok(outcome) => info!(
                "scheduled cycle done: {} inserted, {} deduplicated",
                outcome.inserted, outcome.deduped
            ),
            Err(e) => error!("collection cycle failed: {}", e),
        }
    }

    #[cfg(test)]
    fn hold(&self) -> Arc<Mutex<()>> {
        self.in_flight.clone()
    }
}

/// First instant strictly after `now_local` that lands on `hour`:00:00.
fn next_run_after(now_local: OffsetDateTime, hour: u8) -> OffsetDateTime {
    let at_hour = now_local.replace_time(Time::from_hms(hour, 0, 0).unwrap_or(Time::MIDNIGHT));
    if at_hour > now_local {
        at_hour
    } else {
        at_hour + time::Duration::days(1)
    }
}
