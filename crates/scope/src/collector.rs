use log::{error, info};
use std::collections::BTreeMap;
use std::sync::Arc;
use time::OffsetDateTime;

use crate::db::{self, Database, ObservationRecord};
use crate::providers::{parse_hourly_timestamp, ProviderData, ProviderError, Site};

#[derive(thiserror::Error, Debug)]
pub enum CycleError {
    #[error("provider fetch failed: {0}")]
    Provider(#[from] ProviderError),
    #[error("store failed: {0}")]
    Store(#[from] db::Error),
}

/// Counters from one completed cycle, for the operational log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleOutcome {
    /// Distinct hourly timestamps seen across both series
    pub merged: usize,
    /// Rows actually written (existing natural keys are skipped)
    pub inserted: u64,
    /// Rows removed by the dedup sweep
    pub deduped: u64,
}

/// Runs one end-to-end ingestion cycle: fetch both hourly series, merge them
/// by timestamp, insert in one transaction, then sweep duplicates.
///
/// Safe to re-run over overlapping fetch windows (the store skips existing
/// natural keys) and safe to run alongside query reads. Non-overlap with
/// other cycles is the scheduler's job, not enforced here.
pub struct Collector {
    db: Arc<Database>,
    provider: Arc<dyn ProviderData>,
    site: Site,
    source: String,
    location: String,
}

impl Collector {
    pub fn new(
        db: Arc<Database>,
        provider: Arc<dyn ProviderData>,
        site: Site,
        source: &str,
        location: &str,
    ) -> Self {
        Self {
            db,
            provider,
            site,
            source: source.to_string(),
            location: location.to_string(),
        }
    }

    pub async fn run_cycle(&self) -> Result<CycleOutcome, CycleError> {
        info!("collecting marine and atmospheric data for {}", self.location);

        // Both fetches must succeed before anything is written; either
        // failure aborts the cycle with zero rows touched.
        let marine = self.provider.marine_hourly(&self.site).await?;
        let atmospheric = self.provider.atmospheric_hourly(&self.site).await?;

        let mut merged: BTreeMap<OffsetDateTime, ObservationRecord> = BTreeMap::new();

        for (i, raw_ts) in marine.time.iter().enumerate() {
            let ts = parse_hourly_timestamp(raw_ts)?;
            let record = merged
                .entry(ts)
                .or_insert_with(|| ObservationRecord::empty(ts, &self.source, &self.location));
            record.hs = slot(&marine.wave_height, i);
            record.tp = slot(&marine.wave_period, i);
            record.dp = slot(&marine.wave_direction, i);
            record.sst = slot(&marine.sea_surface_temperature, i);
        }

        // Keyed by timestamp rather than array position: an hour missing
        // from one series yields a partial record for that hour instead of
        // shifting every later pairing.
        for (i, raw_ts) in atmospheric.time.iter().enumerate() {
            let ts = parse_hourly_timestamp(raw_ts)?;
            let record = merged
                .entry(ts)
                .or_insert_with(|| ObservationRecord::empty(ts, &self.source, &self.location));
            record.air_temp = slot(&atmospheric.temperature_2m, i);
            record.wind_speed = slot(&atmospheric.wind_speed_10m, i);
            record.wind_dir = slot(&atmospheric.wind_direction_10m, i);
        }

        let merged_count = merged.len();
        let inserted = self
            .db
            .insert_observations(merged.into_values().collect())
            .await?;
        let deduped = self.db.dedup_sweep().await?;

        info!(
            "cycle complete: {} hourly slots, {} inserted, {} duplicates removed",
            merged_count, inserted, deduped
        );

        Ok(CycleOutcome {
            merged: merged_count,
            inserted,
            deduped,
        })
    }
}

fn slot(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}
