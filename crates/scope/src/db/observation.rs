use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;

/// One stored environmental observation.
///
/// The natural key is (ts, source, location); the surrogate rowid carries no
/// meaning beyond dedup ordering. All measurement fields are optional since
/// providers omit slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ObservationRecord {
    /// UTC instant, hourly granularity
    #[serde(with = "time::serde::rfc3339")]
    pub ts: OffsetDateTime,
    /// Wave height (m)
    pub hs: Option<f64>,
    /// Wave period (s)
    pub tp: Option<f64>,
    /// Wave direction (deg)
    pub dp: Option<f64>,
    /// Sea surface temperature (°C)
    pub sst: Option<f64>,
    /// 2m air temperature (°C)
    pub air_temp: Option<f64>,
    /// 10m wind speed (m/s)
    pub wind_speed: Option<f64>,
    /// 10m wind direction (deg)
    pub wind_dir: Option<f64>,
    pub source: String,
    pub location: String,
}

impl ObservationRecord {
    /// A record with every measurement empty, ready for the merge passes.
    pub fn empty(ts: OffsetDateTime, source: &str, location: &str) -> Self {
        Self {
            ts,
            hs: None,
            tp: None,
            dp: None,
            sst: None,
            air_temp: None,
            wind_speed: None,
            wind_dir: None,
            source: source.to_string(),
            location: location.to_string(),
        }
    }
}

/// Per-field means over one UTC day, nulls excluded, rounded to 2 decimals
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DailySummary {
    pub date: String,
    pub hs_avg: Option<f64>,
    pub tp_avg: Option<f64>,
    pub dp_avg: Option<f64>,
    pub sst_avg: Option<f64>,
    pub air_temp_avg: Option<f64>,
    pub wind_speed_avg: Option<f64>,
    pub wind_dir_avg: Option<f64>,
}

/// Quick store diagnostic: total rows and the most recent record
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StoreStats {
    pub count: i64,
    pub last: Option<ObservationRecord>,
}

/// Unix milliseconds for storage; hourly data always lands on whole seconds
/// but the finer unit keeps range bounds exact.
pub fn to_unix_millis(ts: OffsetDateTime) -> i64 {
    (ts.unix_timestamp_nanos() / 1_000_000) as i64
}

pub fn from_unix_millis(ms: i64) -> Result<OffsetDateTime, time::error::ComponentRange> {
    OffsetDateTime::from_unix_timestamp_nanos(ms as i128 * 1_000_000)
}
