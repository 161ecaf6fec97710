use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use time::{format_description::FormatItem, macros::format_description, PrimitiveDateTime};

use super::Site;

const MARINE_URL: &str = "https://marine-api.open-meteo.com/v1/marine";
const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Request window: 1 day back, 2 days forward, hourly cadence
const PAST_DAYS: &str = "1";
const FORECAST_DAYS: &str = "2";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("provider response missing the hourly series")]
    MissingSeries,
    #[error("unparseable timestamp in hourly series: {0}")]
    BadTimestamp(String),
    #[error("provider request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Hourly marine series as parallel arrays indexed by position.
///
/// Slots a provider omits arrive as null and stay `None`; that is data, not
/// a fetch failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarineHourly {
    pub time: Vec<String>,
    #[serde(default)]
    pub wave_height: Vec<Option<f64>>,
    #[serde(default)]
    pub wave_period: Vec<Option<f64>>,
    #[serde(default)]
    pub wave_direction: Vec<Option<f64>>,
    #[serde(default)]
    pub sea_surface_temperature: Vec<Option<f64>>,
}

/// Hourly atmospheric series, same cadence and window contract
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AtmosphericHourly {
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub wind_speed_10m: Vec<Option<f64>>,
    #[serde(default)]
    pub wind_direction_10m: Vec<Option<f64>>,
}

#[derive(Deserialize)]
struct MarineResponse {
    hourly: Option<MarineHourly>,
}

#[derive(Deserialize)]
struct ForecastResponse {
    hourly: Option<AtmosphericHourly>,
}

/// Fetches the two independently-shaped hourly series for one site.
/// Behind a trait so the collector can be tested against canned series.
#[async_trait]
pub trait ProviderData: Send + Sync {
    async fn marine_hourly(&self, site: &Site) -> Result<MarineHourly, ProviderError>;
    async fn atmospheric_hourly(&self, site: &Site) -> Result<AtmosphericHourly, ProviderError>;
}

pub struct OpenMeteoClient {
    client: reqwest::Client,
}

impl OpenMeteoClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl ProviderData for OpenMeteoClient {
    async fn marine_hourly(&self, site: &Site) -> Result<MarineHourly, ProviderError> {
        let response = self
            .client
            .get(MARINE_URL)
            .query(&[
                ("latitude", site.latitude.to_string()),
                ("longitude", site.longitude.to_string()),
                (
                    "hourly",
                    "wave_height,wave_period,wave_direction,sea_surface_temperature".to_string(),
                ),
                ("past_days", PAST_DAYS.to_string()),
                ("forecast_days", FORECAST_DAYS.to_string()),
                ("cell_selection", "sea".to_string()),
                ("timezone", "UTC".to_string()),
            ])
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let parsed: MarineResponse = response.json().await?;
        parsed.hourly.ok_or(ProviderError::MissingSeries)
    }

    async fn atmospheric_hourly(&self, site: &Site) -> Result<AtmosphericHourly, ProviderError> {
        let response = self
            .client
            .get(FORECAST_URL)
            .query(&[
                ("latitude", site.latitude.to_string()),
                ("longitude", site.longitude.to_string()),
                (
                    "hourly",
                    "temperature_2m,wind_speed_10m,wind_direction_10m".to_string(),
                ),
                ("past_days", PAST_DAYS.to_string()),
                ("forecast_days", FORECAST_DAYS.to_string()),
                ("timezone", "UTC".to_string()),
            ])
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let parsed: ForecastResponse = response.json().await?;
        parsed.hourly.ok_or(ProviderError::MissingSeries)
    }
}

// Open-Meteo hourly timestamps come back as "2025-08-24T13:00" (UTC, no
// offset, no seconds); seconds are accepted when present.
const HOURLY_FORMAT: &[FormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]");
const HOURLY_FORMAT_SECONDS: &[FormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

pub fn parse_hourly_timestamp(raw: &str) -> Result<time::OffsetDateTime, ProviderError> {
    PrimitiveDateTime::parse(raw, HOURLY_FORMAT)
        .or_else(|_| PrimitiveDateTime::parse(raw, HOURLY_FORMAT_SECONDS))
        .map(|dt| dt.assume_utc())
        .map_err(|_| ProviderError::BadTimestamp(raw.to_string()))
}
