use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use time::{format_description::well_known::Rfc3339, Date, OffsetDateTime};

use super::Site;

const EXTREMES_URL: &str = "https://api.stormglass.io/v2/tide/extremes/point";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(thiserror::Error, Debug)]
pub enum TideError {
    #[error("tide provider returned status {status}")]
    Status { status: u16 },
    #[error("tide provider request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("no tide API key configured")]
    MissingKey,
}

/// One tide extreme as returned upstream, instant in UTC
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TideExtreme {
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub height: Option<f64>,
}

#[derive(Deserialize)]
struct ExtremesResponse {
    #[serde(default)]
    data: Vec<RawExtreme>,
}

#[derive(Deserialize)]
struct RawExtreme {
    time: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    height: Option<f64>,
}

/// Point-based tide extremes over a date range. Stateless passthrough: no
/// persistence, no retry, no caching.
#[async_trait]
pub trait TideData: Send + Sync {
    async fn extremes(
        &self,
        site: &Site,
        start: Date,
        end: Date,
    ) -> Result<Vec<TideExtreme>, TideError>;
}

pub struct StormglassClient {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl StormglassClient {
    /// The key comes from config or env; a client without one is still
    /// constructable so the rest of the service can run, and every tide call
    /// fails with `MissingKey`.
    pub fn new(api_key: Option<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, api_key })
    }
}

#[async_trait]
impl TideData for StormglassClient {
    async fn extremes(
        &self,
        site: &Site,
        start: Date,
        end: Date,
    ) -> Result<Vec<TideExtreme>, TideError> {
        let api_key = self.api_key.as_ref().ok_or(TideError::MissingKey)?;

        let response = self
            .client
            .get(EXTREMES_URL)
            .header("Authorization", api_key)
            .query(&[
                ("lat", site.latitude.to_string()),
                ("lng", site.longitude.to_string()),
                ("start", start.to_string()),
                ("end", end.to_string()),
                ("height", "true".to_string()),
                ("type", "true".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TideError::Status {
                status: status.as_u16(),
            });
        }

        let parsed: ExtremesResponse = response.json().await?;
        Ok(collect_extremes(parsed.data))
    }
}

/// Entries without a parseable instant are dropped, the rest pass through
/// verbatim.
fn collect_extremes(raw: Vec<RawExtreme>) -> Vec<TideExtreme> {
    raw.into_iter()
        .filter_map(|raw| {
            let raw_time = raw.time?;
            let time = OffsetDateTime::parse(&raw_time.replace('Z', "+00:00"), &Rfc3339).ok()?;
            Some(TideExtreme {
                time,
                kind: raw.kind,
                height: raw.height,
            })
        })
        .collect()
}
