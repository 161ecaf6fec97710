use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use log::error;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::{
    format_description::well_known::{Iso8601, Rfc3339},
    Duration, OffsetDateTime, PrimitiveDateTime, Time,
};
use utoipa::{IntoParams, ToSchema};

use super::{api_error, ApiError};
use crate::{providers::TideError, AppState, SITE_UTC_OFFSET, SOURCE_STORMGLASS};

#[derive(Debug, Deserialize, IntoParams)]
pub struct TidesQuery {
    /// Window start, ISO 8601, site-local when no offset given.
    /// Defaults to today 00:00 site-local.
    pub start: Option<String>,
    /// Window end, ISO 8601, site-local when no offset given.
    /// Defaults to the end of the day after tomorrow, site-local.
    pub end: Option<String>,
}

/// One tide extreme, timestamp already converted to site-local time
#[derive(Debug, Serialize, ToSchema)]
pub struct TideItem {
    pub ts: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub height: Option<f64>,
    pub source: String,
    pub location: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TidesResponse {
    pub items: Vec<TideItem>,
}

/// ISO 8601 instant; a value without an offset is interpreted as site-local.
fn parse_local_bound(raw: &str) -> Result<OffsetDateTime, ApiError> {
    OffsetDateTime::parse(raw, &Iso8601::DEFAULT)
        .map(|dt| dt.to_offset(SITE_UTC_OFFSET))
        .or_else(|_| {
            PrimitiveDateTime::parse(raw, &Iso8601::DEFAULT)
                .map(|dt| dt.assume_offset(SITE_UTC_OFFSET))
        })
        .map_err(|_| {
            api_error(
                StatusCode::BAD_REQUEST,
                format!("invalid date parameter: {}", raw),
            )
        })
}

#[utoipa::path(
    get,
    path = "/tides/",
    params(TidesQuery),
    responses(
        (status = OK, description = "Tide extremes over the next 3 days, filtered to the window", body = TidesResponse),
        (status = BAD_REQUEST, description = "Malformed date parameter"),
        (status = BAD_GATEWAY, description = "Upstream tide provider failure")
    ))]
pub async fn get_tides(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TidesQuery>,
) -> Result<Json<TidesResponse>, ApiError> {
    let now_local = OffsetDateTime::now_utc().to_offset(SITE_UTC_OFFSET);
    let today = now_local.date();
    let day_after_tomorrow = today + Duration::days(2);

    let start_local = match query.start.as_deref() {
        Some(raw) => parse_local_bound(raw)?,
        None => today.with_time(Time::MIDNIGHT).assume_offset(SITE_UTC_OFFSET),
    };
    let end_local = match query.end.as_deref() {
        Some(raw) => parse_local_bound(raw)?,
        None => day_after_tomorrow
            .with_time(Time::MIDNIGHT)
            .assume_offset(SITE_UTC_OFFSET)
            + Duration::days(1)
            - Duration::nanoseconds(1),
    };

    let extremes = state
        .tides
        .extremes(&state.site, today, day_after_tomorrow)
        .await
        .map_err(|e| {
            error!("error querying tide provider: {}", e);
            let message = match e {
                TideError::Status { status } => {
                    format!("upstream tide provider returned status {}", status)
                }
                TideError::MissingKey => "tide provider is not configured".to_string(),
                TideError::Request(_) => "upstream tide provider unreachable".to_string(),
            };
            api_error(StatusCode::BAD_GATEWAY, message)
        })?;

    let items = extremes
        .into_iter()
        .filter_map(|extreme| {
            let ts_local = extreme.time.to_offset(SITE_UTC_OFFSET);
            if ts_local < start_local || ts_local > end_local {
                return None;
            }
            Some(TideItem {
                ts: ts_local.format(&Rfc3339).ok()?,
                kind: extreme.kind,
                height: extreme.height,
                source: SOURCE_STORMGLASS.to_string(),
                location: state.location.clone(),
            })
        })
        .collect();

    Ok(Json(TidesResponse { items }))
}
