use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use log::error;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use time::{
    format_description::well_known::Iso8601, OffsetDateTime, PrimitiveDateTime, Time,
};
use utoipa::{IntoParams, ToSchema};

use super::{api_error, ApiError};
use crate::{db::ObservationRecord, AppState, SOURCE_OPEN_METEO};

#[derive(Debug, Deserialize, IntoParams)]
pub struct WavesQuery {
    /// Inclusive range start, ISO 8601 (e.g. 2025-08-24T00:00:00).
    /// Defaults to the start of the current UTC day.
    pub start: Option<String>,
    /// Inclusive range end, ISO 8601. Open-ended when omitted.
    pub end: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WavesResponse {
    pub items: Vec<ObservationRecord>,
}

/// ISO 8601 instant; a value without an offset is interpreted as UTC.
fn parse_bound(raw: &str) -> Result<OffsetDateTime, ApiError> {
    OffsetDateTime::parse(raw, &Iso8601::DEFAULT)
        .or_else(|_| PrimitiveDateTime::parse(raw, &Iso8601::DEFAULT).map(|dt| dt.assume_utc()))
        .map_err(|_| {
            api_error(
                StatusCode::BAD_REQUEST,
                format!("invalid date parameter: {}", raw),
            )
        })
}

#[utoipa::path(
    get,
    path = "/waves/",
    params(WavesQuery),
    responses(
        (status = OK, description = "Observations in range, ascending by timestamp", body = WavesResponse),
        (status = BAD_REQUEST, description = "Malformed date parameter"),
        (status = INTERNAL_SERVER_ERROR, description = "Store failure")
    ))]
pub async fn get_waves(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WavesQuery>,
) -> Result<Json<WavesResponse>, ApiError> {
    let start = match query.start.as_deref() {
        Some(raw) => parse_bound(raw)?,
        None => OffsetDateTime::now_utc()
            .replace_time(Time::MIDNIGHT),
    };
    let end = match query.end.as_deref() {
        Some(raw) => Some(parse_bound(raw)?),
        None => None,
    };

    let items = state
        .db
        .observations_in_range(start, end)
        .await
        .map_err(|e| {
            error!("error reading observations: {}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "store query failed")
        })?;

    Ok(Json(WavesResponse { items }))
}

#[utoipa::path(
    get,
    path = "/waves/summary",
    responses(
        (status = OK, description = "Per-field means over the current UTC day; summary is null when no rows match"),
        (status = INTERNAL_SERVER_ERROR, description = "Store failure")
    ))]
pub async fn waves_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let today = OffsetDateTime::now_utc().date();

    let summary = state
        .db
        .daily_summary(today, SOURCE_OPEN_METEO)
        .await
        .map_err(|e| {
            error!("error building daily summary: {}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "store query failed")
        })?;

    match summary {
        Some(summary) => Ok(Json(json!(summary))),
        None => Ok(Json(json!({
            "date": today.to_string(),
            "summary": null,
        }))),
    }
}
