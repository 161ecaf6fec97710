use axum::{extract::State, http::StatusCode, Json};
use log::error;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{api_error, ApiError};
use crate::{AppState, SOURCE_SEED};

#[utoipa::path(
    get,
    path = "/debug/seed",
    responses(
        (status = OK, description = "Inserted fixed synthetic wave samples"),
        (status = INTERNAL_SERVER_ERROR, description = "Store failure")
    ))]
pub async fn debug_seed(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let inserted = state
        .db
        .insert_seed_samples(SOURCE_SEED, &state.location)
        .await
        .map_err(|e| {
            error!("error seeding samples: {}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "store write failed")
        })?;

    Ok(Json(json!({ "ok": true, "inserted": inserted })))
}

#[utoipa::path(
    get,
    path = "/debug/stats",
    responses(
        (status = OK, description = "Row count and most recent sample"),
        (status = INTERNAL_SERVER_ERROR, description = "Store failure")
    ))]
pub async fn debug_stats(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let stats = state.db.stats().await.map_err(|e| {
        error!("error reading store stats: {}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "store query failed")
    })?;

    let (last_ts, last_sample) = match stats.last {
        Some(last) => (
            json!(last
                .ts
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_default()),
            json!({
                "hs": last.hs,
                "tp": last.tp,
                "dp": last.dp,
                "sst": last.sst,
                "air_temp": last.air_temp,
                "wind_speed": last.wind_speed,
                "wind_dir": last.wind_dir,
            }),
        ),
        None => (Value::Null, Value::Null),
    };

    Ok(Json(json!({
        "count": stats.count,
        "last_ts": last_ts,
        "last_sample": last_sample,
    })))
}
