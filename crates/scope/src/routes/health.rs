use axum::{extract::State, http::StatusCode, Json};
use log::error;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{api_error, ApiError};
use crate::AppState;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = OK, description = "Service is up and the store answers queries"),
        (status = INTERNAL_SERVER_ERROR, description = "Store unavailable or corrupt")
    ))]
pub async fn health(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    state.db.health_check().await.map_err(|e| {
        error!("health check failed: {}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "database unavailable")
    })?;

    Ok(Json(json!({ "status": "ok" })))
}
