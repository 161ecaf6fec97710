pub mod debug;
pub mod health;
pub mod tides;
pub mod ui;
pub mod waves;

pub use debug::{debug_seed, debug_stats};
pub use health::health;
pub use tides::get_tides;
pub use ui::dashboard_handler;
pub use waves::{get_waves, waves_summary};

use axum::{http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured error body every request-scoped failure is reported with
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorBody>);

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}
