use axum::{
    body::Body,
    extract::Request,
    middleware::{self, Next},
    response::IntoResponse,
    routing::get,
    Router,
};
use hyper::{
    header::{ACCEPT, CONTENT_TYPE},
    Method,
};
use log::info;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dashboard_handler, db::Database, debug_seed, debug_stats, get_tides, get_waves, health,
    providers::{Site, TideData},
    routes, waves_summary,
};

#[derive(Clone)]
pub struct AppState {
    pub remote_url: String,
    pub db: Arc<Database>,
    pub tides: Arc<dyn TideData>,
    pub site: Site,
    pub location: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::health,
        routes::waves::get_waves,
        routes::waves::waves_summary,
        routes::tides::get_tides,
        routes::debug::debug_seed,
        routes::debug::debug_stats,
    ),
    components(
        schemas(
            crate::db::ObservationRecord,
            crate::db::DailySummary,
            routes::waves::WavesResponse,
            routes::tides::TideItem,
            routes::tides::TidesResponse,
            routes::ErrorBody,
        )
    ),
    tags(
        (name = "swellscope api", description = "observation query API for one surf spot, with a tide passthrough")
    )
)]
struct ApiDoc;

pub fn build_app_state(
    remote_url: String,
    db: Arc<Database>,
    tides: Arc<dyn TideData>,
    site: Site,
    location: String,
) -> AppState {
    AppState {
        remote_url,
        db,
        tides,
        site,
        location,
    }
}

pub fn app(app_state: AppState) -> Router {
    let api_docs = ApiDoc::openapi();
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE])
        .allow_origin(Any);

    Router::new()
        // UI
        .route("/", get(dashboard_handler))
        // API
        .route("/health", get(health))
        .route("/waves/", get(get_waves))
        .route("/waves/summary", get(waves_summary))
        .route("/tides/", get(get_tides))
        // Debug
        .route("/debug/seed", get(debug_seed))
        .route("/debug/stats", get(debug_stats))
        .with_state(Arc::new(app_state))
        .layer(middleware::from_fn(log_request))
        .merge(Scalar::with_url("/docs", api_docs))
        .layer(cors)
}

async fn log_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let now = time::OffsetDateTime::now_utc();
    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_default();
    info!(target: "http_request", "new request, {} {}", request.method().as_str(), path);

    let response = next.run(request).await;
    let response_time = time::OffsetDateTime::now_utc() - now;
    info!(target: "http_response", "response, code: {}, time: {}", response.status().as_str(), response_time);

    response
}
