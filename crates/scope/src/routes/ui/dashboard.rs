use axum::{extract::State, response::Html};
use log::error;
use std::sync::Arc;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::{
    templates::{dashboard_page, DashboardData},
    AppState,
};

/// Handler for the dashboard page (GET /)
pub async fn dashboard_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    let data = build_dashboard_data(&state).await;
    Html(dashboard_page(&state.location, &data).into_string())
}

async fn build_dashboard_data(state: &Arc<AppState>) -> DashboardData {
    let rows = state
        .db
        .observations_in_range(OffsetDateTime::UNIX_EPOCH, None)
        .await
        .unwrap_or_else(|e| {
            error!("error loading dashboard rows: {}", e);
            Vec::new()
        });

    let mut data = DashboardData::default();
    for row in rows {
        data.times
            .push(row.ts.format(&Rfc3339).unwrap_or_default());
        data.hs.push(row.hs);
        data.tp.push(row.tp);
        data.air_temp.push(row.air_temp);
        data.sst.push(row.sst);
    }
    data
}
