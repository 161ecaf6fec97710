use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use std::sync::Arc;
use tower::ServiceExt;
use swellscope::{ObservationRecord, SOURCE_OPEN_METEO, SOURCE_SEED};
use time::{Duration, OffsetDateTime, Time};

use crate::helpers::{get_json, spawn_app, MockTides};

#[tokio::test]
async fn health_reports_ok() {
    let test_app = spawn_app(Arc::new(MockTides::new())).await;

    let (status, body) = get_json(&test_app.app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn range_includes_end_bound_exactly() {
    let test_app = spawn_app(Arc::new(MockTides::new())).await;

    let (status, body) = get_json(&test_app.app, "/debug/seed").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inserted"], 3);

    let (status, body) = get_json(
        &test_app.app,
        "/waves/?start=2025-08-24T00:00:00&end=2025-08-24T01:00:00",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().expect("items array");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["ts"], "2025-08-24T00:00:00Z");
    assert_eq!(items[1]["ts"], "2025-08-24T01:00:00Z");

    // One millisecond before the second sample leaves only the first.
    let (status, body) = get_json(
        &test_app.app,
        "/waves/?start=2025-08-24T00:00:00&end=2025-08-24T00:59:59.999",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().expect("items array").len(), 1);
}

#[tokio::test]
async fn open_ended_range_returns_everything_from_start() {
    let test_app = spawn_app(Arc::new(MockTides::new())).await;
    get_json(&test_app.app, "/debug/seed").await;

    let (status, body) =
        get_json(&test_app.app, "/waves/?start=2025-08-24T01:00:00").await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().expect("items array");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["source"], SOURCE_SEED);
}

#[tokio::test]
async fn malformed_date_is_rejected() {
    let test_app = spawn_app(Arc::new(MockTides::new())).await;

    let (status, body) = get_json(&test_app.app, "/waves/?start=not-a-date").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().expect("error message");
    assert!(message.contains("invalid date parameter"));
}

#[tokio::test]
async fn summary_averages_todays_rows_and_ignores_other_sources() {
    let test_app = spawn_app(Arc::new(MockTides::new())).await;

    let midnight = OffsetDateTime::now_utc().replace_time(Time::MIDNIGHT);
    let rows = vec![
        ObservationRecord {
            hs: Some(1.0),
            tp: Some(10.0),
            ..ObservationRecord::empty(midnight, SOURCE_OPEN_METEO, "Leme-RJ")
        },
        ObservationRecord {
            hs: Some(2.0),
            ..ObservationRecord::empty(
                midnight + Duration::hours(1),
                SOURCE_OPEN_METEO,
                "Leme-RJ",
            )
        },
        ObservationRecord::empty(midnight + Duration::hours(2), SOURCE_OPEN_METEO, "Leme-RJ"),
        // Same day, different source; must not skew the average.
        ObservationRecord {
            hs: Some(100.0),
            ..ObservationRecord::empty(midnight + Duration::hours(3), SOURCE_SEED, "Leme-RJ")
        },
    ];
    test_app.db.insert_observations(rows).await.expect("insert");

    let (status, body) = get_json(&test_app.app, "/waves/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["date"], OffsetDateTime::now_utc().date().to_string());
    assert_eq!(body["hs_avg"], 1.5);
    assert_eq!(body["tp_avg"], 10.0);
    assert!(body["dp_avg"].is_null());
}

#[tokio::test]
async fn summary_is_null_without_rows() {
    let test_app = spawn_app(Arc::new(MockTides::new())).await;

    let (status, body) = get_json(&test_app.app, "/waves/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["date"], OffsetDateTime::now_utc().date().to_string());
    assert!(body["summary"].is_null());
}

#[tokio::test]
async fn stats_reports_count_and_latest_sample() {
    let test_app = spawn_app(Arc::new(MockTides::new())).await;

    let (_, body) = get_json(&test_app.app, "/debug/stats").await;
    assert_eq!(body["count"], 0);
    assert!(body["last_ts"].is_null());

    get_json(&test_app.app, "/debug/seed").await;

    let (status, body) = get_json(&test_app.app, "/debug/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    assert_eq!(body["last_ts"], "2025-08-24T02:00:00Z");
    assert_eq!(body["last_sample"]["hs"], 1.5);
    assert_eq!(body["last_sample"]["dp"], 190.0);
}

#[tokio::test]
async fn dashboard_renders_seeded_series() {
    let test_app = spawn_app(Arc::new(MockTides::new())).await;
    get_json(&test_app.app, "/debug/seed").await;

    let response = test_app
        .app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request"))
        .await
        .expect("oneshot");
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body");
    let html = String::from_utf8(bytes.to_vec()).expect("utf8 body");
    assert!(html.contains("Leme-RJ"));
    assert!(html.contains("const hs = [1.6,1.7,1.5];"));
}

#[tokio::test]
async fn seeding_twice_inserts_nothing_new() {
    let test_app = spawn_app(Arc::new(MockTides::new())).await;

    get_json(&test_app.app, "/debug/seed").await;
    let (status, body) = get_json(&test_app.app, "/debug/seed").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inserted"], 0);

    let (_, body) = get_json(&test_app.app, "/debug/stats").await;
    assert_eq!(body["count"], 3);
}
