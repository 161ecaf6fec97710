use axum::http::StatusCode;
use std::sync::Arc;
use swellscope::{TideError, TideExtreme, SOURCE_STORMGLASS};
use time::{Duration, OffsetDateTime};

use crate::helpers::{get_json, spawn_app, MockTides};

#[tokio::test]
async fn extremes_come_back_in_site_local_time() {
    let in_window = OffsetDateTime::now_utc() + Duration::hours(1);
    let extremes = vec![
        TideExtreme {
            time: in_window,
            kind: Some("high".to_string()),
            height: Some(1.2),
        },
        // Outside the three-day window; filtered out.
        TideExtreme {
            time: OffsetDateTime::now_utc() + Duration::days(30),
            kind: Some("low".to_string()),
            height: Some(-0.1),
        },
    ];

    let mut tides = MockTides::new();
    tides
        .expect_extremes()
        .returning(move |_, _, _| Ok(extremes.clone()));

    let test_app = spawn_app(Arc::new(tides)).await;

    let (status, body) = get_json(&test_app.app, "/tides/").await;
    assert_eq!(status, StatusCode::OK);

    let items = body["items"].as_array().expect("items array");
    assert_eq!(items.len(), 1);

    let ts = items[0]["ts"].as_str().expect("ts string");
    assert!(ts.ends_with("-03:00"), "expected site-local offset, got {}", ts);
    assert_eq!(items[0]["type"], "high");
    assert_eq!(items[0]["height"], 1.2);
    assert_eq!(items[0]["source"], SOURCE_STORMGLASS);
    assert_eq!(items[0]["location"], "Leme-RJ");
}

#[tokio::test]
async fn explicit_window_filters_extremes() {
    let soon = OffsetDateTime::now_utc() + Duration::hours(1);
    let tomorrow = OffsetDateTime::now_utc() + Duration::hours(30);
    let extremes = vec![
        TideExtreme {
            time: soon,
            kind: Some("high".to_string()),
            height: Some(1.1),
        },
        TideExtreme {
            time: tomorrow,
            kind: Some("low".to_string()),
            height: Some(-0.2),
        },
    ];

    let mut tides = MockTides::new();
    tides
        .expect_extremes()
        .returning(move |_, _, _| Ok(extremes.clone()));

    let test_app = spawn_app(Arc::new(tides)).await;

    // A window ending a few hours out keeps the first extreme only.
    let end = (OffsetDateTime::now_utc() + Duration::hours(6))
        .format(&time::format_description::well_known::Rfc3339)
        .expect("format end bound");
    let uri = format!("/tides/?end={}", end.replace('+', "%2B"));

    let (status, body) = get_json(&test_app.app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().expect("items array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["type"], "high");
}

#[tokio::test]
async fn upstream_failure_maps_to_bad_gateway() {
    let mut tides = MockTides::new();
    tides
        .expect_extremes()
        .returning(|_, _, _| Err(TideError::Status { status: 503 }));

    let test_app = spawn_app(Arc::new(tides)).await;

    let (status, body) = get_json(&test_app.app, "/tides/").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let message = body["error"].as_str().expect("error message");
    assert!(message.contains("503"));
}

#[tokio::test]
async fn unconfigured_provider_maps_to_bad_gateway() {
    let mut tides = MockTides::new();
    tides
        .expect_extremes()
        .returning(|_, _, _| Err(TideError::MissingKey));

    let test_app = spawn_app(Arc::new(tides)).await;

    let (status, body) = get_json(&test_app.app, "/tides/").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let message = body["error"].as_str().expect("error message");
    assert!(message.contains("not configured"));
}

#[tokio::test]
async fn malformed_window_is_rejected_before_any_upstream_call() {
    // Zero expectations; the mock panics if the provider is reached.
    let test_app = spawn_app(Arc::new(MockTides::new())).await;

    let (status, _) = get_json(&test_app.app, "/tides/?start=garbage").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
