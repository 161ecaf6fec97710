use std::sync::Arc;
use swellscope::{
    AtmosphericHourly, CycleError, Database, MarineHourly, ProviderError,
};
use time::macros::datetime;

use crate::helpers::{atmospheric_series, marine_series, test_collector, MockProvider};

#[tokio::test]
async fn overlapping_cycles_insert_each_row_once() {
    let db = Arc::new(Database::in_memory().await.expect("in-memory database"));

    let mut provider = MockProvider::new();
    provider
        .expect_marine_hourly()
        .times(2)
        .returning(|_| Ok(marine_series("2025-08-24", 24)));
    provider
        .expect_atmospheric_hourly()
        .times(2)
        .returning(|_| Ok(atmospheric_series("2025-08-24", 24)));

    let collector = test_collector(db.clone(), Arc::new(provider));

    let first = collector.run_cycle().await.expect("first cycle");
    assert_eq!(first.merged, 24);
    assert_eq!(first.inserted, 24);
    assert_eq!(first.deduped, 0);

    // The fetch window always overlaps the previous one; the second pass
    // must not duplicate any hourly slot.
    let second = collector.run_cycle().await.expect("second cycle");
    assert_eq!(second.merged, 24);
    assert_eq!(second.inserted, 0);

    let stats = db.stats().await.expect("stats");
    assert_eq!(stats.count, 24);
}

#[tokio::test]
async fn failed_fetch_writes_nothing() {
    let db = Arc::new(Database::in_memory().await.expect("in-memory database"));

    let mut provider = MockProvider::new();
    provider
        .expect_marine_hourly()
        .returning(|_| Ok(marine_series("2025-08-24", 24)));
    provider.expect_atmospheric_hourly().returning(|_| {
        Err(ProviderError::Status {
            status: 500,
            body: "server error".to_string(),
        })
    });

    let collector = test_collector(db.clone(), Arc::new(provider));

    let result = collector.run_cycle().await;
    assert!(matches!(result, Err(CycleError::Provider(_))));

    // Marine data arrived fine, but the cycle is all-or-nothing.
    let stats = db.stats().await.expect("stats");
    assert_eq!(stats.count, 0);
}

#[tokio::test]
async fn series_merge_by_timestamp_not_position() {
    let db = Arc::new(Database::in_memory().await.expect("in-memory database"));

    let marine = MarineHourly {
        time: vec![
            "2025-08-24T00:00".to_string(),
            "2025-08-24T01:00".to_string(),
            "2025-08-24T02:00".to_string(),
        ],
        wave_height: vec![Some(1.1), Some(1.2), Some(1.3)],
        wave_period: vec![Some(10.0), Some(11.0), Some(12.0)],
        wave_direction: vec![Some(180.0), Some(181.0), Some(182.0)],
        sea_surface_temperature: vec![Some(22.0), Some(22.1), Some(22.2)],
    };
    // Hour 01:00 is missing from the atmospheric series. Positional
    // pairing would shift 02:00's readings onto the 01:00 row.
    let atmospheric = AtmosphericHourly {
        time: vec![
            "2025-08-24T00:00".to_string(),
            "2025-08-24T02:00".to_string(),
        ],
        temperature_2m: vec![Some(21.0), Some(23.0)],
        wind_speed_10m: vec![Some(3.0), Some(5.0)],
        wind_direction_10m: vec![Some(220.0), Some(222.0)],
    };

    let mut provider = MockProvider::new();
    provider
        .expect_marine_hourly()
        .returning(move |_| Ok(marine.clone()));
    provider
        .expect_atmospheric_hourly()
        .returning(move |_| Ok(atmospheric.clone()));

    let collector = test_collector(db.clone(), Arc::new(provider));
    let outcome = collector.run_cycle().await.expect("cycle");
    assert_eq!(outcome.merged, 3);
    assert_eq!(outcome.inserted, 3);

    let rows = db
        .observations_in_range(datetime!(2025-08-24 00:00:00 UTC), None)
        .await
        .expect("range query");
    assert_eq!(rows.len(), 3);

    assert_eq!(rows[0].ts, datetime!(2025-08-24 00:00:00 UTC));
    assert_eq!(rows[0].hs, Some(1.1));
    assert_eq!(rows[0].air_temp, Some(21.0));

    assert_eq!(rows[1].ts, datetime!(2025-08-24 01:00:00 UTC));
    assert_eq!(rows[1].hs, Some(1.2));
    assert_eq!(rows[1].air_temp, None);

    assert_eq!(rows[2].ts, datetime!(2025-08-24 02:00:00 UTC));
    assert_eq!(rows[2].hs, Some(1.3));
    assert_eq!(rows[2].air_temp, Some(23.0));
    assert_eq!(rows[2].wind_speed, Some(5.0));
}

#[tokio::test]
async fn null_and_short_series_slots_store_as_null() {
    let db = Arc::new(Database::in_memory().await.expect("in-memory database"));

    let marine = MarineHourly {
        time: vec![
            "2025-08-24T00:00".to_string(),
            "2025-08-24T01:00".to_string(),
        ],
        wave_height: vec![None, Some(1.2)],
        // Shorter than the time array; the trailing slot reads as null.
        wave_period: vec![Some(9.0)],
        wave_direction: vec![],
        sea_surface_temperature: vec![Some(22.0), None],
    };

    let mut provider = MockProvider::new();
    provider
        .expect_marine_hourly()
        .returning(move |_| Ok(marine.clone()));
    provider
        .expect_atmospheric_hourly()
        .returning(|_| Ok(AtmosphericHourly::default()));

    let collector = test_collector(db.clone(), Arc::new(provider));
    let outcome = collector.run_cycle().await.expect("cycle");
    assert_eq!(outcome.inserted, 2);

    let rows = db
        .observations_in_range(datetime!(2025-08-24 00:00:00 UTC), None)
        .await
        .expect("range query");

    assert_eq!(rows[0].hs, None);
    assert_eq!(rows[0].tp, Some(9.0));
    assert_eq!(rows[0].dp, None);
    assert_eq!(rows[0].sst, Some(22.0));

    assert_eq!(rows[1].hs, Some(1.2));
    assert_eq!(rows[1].tp, None);
    assert_eq!(rows[1].sst, None);
    assert_eq!(rows[1].air_temp, None);
}
