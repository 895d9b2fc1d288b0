use crate::helpers::{spawn_app, MockClimateAccess};
use axum::{
    body::{to_bytes, Body},
    http::Request,
};
use climate_api::{db, StationsResponse, TemperatureStats};
use hyper::{Method, StatusCode};
use serde_json::{from_slice, json, Value};
use std::{collections::BTreeMap, sync::Arc};
use time::macros::date;
use tower::ServiceExt;

/// The landing page advertises every endpoint of the API.
#[tokio::test]
async fn index_lists_every_endpoint() {
    let climate_db = MockClimateAccess::new();
    let test_app = spawn_app(Arc::new(climate_db)).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(body.to_vec()).unwrap();

    for endpoint in [
        "/api/v1.0/precipitation",
        "/api/v1.0/stations",
        "/api/v1.0/tobs",
        "/api/v1.0/temp/start",
        "/api/v1.0/temp/start/end",
    ] {
        assert!(html.contains(endpoint), "missing endpoint: {}", endpoint);
    }
    assert!(html.contains("MMDDYYYY"));
}

#[tokio::test]
async fn precipitation_returns_date_keyed_map() {
    let mut climate_db = MockClimateAccess::new();
    climate_db
        .expect_precipitation_last_year()
        .times(1)
        .returning(|| {
            Ok(BTreeMap::from([
                ("2017-08-22".to_string(), Some(0.5)),
                ("2017-08-23".to_string(), None),
            ]))
        });

    let test_app = spawn_app(Arc::new(climate_db)).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1.0/precipitation")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: Value = from_slice(&body).unwrap();

    assert_eq!(parsed, json!({"2017-08-22": 0.5, "2017-08-23": null}));
}

/// Serializing then parsing the stations response yields the same ordered
/// sequence of identifiers the store produced.
#[tokio::test]
async fn stations_round_trip_preserves_order() {
    let ids = vec![
        "USC00519397".to_string(),
        "USC00513117".to_string(),
        "USC00514830".to_string(),
    ];

    let expected = ids.clone();
    let mut climate_db = MockClimateAccess::new();
    climate_db
        .expect_list_stations()
        .times(1)
        .returning(move || Ok(ids.clone()));

    let test_app = spawn_app(Arc::new(climate_db)).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1.0/stations")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: StationsResponse = from_slice(&body).unwrap();

    assert_eq!(parsed.stations, expected);
}

#[tokio::test]
async fn tobs_returns_primary_station_temps() {
    let mut climate_db = MockClimateAccess::new();
    climate_db
        .expect_primary_station_temps_last_year()
        .times(1)
        .returning(|| Ok(vec![77.0, 80.0, 76.0]));

    let test_app = spawn_app(Arc::new(climate_db)).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1.0/tobs")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: Value = from_slice(&body).unwrap();

    assert_eq!(parsed, json!({"temps": [77.0, 80.0, 76.0]}));
}

#[tokio::test]
async fn temp_start_parses_compact_date() {
    let mut climate_db = MockClimateAccess::new();
    climate_db
        .expect_temperature_stats()
        .withf(|start, end| *start == date!(2017 - 08 - 23) && end.is_none())
        .times(1)
        .returning(|_, _| {
            Ok(TemperatureStats {
                min: Some(58.0),
                avg: Some(74.5),
                max: Some(87.0),
            })
        });

    let test_app = spawn_app(Arc::new(climate_db)).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1.0/temp/08232017")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: Value = from_slice(&body).unwrap();

    assert_eq!(parsed, json!({"temps": [58.0, 74.5, 87.0]}));
}

#[tokio::test]
async fn temp_range_passes_both_dates() {
    let mut climate_db = MockClimateAccess::new();
    climate_db
        .expect_temperature_stats()
        .withf(|start, end| {
            *start == date!(2016 - 08 - 23) && *end == Some(date!(2017 - 08 - 23))
        })
        .times(1)
        .returning(|_, _| {
            Ok(TemperatureStats {
                min: Some(58.0),
                avg: Some(74.5),
                max: Some(87.0),
            })
        });

    let test_app = spawn_app(Arc::new(climate_db)).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1.0/temp/08232016/08232017")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
}

/// A start date in the wrong format is rejected up front; the store is
/// never touched.
#[tokio::test]
async fn malformed_start_date_is_rejected() {
    let climate_db = MockClimateAccess::new();
    let test_app = spawn_app(Arc::new(climate_db)).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1.0/temp/2017-08-23")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let message = String::from_utf8(body.to_vec()).unwrap();
    assert!(message.contains("MMDDYYYY"));
}

#[tokio::test]
async fn malformed_end_date_is_rejected() {
    let climate_db = MockClimateAccess::new();
    let test_app = spawn_app(Arc::new(climate_db)).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1.0/temp/08232016/17")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let message = String::from_utf8(body.to_vec()).unwrap();
    assert!(message.contains("end"));
}

/// Aggregates over an empty result set come back as three nulls, not an
/// error.
#[tokio::test]
async fn empty_range_serializes_null_stats() {
    let mut climate_db = MockClimateAccess::new();
    climate_db
        .expect_temperature_stats()
        .times(1)
        .returning(|_, _| Ok(TemperatureStats::default()));

    let test_app = spawn_app(Arc::new(climate_db)).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1.0/temp/08232017/01012017")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: Value = from_slice(&body).unwrap();

    assert_eq!(parsed, json!({"temps": [null, null, null]}));
}

#[tokio::test]
async fn store_failure_maps_to_server_error() {
    let mut climate_db = MockClimateAccess::new();
    climate_db
        .expect_precipitation_last_year()
        .times(1)
        .returning(|| Err(db::Error::Query(sqlx::Error::PoolTimedOut)));

    let test_app = spawn_app(Arc::new(climate_db)).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1.0/precipitation")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
