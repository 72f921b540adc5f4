//! `OpenMeteoClient` over HTTP against a local stand-in for the Open-Meteo APIs

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Datelike, Days, Local, NaiveDate};
use nebokrug::config::{HistoryConfig, WeatherConfig};
use nebokrug::history::{CollectionRequest, HistoryCollector, OmissionReason};
use nebokrug::provider::DateRange;
use nebokrug::{
    ArchiveCache, Geocoder, NeboKrugError, OpenMeteoClient, UnitSelection, WeatherProvider,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct Upstream {
    archive_hits: AtomicUsize,
    forecast_hits: AtomicUsize,
    /// Years answered with a null maximum temperature
    null_years: Vec<i32>,
}

type Params = Query<HashMap<String, String>>;

fn date_param(params: &HashMap<String, String>, name: &str) -> NaiveDate {
    NaiveDate::parse_from_str(&params[name], "%Y-%m-%d").unwrap()
}

fn daily_body(upstream: &Upstream, params: &HashMap<String, String>) -> Value {
    let start = date_param(params, "start_date");
    let end = date_param(params, "end_date");
    let days: Vec<NaiveDate> = start.iter_days().take_while(|d| *d <= end).collect();

    let max: Vec<Value> = days
        .iter()
        .map(|d| {
            if upstream.null_years.contains(&d.year()) {
                Value::Null
            } else {
                json!(20.0 + f64::from(d.day()))
            }
        })
        .collect();

    json!({
        "latitude": 50.45,
        "longitude": 30.52,
        "daily": {
            "time": days.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "temperature_2m_max": max,
            "temperature_2m_min": vec![10.0; days.len()],
            "precipitation_sum": vec![1.5; days.len()],
            "wind_speed_10m_max": vec![12.0; days.len()],
        }
    })
}

async fn archive(State(upstream): State<Arc<Upstream>>, Query(params): Params) -> Json<Value> {
    upstream.archive_hits.fetch_add(1, Ordering::SeqCst);
    Json(daily_body(&upstream, &params))
}

async fn forecast(State(upstream): State<Arc<Upstream>>, Query(params): Params) -> Json<Value> {
    upstream.forecast_hits.fetch_add(1, Ordering::SeqCst);
    Json(daily_body(&upstream, &params))
}

async fn rejecting() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"error": true, "reason": "Parameter 'start_date' is out of allowed range"})),
    )
        .into_response()
}

async fn search(Query(params): Params) -> Json<Value> {
    if params["name"] == "Lviv" {
        Json(json!({"results": [
            {"id": 702550, "name": "Lviv", "latitude": 49.84, "longitude": 24.02,
             "country": "Ukraine", "admin1": "Lviv Oblast"}
        ]}))
    } else {
        Json(json!({"generationtime_ms": 0.3}))
    }
}

async fn start_upstream(upstream: Arc<Upstream>) -> SocketAddr {
    let app = Router::new()
        .route("/v1/forecast", get(forecast))
        .route("/archive/v1/archive", get(archive))
        .route("/rejecting/v1/archive", get(rejecting))
        .route("/geo/v1/search", get(search))
        .with_state(upstream);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await });
    addr
}

fn weather_config(addr: SocketAddr) -> WeatherConfig {
    WeatherConfig {
        forecast_base_url: format!("http://{addr}/v1"),
        archive_base_url: format!("http://{addr}/archive/v1"),
        geocoding_base_url: format!("http://{addr}/geo/v1"),
        timeout_seconds: 5,
        max_retries: 0,
    }
}

fn day(year: i32, month: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, d).unwrap()
}

#[tokio::test]
async fn test_archive_range_is_cached() {
    let upstream = Arc::new(Upstream::default());
    let addr = start_upstream(upstream.clone()).await;
    let dir = TempDir::new().unwrap();
    let cache = ArchiveCache::open(dir.path(), Duration::from_secs(3600)).unwrap();
    let client = OpenMeteoClient::new(&weather_config(addr))
        .unwrap()
        .with_cache(cache);

    let range = DateRange::new(day(1990, 3, 1), day(1990, 3, 3)).unwrap();
    let first = client
        .fetch_daily(50.45, 30.52, range, UnitSelection::default())
        .await
        .unwrap();
    assert_eq!(first.len(), 3);
    assert_eq!(first[2].date(), day(1990, 3, 3));
    assert_eq!(first[2].temp_max(), 23.0);
    assert_eq!(upstream.archive_hits.load(Ordering::SeqCst), 1);

    let second = client
        .fetch_daily(50.45, 30.52, range, UnitSelection::default())
        .await
        .unwrap();
    assert_eq!(second, first);
    assert_eq!(upstream.archive_hits.load(Ordering::SeqCst), 1);
    assert_eq!(upstream.forecast_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_upcoming_range_uses_forecast_uncached() {
    let upstream = Arc::new(Upstream::default());
    let addr = start_upstream(upstream.clone()).await;
    let dir = TempDir::new().unwrap();
    let cache = ArchiveCache::open(dir.path(), Duration::from_secs(3600)).unwrap();
    let client = OpenMeteoClient::new(&weather_config(addr))
        .unwrap()
        .with_cache(cache);

    let today = Local::now().date_naive();
    let range = DateRange::new(today, today + Days::new(3)).unwrap();
    for _ in 0..2 {
        let records = client
            .fetch_daily(50.45, 30.52, range, UnitSelection::default())
            .await
            .unwrap();
        assert_eq!(records.len(), 4);
    }
    assert_eq!(upstream.forecast_hits.load(Ordering::SeqCst), 2);
    assert_eq!(upstream.archive_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_error_reason_is_surfaced() {
    let addr = start_upstream(Arc::new(Upstream::default())).await;
    let config = WeatherConfig {
        archive_base_url: format!("http://{addr}/rejecting/v1"),
        ..weather_config(addr)
    };
    let client = OpenMeteoClient::new(&config).unwrap();

    let result = client
        .fetch_daily(
            50.45,
            30.52,
            DateRange::single(day(1990, 3, 1)),
            UnitSelection::default(),
        )
        .await;
    match result {
        Err(NeboKrugError::Api { message }) => {
            assert!(message.contains("400"), "{message}");
            assert!(message.contains("Parameter 'start_date' is out of allowed range"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_null_rows_become_missing_years() {
    let upstream = Arc::new(Upstream {
        null_years: vec![1995],
        ..Upstream::default()
    });
    let addr = start_upstream(upstream.clone()).await;
    let client = OpenMeteoClient::new(&weather_config(addr)).unwrap();
    let collector = HistoryCollector::new(
        Arc::new(client),
        &HistoryConfig {
            start_year: 1990,
            concurrency: 4,
        },
    );

    let collection = collector
        .collect_on(
            day(2000, 7, 1),
            &CollectionRequest::new(50.45, 30.52, UnitSelection::default()),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(collection.history.len(), 9);
    let warnings = collection.history.warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].year, 1995);
    assert_eq!(warnings[0].reason, OmissionReason::MissingData);
    // today plus ten past years
    assert_eq!(upstream.archive_hits.load(Ordering::SeqCst), 11);
}

#[tokio::test]
async fn test_geocoding_search() {
    let addr = start_upstream(Arc::new(Upstream::default())).await;
    let client = OpenMeteoClient::new(&weather_config(addr)).unwrap();

    let found = client.search("Lviv").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].admin1.as_deref(), Some("Lviv Oblast"));

    assert!(client.search("Nowhere").await.unwrap().is_empty());
}
