//! Open-Meteo client for forecast, archive and geocoding endpoints
//!
//! Requests go through `reqwest-middleware` with transient-failure retries and
//! exponential backoff. Ranges that ended more than a few days ago are served
//! by the archive endpoint (and cached when a cache is attached); anything
//! closer to today goes to the forecast endpoint.

use super::{ArchiveCache, DateRange, Geocoder, GeocodingResult, WeatherProvider};
use crate::config::WeatherConfig;
use crate::models::location::{round_coordinates, validate_coordinates};
use crate::models::{CurrentConditions, DailyRecord, UnitSelection};
use crate::{NeboKrugError, Result};
use async_trait::async_trait;
use chrono::{Days, Local, NaiveDate, NaiveDateTime};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// The archive lags real time by a few days
const ARCHIVE_LAG_DAYS: u64 = 5;

const DAILY_VARIABLES: &str =
    "temperature_2m_max,temperature_2m_min,precipitation_sum,wind_speed_10m_max";

const CURRENT_VARIABLES: &str = "apparent_temperature,relative_humidity_2m,rain,showers,\
                                 snowfall,wind_speed_10m,wind_gusts_10m";

const GEOCODING_RESULT_COUNT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Forecast,
    Archive,
}

/// Which endpoint serves `range` when asked on `today`
#[must_use]
pub fn endpoint_for(range: &DateRange, today: NaiveDate) -> Endpoint {
    let archive_horizon = today
        .checked_sub_days(Days::new(ARCHIVE_LAG_DAYS))
        .unwrap_or(today);
    if range.end() < archive_horizon {
        Endpoint::Archive
    } else {
        Endpoint::Forecast
    }
}

#[derive(Debug, Deserialize)]
struct DailyResponse {
    daily: Option<DailyColumns>,
}

#[derive(Debug, Default, Deserialize)]
struct DailyColumns {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    wind_speed_10m_max: Vec<Option<f64>>,
}

impl DailyColumns {
    /// Rows with any missing value are dropped
    fn into_records(self) -> Vec<DailyRecord> {
        fn column(values: &[Option<f64>], i: usize) -> Option<f64> {
            values.get(i).copied().flatten()
        }

        self.time
            .iter()
            .enumerate()
            .filter_map(|(i, day)| {
                let date = match NaiveDate::parse_from_str(day, "%Y-%m-%d") {
                    Ok(date) => date,
                    Err(e) => {
                        warn!("Skipping row with unparseable date '{}': {}", day, e);
                        return None;
                    }
                };
                let (Some(max), Some(min), Some(precip), Some(wind)) = (
                    column(&self.temperature_2m_max, i),
                    column(&self.temperature_2m_min, i),
                    column(&self.precipitation_sum, i),
                    column(&self.wind_speed_10m_max, i),
                ) else {
                    debug!("Skipping {} with missing daily values", date);
                    return None;
                };
                DailyRecord::new(date, max, min, precip, wind)
                    .inspect_err(|e| warn!("Skipping inconsistent row: {}", e))
                    .ok()
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    current: Option<CurrentValues>,
}

#[derive(Debug, Deserialize)]
struct CurrentValues {
    time: String,
    apparent_temperature: f64,
    relative_humidity_2m: f64,
    rain: f64,
    showers: f64,
    snowfall: f64,
    wind_speed_10m: f64,
    wind_gusts_10m: f64,
}

impl CurrentValues {
    fn into_conditions(self) -> Result<CurrentConditions> {
        let time = NaiveDateTime::parse_from_str(&self.time, "%Y-%m-%dT%H:%M")
            .map_err(|e| NeboKrugError::api(format!("invalid time '{}': {e}", self.time)))?;
        Ok(CurrentConditions {
            time,
            apparent_temperature: self.apparent_temperature,
            relative_humidity: self.relative_humidity_2m,
            rain: self.rain,
            showers: self.showers,
            snowfall: self.snowfall,
            wind_speed: self.wind_speed_10m,
            wind_gusts: self.wind_gusts_10m,
        })
    }
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    reason: String,
}

/// HTTP client for the Open-Meteo APIs
pub struct OpenMeteoClient {
    client: ClientWithMiddleware,
    forecast_base_url: String,
    archive_base_url: String,
    geocoding_base_url: String,
    cache: Option<ArchiveCache>,
}

impl OpenMeteoClient {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds.into());

        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("NeboKrug/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NeboKrugError::api(format!("Failed to create HTTP client: {e}")))?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(inner)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            forecast_base_url: config.forecast_base_url.trim_end_matches('/').to_string(),
            archive_base_url: config.archive_base_url.trim_end_matches('/').to_string(),
            geocoding_base_url: config.geocoding_base_url.trim_end_matches('/').to_string(),
            cache: None,
        })
    }

    /// Attach a persistent cache for archive responses
    #[must_use]
    pub fn with_cache(mut self, cache: ArchiveCache) -> Self {
        self.cache = Some(cache);
        self
    }

    fn daily_url(
        &self,
        endpoint: Endpoint,
        latitude: f64,
        longitude: f64,
        range: &DateRange,
        units: &UnitSelection,
    ) -> String {
        let (base, path) = match endpoint {
            Endpoint::Forecast => (&self.forecast_base_url, "forecast"),
            Endpoint::Archive => (&self.archive_base_url, "archive"),
        };
        format!(
            "{base}/{path}?latitude={latitude}&longitude={longitude}&start_date={}&end_date={}&daily={DAILY_VARIABLES}&timezone=auto&{}",
            range.start(),
            range.end(),
            units.query()
        )
    }

    fn current_url(&self, latitude: f64, longitude: f64, units: &UnitSelection) -> String {
        format!(
            "{}/forecast?latitude={latitude}&longitude={longitude}&current={CURRENT_VARIABLES}&timezone=auto&{}",
            self.forecast_base_url,
            units.query()
        )
    }

    fn geocoding_url(&self, name: &str) -> String {
        format!(
            "{}/search?name={}&count={GEOCODING_RESULT_COUNT}&language=en&format=json",
            self.geocoding_base_url,
            urlencoding::encode(name)
        )
    }

    fn cache_key(latitude: f64, longitude: f64, range: &DateRange, units: &UnitSelection) -> String {
        let (lat, lon) = round_coordinates(latitude, longitude, 2);
        format!(
            "archive:{lat:.2}:{lon:.2}:{}:{}:{}",
            range.start(),
            range.end(),
            units.query()
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("Open-Meteo request URL: {}", url);
        let start_time = Instant::now();

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| NeboKrugError::api(format!("Open-Meteo request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.reason)
                .unwrap_or(body);
            return Err(NeboKrugError::api(format!("Open-Meteo returned {status}: {reason}")));
        }

        let parsed = response
            .json::<T>()
            .await
            .map_err(|e| NeboKrugError::api(format!("Invalid Open-Meteo response: {e}")))?;

        let elapsed = start_time.elapsed();
        debug!("Open-Meteo answered in {:.3}s", elapsed.as_secs_f64());
        if elapsed.as_secs() > 5 {
            warn!("Slow API response detected: {:.3}s", elapsed.as_secs_f64());
        }
        Ok(parsed)
    }

    async fn cached_archive(&self, key: &str) -> Option<Vec<DailyRecord>> {
        let cache = self.cache.as_ref()?;
        match cache.get::<Vec<DailyRecord>>(key).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!("Ignoring archive cache read failure: {}", e);
                None
            }
        }
    }

    async fn store_archive(&self, key: &str, records: &[DailyRecord]) {
        if let Some(cache) = &self.cache
            && let Err(e) = cache.put(key, records.to_vec()).await
        {
            warn!("Ignoring archive cache write failure: {}", e);
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoClient {
    #[instrument(skip(self, units), fields(range = %range))]
    async fn fetch_daily(
        &self,
        latitude: f64,
        longitude: f64,
        range: DateRange,
        units: UnitSelection,
    ) -> Result<Vec<DailyRecord>> {
        validate_coordinates(latitude, longitude)?;

        let endpoint = endpoint_for(&range, Local::now().date_naive());
        let key = Self::cache_key(latitude, longitude, &range, &units);

        if endpoint == Endpoint::Archive
            && let Some(records) = self.cached_archive(&key).await
        {
            debug!("Archive cache hit for {}", range);
            return Ok(records);
        }

        let url = self.daily_url(endpoint, latitude, longitude, &range, &units);
        let response: DailyResponse = self.get_json(&url).await?;
        let records = response.daily.unwrap_or_default().into_records();

        if endpoint == Endpoint::Archive && !records.is_empty() {
            self.store_archive(&key, &records).await;
        }
        Ok(records)
    }

    #[instrument(skip(self, units))]
    async fn fetch_current(
        &self,
        latitude: f64,
        longitude: f64,
        units: UnitSelection,
    ) -> Result<CurrentConditions> {
        validate_coordinates(latitude, longitude)?;

        let url = self.current_url(latitude, longitude, &units);
        let response: CurrentResponse = self.get_json(&url).await?;
        let current = response
            .current
            .ok_or_else(|| NeboKrugError::api("No current weather data in Open-Meteo response"))?;
        current.into_conditions()
    }
}

#[async_trait]
impl Geocoder for OpenMeteoClient {
    #[instrument(skip(self))]
    async fn search(&self, name: &str) -> Result<Vec<GeocodingResult>> {
        let name = name.trim();
        if name.is_empty() {
            return Err(NeboKrugError::validation("Location name cannot be empty"));
        }

        let response: GeocodingResponse = self.get_json(&self.geocoding_url(name)).await?;
        let results = response.results.unwrap_or_default();
        info!("Geocoding '{}' returned {} results", name, results.len());
        Ok(results)
    }
}
