//! Fetches today's record and the same calendar day for every past year

use super::sample_set::{HistoricalSampleSet, OmissionReason, PartialDataWarning};
use crate::config::HistoryConfig;
use crate::models::location::validate_coordinates;
use crate::models::{DailyRecord, UnitSelection};
use crate::provider::{DateRange, WeatherProvider};
use crate::{NeboKrugError, Result};
use chrono::{Datelike, Local, NaiveDate};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Where and in which units to collect history
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollectionRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub units: UnitSelection,
}

impl CollectionRequest {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, units: UnitSelection) -> Self {
        Self {
            latitude,
            longitude,
            units,
        }
    }

    /// Build a request from the unit labels stored in settings.
    /// Unknown labels fall back as described in [`UnitSelection::from_labels`],
    /// and each fallback is logged at warn level.
    #[must_use]
    pub fn from_labels(
        latitude: f64,
        longitude: f64,
        temperature_unit: &str,
        wind_speed_unit: &str,
        precipitation_unit: &str,
    ) -> Self {
        let (units, invalid) =
            UnitSelection::from_labels_strict(temperature_unit, wind_speed_unit, precipitation_unit);
        for selection in invalid {
            warn!("{}", selection);
        }
        Self::new(latitude, longitude, units)
    }
}

/// Today's record together with its history
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub today: DailyRecord,
    pub history: HistoricalSampleSet,
}

#[derive(Clone)]
pub struct HistoryCollector {
    provider: Arc<dyn WeatherProvider>,
    start_year: i32,
    concurrency: usize,
}

impl HistoryCollector {
    #[must_use]
    pub fn new(provider: Arc<dyn WeatherProvider>, config: &HistoryConfig) -> Self {
        Self {
            provider,
            start_year: config.start_year,
            concurrency: config.concurrency.max(1),
        }
    }

    /// Collect today's weather and its history using the local date
    pub async fn collect(
        &self,
        request: &CollectionRequest,
        cancel: &CancellationToken,
    ) -> Result<Collection> {
        self.collect_on(Local::now().date_naive(), request, cancel)
            .await
    }

    /// Collect with an explicit "today".
    ///
    /// Years `start_year..today.year()` are fetched with at most
    /// `concurrency` requests in flight. A failing year is skipped with a
    /// warning; failing to fetch today, or every year, is an error.
    #[instrument(skip(self, request, cancel), fields(lat = request.latitude, lon = request.longitude))]
    pub async fn collect_on(
        &self,
        today: NaiveDate,
        request: &CollectionRequest,
        cancel: &CancellationToken,
    ) -> Result<Collection> {
        validate_coordinates(request.latitude, request.longitude)?;
        if today.year() <= self.start_year {
            return Err(NeboKrugError::insufficient_data(format!(
                "no past years between {} and {}",
                self.start_year,
                today.year()
            )));
        }

        let work = async {
            let today_record = self.fetch_today(today, request).await?;
            let history = self.fetch_history(today, *request).await?;
            Ok::<_, NeboKrugError>(Collection {
                today: today_record,
                history,
            })
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                info!("History collection cancelled");
                Err(NeboKrugError::Cancelled)
            }
            result = work => result,
        }
    }

    async fn fetch_today(&self, today: NaiveDate, request: &CollectionRequest) -> Result<DailyRecord> {
        let records = self
            .provider
            .fetch_daily(
                request.latitude,
                request.longitude,
                DateRange::single(today),
                request.units,
            )
            .await
            .map_err(|e| {
                NeboKrugError::provider_unavailable(format!("today's weather is unavailable: {e}"))
            })?;

        records
            .into_iter()
            .find(|r| r.date() == today)
            .ok_or_else(|| NeboKrugError::provider_unavailable(format!("no weather data for {today}")))
    }

    async fn fetch_history(
        &self,
        today: NaiveDate,
        request: CollectionRequest,
    ) -> Result<HistoricalSampleSet> {
        let start_time = Instant::now();
        let mut warnings = Vec::new();
        let mut dates = Vec::new();
        for year in self.start_year..today.year() {
            match today.with_year(year) {
                Some(date) => dates.push(date),
                None => warnings.push(PartialDataWarning::new(year, OmissionReason::NoSuchDay)),
            }
        }
        let requested = dates.len();

        let provider = Arc::clone(&self.provider);
        let outcomes: Vec<(i32, std::result::Result<DailyRecord, OmissionReason>)> =
            stream::iter(dates)
                .map(move |date| {
                    let provider = Arc::clone(&provider);
                    async move {
                        let outcome = fetch_year(provider.as_ref(), date, request).await;
                        (date.year(), outcome)
                    }
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        let mut records = Vec::with_capacity(outcomes.len());
        for (year, outcome) in outcomes {
            match outcome {
                Ok(record) => records.push(record),
                Err(reason) => {
                    debug!("Omitting {}: {:?}", year, reason);
                    warnings.push(PartialDataWarning::new(year, reason));
                }
            }
        }

        if records.is_empty() && requested > 0 {
            return Err(NeboKrugError::provider_unavailable(format!(
                "none of the {requested} historical years could be fetched"
            )));
        }

        info!(
            "Collected {} of {} years in {:.2}s",
            records.len(),
            requested,
            start_time.elapsed().as_secs_f64()
        );
        if !warnings.is_empty() {
            warn!("{} years omitted from history", warnings.len());
        }

        HistoricalSampleSet::new(self.start_year, request.units, records, warnings)
    }
}

async fn fetch_year(
    provider: &dyn WeatherProvider,
    date: NaiveDate,
    request: CollectionRequest,
) -> std::result::Result<DailyRecord, OmissionReason> {
    let records = provider
        .fetch_daily(
            request.latitude,
            request.longitude,
            DateRange::single(date),
            request.units,
        )
        .await
        .map_err(|e| OmissionReason::ProviderError(e.to_string()))?;

    records
        .into_iter()
        .find(|r| r.date() == date)
        .ok_or(OmissionReason::MissingData)
}
