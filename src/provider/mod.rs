//! Weather data sources
//!
//! The collector only talks to the [`WeatherProvider`] trait, so tests and
//! alternative backends can stand in for [`OpenMeteoClient`].

pub mod cache;
pub mod open_meteo;

pub use cache::ArchiveCache;
pub use open_meteo::OpenMeteoClient;

use crate::models::{CurrentConditions, DailyRecord, Location, UnitSelection};
use crate::{NeboKrugError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(NeboKrugError::validation(format!(
                "date range starts after it ends: {start} > {end}"
            )));
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}..{}", self.start, self.end)
        }
    }
}

/// Source of daily aggregates and current conditions
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Daily records for every day in `range` the provider has complete data for
    async fn fetch_daily(
        &self,
        latitude: f64,
        longitude: f64,
        range: DateRange,
        units: UnitSelection,
    ) -> Result<Vec<DailyRecord>>;

    async fn fetch_current(
        &self,
        latitude: f64,
        longitude: f64,
        units: UnitSelection,
    ) -> Result<CurrentConditions>;
}

/// A place returned by a geocoding search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodingResult {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub admin1: Option<String>,
}

impl From<GeocodingResult> for Location {
    fn from(result: GeocodingResult) -> Self {
        Location::new(
            result.name,
            result.country.unwrap_or_default(),
            result.latitude,
            result.longitude,
        )
        .with_admin1(result.admin1)
    }
}

/// Resolves place names to coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Search for places by name. An empty result is not an error.
    async fn search(&self, name: &str) -> Result<Vec<GeocodingResult>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    #[test]
    fn test_date_range() {
        let range = DateRange::new(date(1), date(3)).unwrap();
        assert_eq!(range.start(), date(1));
        assert_eq!(range.end(), date(3));
        assert_eq!(range.to_string(), "2024-06-01..2024-06-03");
        assert_eq!(DateRange::single(date(5)).to_string(), "2024-06-05");
        assert!(DateRange::new(date(3), date(1)).is_err());
    }

    #[test]
    fn test_geocoding_result_into_location() {
        let result = GeocodingResult {
            name: "Lviv".to_string(),
            latitude: 49.84,
            longitude: 24.03,
            country: Some("Ukraine".to_string()),
            admin1: Some("Lviv Oblast".to_string()),
        };
        let location = Location::from(result);
        assert_eq!(location.country, "Ukraine");
        assert_eq!(location.admin1.as_deref(), Some("Lviv Oblast"));
        assert_eq!(location.to_string(), "Lviv, Lviv Oblast, Ukraine");
    }

    #[test]
    fn test_geocoding_result_without_country() {
        let json = r#"{"name":"Null Island","latitude":0.0,"longitude":0.0}"#;
        let result: GeocodingResult = serde_json::from_str(json).unwrap();
        let location = Location::from(result);
        assert_eq!(location.to_string(), "Null Island");
    }
}
