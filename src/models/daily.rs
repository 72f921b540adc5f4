//! Daily aggregate and current-conditions weather records

use super::UnitSelection;
use crate::{NeboKrugError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One calendar day's aggregated weather at a location.
///
/// Values are expressed in whatever [`UnitSelection`](crate::UnitSelection)
/// the record was requested with. Construct through [`DailyRecord::new`],
/// which enforces `temp_min <= temp_max`, non-negative precipitation and
/// wind, and finite values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    date: NaiveDate,
    temp_max: f64,
    temp_min: f64,
    precip_sum: f64,
    wind_max: f64,
}

impl DailyRecord {
    pub fn new(
        date: NaiveDate,
        temp_max: f64,
        temp_min: f64,
        precip_sum: f64,
        wind_max: f64,
    ) -> Result<Self> {
        let values = [temp_max, temp_min, precip_sum, wind_max];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(NeboKrugError::validation(format!(
                "non-finite weather value on {date}"
            )));
        }
        if temp_min > temp_max {
            return Err(NeboKrugError::validation(format!(
                "minimum temperature {temp_min} exceeds maximum {temp_max} on {date}"
            )));
        }
        if precip_sum < 0.0 {
            return Err(NeboKrugError::validation(format!(
                "negative precipitation {precip_sum} on {date}"
            )));
        }
        if wind_max < 0.0 {
            return Err(NeboKrugError::validation(format!(
                "negative wind speed {wind_max} on {date}"
            )));
        }

        Ok(Self {
            date,
            temp_max,
            temp_min,
            precip_sum,
            wind_max,
        })
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[must_use]
    pub fn temp_max(&self) -> f64 {
        self.temp_max
    }

    #[must_use]
    pub fn temp_min(&self) -> f64 {
        self.temp_min
    }

    #[must_use]
    pub fn precip_sum(&self) -> f64 {
        self.precip_sum
    }

    #[must_use]
    pub fn wind_max(&self) -> f64 {
        self.wind_max
    }

    /// One line of the `daily` table, values tagged with `units`
    #[must_use]
    pub fn table_row(&self, units: UnitSelection) -> String {
        let temperature = units.temperature.symbol();
        format!(
            "{}  {:>6.1}{temperature} / {:>6.1}{temperature}  {:>5.1} {:<4}  {:>5.1} {}",
            self.date,
            self.temp_max,
            self.temp_min,
            self.precip_sum,
            units.precipitation.symbol(),
            self.wind_max,
            units.wind_speed.symbol()
        )
    }
}

/// Instantaneous conditions used to build clothing recommendations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// Local time of the observation
    pub time: NaiveDateTime,
    pub apparent_temperature: f64,
    /// Relative humidity in percent
    pub relative_humidity: f64,
    pub rain: f64,
    pub showers: f64,
    pub snowfall: f64,
    pub wind_speed: f64,
    pub wind_gusts: f64,
}

impl CurrentConditions {
    /// Render the single weather line that follows an AI prompt template
    #[must_use]
    pub fn prompt_line(&self) -> String {
        format!(
            "Time: {}, Apparent Temperature: {:.1} celsius, Relative Humidity: {:.0}%, \
             Rain: {:.1} mm, Showers: {:.1} mm, Snowfall: {:.1} mm, \
             Wind Speed: {:.1} ms, Wind Gusts: {:.1} ms",
            self.time.format("%Y-%m-%d %H:%M"),
            self.apparent_temperature,
            self.relative_humidity,
            self.rain,
            self.showers,
            self.snowfall,
            self.wind_speed,
            self.wind_gusts
        )
    }
}
