//! Same-calendar-day samples across the configured year range

use crate::models::{DailyRecord, UnitSelection};
use crate::{NeboKrugError, Result};
use chrono::Datelike;
use std::fmt;

/// Why a year is missing from a [`HistoricalSampleSet`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OmissionReason {
    /// The provider request for that year failed
    ProviderError(String),
    /// The provider answered but had no usable values for the day
    MissingData,
    /// The calendar day does not exist that year (Feb 29 outside leap years)
    NoSuchDay,
}

/// A non-fatal note that one year could not be included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialDataWarning {
    pub year: i32,
    pub reason: OmissionReason,
}

impl PartialDataWarning {
    #[must_use]
    pub fn new(year: i32, reason: OmissionReason) -> Self {
        Self { year, reason }
    }
}

impl fmt::Display for PartialDataWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            OmissionReason::ProviderError(message) => {
                write!(f, "{}: request failed ({message})", self.year)
            }
            OmissionReason::MissingData => write!(f, "{}: no data for this day", self.year),
            OmissionReason::NoSuchDay => write!(f, "{}: date does not exist", self.year),
        }
    }
}

/// One record per year for the same month and day, ordered by year
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalSampleSet {
    start_year: i32,
    units: UnitSelection,
    records: Vec<DailyRecord>,
    warnings: Vec<PartialDataWarning>,
}

impl HistoricalSampleSet {
    /// Build a sample set, sorting records by year.
    ///
    /// Fails with `InsufficientData` when records disagree on month/day or
    /// when a year appears twice.
    pub fn new(
        start_year: i32,
        units: UnitSelection,
        mut records: Vec<DailyRecord>,
        mut warnings: Vec<PartialDataWarning>,
    ) -> Result<Self> {
        records.sort_by_key(DailyRecord::date);
        warnings.sort_by_key(|w| w.year);

        if let Some(first) = records.first() {
            let (month, day) = (first.date().month(), first.date().day());
            if let Some(odd) = records
                .iter()
                .find(|r| r.date().month() != month || r.date().day() != day)
            {
                return Err(NeboKrugError::insufficient_data(format!(
                    "historical sample {} does not fall on {month:02}-{day:02}",
                    odd.date()
                )));
            }
        }

        if let Some(pair) = records
            .windows(2)
            .find(|pair| pair[0].date().year() == pair[1].date().year())
        {
            return Err(NeboKrugError::insufficient_data(format!(
                "year {} appears more than once",
                pair[0].date().year()
            )));
        }

        Ok(Self {
            start_year,
            units,
            records,
            warnings,
        })
    }

    #[must_use]
    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    #[must_use]
    pub fn units(&self) -> UnitSelection {
        self.units
    }

    /// Records in ascending year order
    #[must_use]
    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    #[must_use]
    pub fn warnings(&self) -> &[PartialDataWarning] {
        &self.warnings
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.records.iter().map(|r| r.date().year())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(year: i32, month: u32, day: u32) -> DailyRecord {
        DailyRecord::new(
            NaiveDate::from_ymd_opt(year, month, day).unwrap(),
            10.0,
            0.0,
            0.0,
            1.0,
        )
        .unwrap()
    }

    #[test]
    fn test_records_sorted_by_year() {
        let set = HistoricalSampleSet::new(
            1945,
            UnitSelection::default(),
            vec![record(1990, 3, 1), record(1950, 3, 1), record(1970, 3, 1)],
            vec![
                PartialDataWarning::new(1980, OmissionReason::MissingData),
                PartialDataWarning::new(1960, OmissionReason::MissingData),
            ],
        )
        .unwrap();

        assert_eq!(set.years().collect::<Vec<_>>(), vec![1950, 1970, 1990]);
        assert_eq!(set.warnings()[0].year, 1960);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_mixed_days_rejected() {
        let result = HistoricalSampleSet::new(
            1945,
            UnitSelection::default(),
            vec![record(1950, 3, 1), record(1951, 3, 2)],
            Vec::new(),
        );
        assert!(matches!(result, Err(NeboKrugError::InsufficientData { .. })));
    }

    #[test]
    fn test_duplicate_years_rejected() {
        let result = HistoricalSampleSet::new(
            1945,
            UnitSelection::default(),
            vec![record(1950, 3, 1), record(1950, 3, 1)],
            Vec::new(),
        );
        assert!(matches!(result, Err(NeboKrugError::InsufficientData { .. })));
    }

    #[test]
    fn test_empty_set_is_constructible() {
        let set =
            HistoricalSampleSet::new(1945, UnitSelection::default(), Vec::new(), Vec::new())
                .unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_warning_display() {
        let warning =
            PartialDataWarning::new(1962, OmissionReason::ProviderError("HTTP 429".to_string()));
        assert_eq!(warning.to_string(), "1962: request failed (HTTP 429)");
    }
}
