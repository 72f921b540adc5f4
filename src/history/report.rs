//! Structured comparison result and its text rendering

use crate::models::UnitSelection;
use serde::Serialize;
use std::fmt;

/// A value observed in a particular year
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearValue {
    pub year: i32,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "rank", rename_all = "snake_case")]
pub enum TemperatureHeadline {
    Hottest,
    Coldest,
    NthHottest(usize),
    NthColdest(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureComparison {
    /// 1 when no past year had a higher maximum
    pub max_temp_rank: usize,
    /// 1 when no past year had a lower minimum
    pub min_temp_rank: usize,
    pub headline: TemperatureHeadline,
    pub hottest: YearValue,
    pub coldest: YearValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PrecipitationComparison {
    /// No precipitation today; `last_rain` is the most recent wet year, if any
    Dry { last_rain: Option<YearValue> },
    /// Today's amount exceeds every past year
    Record { today: f64 },
    Wet { today: f64, wettest: YearValue },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "rank", rename_all = "snake_case")]
pub enum WindHeadline {
    Highest,
    NthWindiest(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindComparison {
    pub wind_speed_rank: usize,
    pub headline: WindHeadline,
    pub today: f64,
    pub windiest: YearValue,
    pub calmest: YearValue,
}

/// How today's weather ranks against the same day in past years
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub start_year: i32,
    pub units: UnitSelection,
    pub temperature: TemperatureComparison,
    pub precipitation: PrecipitationComparison,
    pub wind: WindComparison,
}

impl ComparisonReport {
    #[must_use]
    pub fn temperature_section(&self) -> String {
        let t = &self.temperature;
        let symbol = self.units.temperature.symbol();
        let headline = match t.headline {
            TemperatureHeadline::Hottest => {
                format!("Today is the hottest day since {}.", self.start_year)
            }
            TemperatureHeadline::Coldest => {
                format!("Today is the coldest day since {}.", self.start_year)
            }
            TemperatureHeadline::NthHottest(rank) => format!(
                "Today is the {} hottest day since {}.",
                ordinal(rank),
                self.start_year
            ),
            TemperatureHeadline::NthColdest(rank) => format!(
                "Today is the {} coldest day since {}.",
                ordinal(rank),
                self.start_year
            ),
        };
        format!(
            "{headline}\nThe hottest was in {} with {}{symbol}, and the coldest was in {} with {}{symbol}.",
            t.hottest.year,
            one_decimal(t.hottest.value),
            t.coldest.year,
            one_decimal(t.coldest.value),
        )
    }

    #[must_use]
    pub fn precipitation_section(&self) -> String {
        let symbol = self.units.precipitation.symbol();
        match &self.precipitation {
            PrecipitationComparison::Dry {
                last_rain: Some(last),
            } => format!(
                "No precipitation today.\nThe last rain on this date was in {} with {} {symbol}.",
                last.year,
                one_decimal(last.value)
            ),
            PrecipitationComparison::Dry { last_rain: None } => format!(
                "No precipitation today.\nThere has been no rain on record for this date since {}.",
                self.start_year
            ),
            PrecipitationComparison::Record { today } => format!(
                "Today has the highest precipitation on record with {} {symbol}.",
                one_decimal(*today)
            ),
            PrecipitationComparison::Wet { today, wettest } => format!(
                "Today's precipitation is {} {symbol}.\nThe wettest was in {} with {} {symbol}.",
                one_decimal(*today),
                wettest.year,
                one_decimal(wettest.value)
            ),
        }
    }

    #[must_use]
    pub fn wind_section(&self) -> String {
        let w = &self.wind;
        let symbol = self.units.wind_speed.symbol();
        let headline = match w.headline {
            WindHeadline::Highest => format!(
                "Today has the highest wind speed on record with {} {symbol}.",
                one_decimal(w.today)
            ),
            WindHeadline::NthWindiest(rank) => {
                format!("Today is the {} windiest day on record.", ordinal(rank))
            }
        };
        format!(
            "{headline}\nThe windiest was in {} with {} {symbol}, and the calmest was in {} with {} {symbol}.",
            w.windiest.year,
            one_decimal(w.windiest.value),
            w.calmest.year,
            one_decimal(w.calmest.value),
        )
    }

    /// Temperature, precipitation and wind sections in display order
    #[must_use]
    pub fn sections(&self) -> [String; 3] {
        [
            self.temperature_section(),
            self.precipitation_section(),
            self.wind_section(),
        ]
    }
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sections().join("\n\n"))
    }
}

/// English ordinal: 1st, 2nd, 3rd, 4th, 11th, 21st, 112th
#[must_use]
pub fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

fn one_decimal(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    // avoid "-0.0"
    format!("{:.1}", rounded + 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, "1st")]
    #[case(2, "2nd")]
    #[case(3, "3rd")]
    #[case(4, "4th")]
    #[case(11, "11th")]
    #[case(12, "12th")]
    #[case(13, "13th")]
    #[case(21, "21st")]
    #[case(42, "42nd")]
    #[case(111, "111th")]
    fn test_ordinal(#[case] n: usize, #[case] expected: &str) {
        assert_eq!(ordinal(n), expected);
    }

    #[test]
    fn test_one_decimal_rounding() {
        assert_eq!(one_decimal(12.04), "12.0");
        assert_eq!(one_decimal(3.0), "3.0");
        assert_eq!(one_decimal(-0.04), "0.0");
        assert_eq!(one_decimal(-7.26), "-7.3");
    }

    fn sample_report() -> ComparisonReport {
        ComparisonReport {
            start_year: 1945,
            units: UnitSelection::default(),
            temperature: TemperatureComparison {
                max_temp_rank: 3,
                min_temp_rank: 7,
                headline: TemperatureHeadline::NthHottest(3),
                hottest: YearValue {
                    year: 2007,
                    value: 24.3,
                },
                coldest: YearValue {
                    year: 1956,
                    value: -1.2,
                },
            },
            precipitation: PrecipitationComparison::Dry { last_rain: None },
            wind: WindComparison {
                wind_speed_rank: 1,
                headline: WindHeadline::Highest,
                today: 14.0,
                windiest: YearValue {
                    year: 1999,
                    value: 12.5,
                },
                calmest: YearValue {
                    year: 1961,
                    value: 0.8,
                },
            },
        }
    }

    #[test]
    fn test_sections_render() {
        let report = sample_report();
        let [temperature, precipitation, wind] = report.sections();

        assert_eq!(
            temperature,
            "Today is the 3rd hottest day since 1945.\n\
             The hottest was in 2007 with 24.3°C, and the coldest was in 1956 with -1.2°C."
        );
        assert!(precipitation.contains("no rain on record for this date since 1945"));
        assert!(wind.starts_with("Today has the highest wind speed on record with 14.0 m/s."));
        assert!(wind.contains("calmest was in 1961 with 0.8 m/s"));
    }

    #[test]
    fn test_display_joins_sections_with_blank_line() {
        let report = sample_report();
        let text = report.to_string();
        assert_eq!(text.split("\n\n").count(), 3);
        assert!(text.starts_with("Today is the 3rd hottest day since 1945."));
    }

    #[test]
    fn test_wet_day_section() {
        let mut report = sample_report();
        report.precipitation = PrecipitationComparison::Wet {
            today: 2.25,
            wettest: YearValue {
                year: 1972,
                value: 31.0,
            },
        };
        assert_eq!(
            report.precipitation_section(),
            "Today's precipitation is 2.3 mm.\nThe wettest was in 1972 with 31.0 mm."
        );
    }
}
