//! Ranks today's record against the same calendar day in past years
//!
//! Ranks are competition ranks where a tie shares the better place: today is
//! 1st when no past year was strictly more extreme. Extremes are taken from a
//! stable pass over the year-ordered records, so ties resolve to the earliest
//! year.

use super::report::{
    ComparisonReport, PrecipitationComparison, TemperatureComparison, TemperatureHeadline,
    WindComparison, WindHeadline, YearValue,
};
use super::sample_set::HistoricalSampleSet;
use crate::models::DailyRecord;
use crate::{NeboKrugError, Result};
use chrono::Datelike;
use tracing::debug;

/// Compare today's record against a historical sample set.
///
/// Fails with `InsufficientData` when the set is empty.
pub fn compare(today: &DailyRecord, history: &HistoricalSampleSet) -> Result<ComparisonReport> {
    let records = history.records();
    let insufficient = || {
        NeboKrugError::insufficient_data(format!(
            "no historical records for {} to compare against",
            today.date().format("%B %-d")
        ))
    };
    if records.is_empty() {
        return Err(insufficient());
    }

    let temperature = compare_temperature(today, records).ok_or_else(insufficient)?;
    let precipitation = compare_precipitation(today, records).ok_or_else(insufficient)?;
    let wind = compare_wind(today, records).ok_or_else(insufficient)?;

    debug!(
        "Compared {} against {} years: max rank {}, min rank {}, wind rank {}",
        today.date(),
        records.len(),
        temperature.max_temp_rank,
        temperature.min_temp_rank,
        wind.wind_speed_rank
    );

    Ok(ComparisonReport {
        start_year: history.start_year(),
        units: history.units(),
        temperature,
        precipitation,
        wind,
    })
}

fn compare_temperature(
    today: &DailyRecord,
    records: &[DailyRecord],
) -> Option<TemperatureComparison> {
    let max_temp_rank = rank(records, |r| r.temp_max() > today.temp_max());
    let min_temp_rank = rank(records, |r| r.temp_min() < today.temp_min());

    let headline = if max_temp_rank == 1 {
        TemperatureHeadline::Hottest
    } else if min_temp_rank == 1 {
        TemperatureHeadline::Coldest
    // the smaller rank is the more notable one; hottest wins equal ranks
    } else if max_temp_rank <= min_temp_rank {
        TemperatureHeadline::NthHottest(max_temp_rank)
    } else {
        TemperatureHeadline::NthColdest(min_temp_rank)
    };

    Some(TemperatureComparison {
        max_temp_rank,
        min_temp_rank,
        headline,
        hottest: earliest_extreme(records, DailyRecord::temp_max, |a, b| a > b)?,
        coldest: earliest_extreme(records, DailyRecord::temp_min, |a, b| a < b)?,
    })
}

fn compare_precipitation(
    today: &DailyRecord,
    records: &[DailyRecord],
) -> Option<PrecipitationComparison> {
    if today.precip_sum() <= 0.0 {
        let last_rain = records
            .iter()
            .rev()
            .find(|r| r.precip_sum() > 0.0)
            .map(|r| year_value(r, r.precip_sum()));
        return Some(PrecipitationComparison::Dry { last_rain });
    }

    let wettest = earliest_extreme(records, DailyRecord::precip_sum, |a, b| a > b)?;
    if today.precip_sum() > wettest.value {
        Some(PrecipitationComparison::Record {
            today: today.precip_sum(),
        })
    } else {
        Some(PrecipitationComparison::Wet {
            today: today.precip_sum(),
            wettest,
        })
    }
}

fn compare_wind(today: &DailyRecord, records: &[DailyRecord]) -> Option<WindComparison> {
    let wind_speed_rank = rank(records, |r| r.wind_max() > today.wind_max());
    let headline = if wind_speed_rank == 1 {
        WindHeadline::Highest
    } else {
        WindHeadline::NthWindiest(wind_speed_rank)
    };

    Some(WindComparison {
        wind_speed_rank,
        headline,
        today: today.wind_max(),
        windiest: earliest_extreme(records, DailyRecord::wind_max, |a, b| a > b)?,
        calmest: earliest_extreme(records, DailyRecord::wind_max, |a, b| a < b)?,
    })
}

/// 1 + number of past years that beat today
fn rank(records: &[DailyRecord], beats_today: impl Fn(&DailyRecord) -> bool) -> usize {
    1 + records.iter().filter(|r| beats_today(r)).count()
}

/// The first record (in year order) whose value no later record strictly beats
fn earliest_extreme(
    records: &[DailyRecord],
    value: impl Fn(&DailyRecord) -> f64,
    beats: impl Fn(f64, f64) -> bool,
) -> Option<YearValue> {
    let (first, rest) = records.split_first()?;
    let best = rest.iter().fold(first, |best, candidate| {
        if beats(value(candidate), value(best)) {
            candidate
        } else {
            best
        }
    });
    Some(year_value(best, value(best)))
}

fn year_value(record: &DailyRecord, value: f64) -> YearValue {
    YearValue {
        year: record.date().year(),
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UnitSelection;
    use chrono::NaiveDate;

    fn record(year: i32, temp_max: f64, temp_min: f64, precip: f64, wind: f64) -> DailyRecord {
        DailyRecord::new(
            NaiveDate::from_ymd_opt(year, 3, 15).unwrap(),
            temp_max,
            temp_min,
            precip,
            wind,
        )
        .unwrap()
    }

    fn history(records: Vec<DailyRecord>) -> HistoricalSampleSet {
        HistoricalSampleSet::new(1945, UnitSelection::default(), records, Vec::new()).unwrap()
    }

    fn varied_history() -> HistoricalSampleSet {
        history(vec![
            record(1950, 10.0, 1.0, 0.0, 4.0),
            record(1960, 14.0, 3.0, 2.5, 9.0),
            record(1970, 8.0, -2.0, 0.0, 2.0),
            record(1980, 12.0, 0.5, 6.0, 6.0),
            record(1990, 16.0, 5.0, 0.4, 11.0),
        ])
    }

    #[test]
    fn test_today_above_all_maxima_is_hottest() {
        let today = record(2024, 20.0, 4.0, 0.0, 5.0);
        let report = compare(&today, &varied_history()).unwrap();

        assert_eq!(report.temperature.max_temp_rank, 1);
        assert_eq!(report.temperature.headline, TemperatureHeadline::Hottest);
        assert!(report.temperature_section().starts_with("Today is the hottest day since 1945."));
    }

    #[test]
    fn test_today_below_all_minima_is_coldest() {
        let today = record(2024, 9.0, -5.0, 0.0, 5.0);
        let report = compare(&today, &varied_history()).unwrap();

        assert_eq!(report.temperature.min_temp_rank, 1);
        assert_eq!(report.temperature.headline, TemperatureHeadline::Coldest);
        assert!(report.temperature_section().starts_with("Today is the coldest day since 1945."));
    }

    #[test]
    fn test_smaller_rank_selects_headline() {
        // max rank 2 (only 1990 hotter), min rank 4
        let today = record(2024, 15.0, 2.0, 0.0, 5.0);
        let report = compare(&today, &varied_history()).unwrap();
        assert_eq!(report.temperature.max_temp_rank, 2);
        assert_eq!(report.temperature.min_temp_rank, 4);
        assert_eq!(report.temperature.headline, TemperatureHeadline::NthHottest(2));

        // max rank 5, min rank 2 (only 1970 colder)
        let today = record(2024, 9.0, -1.0, 0.0, 5.0);
        let report = compare(&today, &varied_history()).unwrap();
        assert_eq!(report.temperature.max_temp_rank, 5);
        assert_eq!(report.temperature.min_temp_rank, 2);
        assert_eq!(report.temperature.headline, TemperatureHeadline::NthColdest(2));
        assert!(report.temperature_section().starts_with("Today is the 2nd coldest day since 1945."));
    }

    #[test]
    fn test_equal_ranks_prefer_hottest() {
        let history = history(vec![
            record(1950, 20.0, -3.0, 0.0, 1.0),
            record(1960, 5.0, 4.0, 0.0, 1.0),
        ]);
        let today = record(2024, 10.0, 0.0, 0.0, 1.0);
        let report = compare(&today, &history).unwrap();
        assert_eq!(report.temperature.max_temp_rank, 2);
        assert_eq!(report.temperature.min_temp_rank, 2);
        assert_eq!(report.temperature.headline, TemperatureHeadline::NthHottest(2));
    }

    #[test]
    fn test_dry_day_reports_most_recent_rain() {
        let today = record(2024, 11.0, 2.0, 0.0, 5.0);
        let report = compare(&today, &varied_history()).unwrap();
        assert_eq!(
            report.precipitation,
            PrecipitationComparison::Dry {
                last_rain: Some(YearValue {
                    year: 1990,
                    value: 0.4
                })
            }
        );
    }

    #[test]
    fn test_dry_day_without_any_rain() {
        let history = history(vec![
            record(1950, 10.0, 1.0, 0.0, 4.0),
            record(1951, 12.0, 2.0, 0.0, 3.0),
        ]);
        let today = record(2024, 11.0, 2.0, 0.0, 5.0);
        let report = compare(&today, &history).unwrap();

        assert_eq!(report.precipitation, PrecipitationComparison::Dry { last_rain: None });
        assert!(report.precipitation_section().contains("since 1945"));
    }

    #[test]
    fn test_record_precipitation() {
        let today = record(2024, 11.0, 2.0, 7.5, 5.0);
        let report = compare(&today, &varied_history()).unwrap();
        assert_eq!(report.precipitation, PrecipitationComparison::Record { today: 7.5 });
        assert!(report.precipitation_section().contains("highest precipitation on record"));
    }

    #[test]
    fn test_wet_day_names_wettest_year() {
        let today = record(2024, 11.0, 2.0, 1.0, 5.0);
        let report = compare(&today, &varied_history()).unwrap();
        assert_eq!(
            report.precipitation,
            PrecipitationComparison::Wet {
                today: 1.0,
                wettest: YearValue {
                    year: 1980,
                    value: 6.0
                }
            }
        );
    }

    #[test]
    fn test_wind_ranks() {
        let report = compare(&record(2024, 11.0, 2.0, 0.0, 12.0), &varied_history()).unwrap();
        assert_eq!(report.wind.wind_speed_rank, 1);
        assert_eq!(report.wind.headline, WindHeadline::Highest);

        let report = compare(&record(2024, 11.0, 2.0, 0.0, 5.0), &varied_history()).unwrap();
        assert_eq!(report.wind.wind_speed_rank, 4);
        assert_eq!(report.wind.headline, WindHeadline::NthWindiest(4));
        assert_eq!(report.wind.windiest.year, 1990);
        assert_eq!(report.wind.calmest.year, 1970);
        assert!(report.wind_section().starts_with("Today is the 4th windiest day on record."));
    }

    #[test]
    fn test_ties_resolve_to_earliest_year() {
        let history = history(vec![
            record(1950, 12.0, -1.0, 3.0, 5.0),
            record(1960, 12.0, -1.0, 3.0, 5.0),
            record(1970, 12.0, -1.0, 3.0, 5.0),
        ]);
        let today = record(2024, 11.0, 0.0, 1.0, 4.0);
        let report = compare(&today, &history).unwrap();

        assert_eq!(report.temperature.hottest.year, 1950);
        assert_eq!(report.temperature.coldest.year, 1950);
        assert_eq!(report.wind.windiest.year, 1950);
        assert_eq!(report.wind.calmest.year, 1950);
        match report.precipitation {
            PrecipitationComparison::Wet { wettest, .. } => assert_eq!(wettest.year, 1950),
            other => panic!("unexpected precipitation summary: {other:?}"),
        }
    }

    #[test]
    fn test_ranks_stay_within_bounds() {
        let history = varied_history();
        let n = history.len();
        for max in [-10.0, 8.0, 12.0, 16.0, 30.0] {
            for wind in [0.0, 6.0, 20.0] {
                let today = record(2024, max, max - 5.0, 0.0, wind);
                let report = compare(&today, &history).unwrap();
                assert!((1..=n + 1).contains(&report.temperature.max_temp_rank));
                assert!((1..=n + 1).contains(&report.temperature.min_temp_rank));
                assert!((1..=n + 1).contains(&report.wind.wind_speed_rank));
            }
        }
    }

    #[test]
    fn test_compare_is_deterministic() {
        let today = record(2024, 13.0, 1.0, 0.3, 7.0);
        let history = varied_history();
        let first = compare(&today, &history).unwrap();
        let second = compare(&today, &history).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.to_string(), second.to_string());
    }

    #[test]
    fn test_empty_history_is_insufficient() {
        let today = record(2024, 13.0, 1.0, 0.3, 7.0);
        let result = compare(&today, &history(Vec::new()));
        assert!(matches!(result, Err(NeboKrugError::InsufficientData { .. })));
    }

    #[test]
    fn test_two_year_scenario() {
        let history = history(vec![
            record(1950, 10.0, 2.0, 0.0, 5.0),
            record(1951, 12.0, 1.0, 3.0, 7.0),
        ]);
        let today = record(2024, 12.0, 4.0, 0.0, 6.0);
        let report = compare(&today, &history).unwrap();

        assert_eq!(report.temperature.max_temp_rank, 1);
        assert_eq!(report.temperature.headline, TemperatureHeadline::Hottest);
        assert_eq!(report.temperature.hottest.year, 1951);
        assert_eq!(report.temperature.coldest.year, 1951);
        assert_eq!(report.wind.wind_speed_rank, 2);
        assert_eq!(report.wind.windiest.year, 1951);
        assert_eq!(report.wind.calmest.year, 1950);

        let text = report.to_string();
        assert!(text.contains("hottest day since 1945"));
        assert!(text.contains("last rain on this date was in 1951 with 3.0"));
        assert!(text.contains("2nd windiest"));
    }

    #[test]
    fn test_tied_extremes_scenario() {
        let history = history(vec![
            record(1950, 10.0, -2.0, 0.0, 5.0),
            record(1951, 12.0, 0.0, 3.0, 8.0),
        ]);
        let today = record(2024, 12.0, -2.0, 0.0, 8.0);
        let report = compare(&today, &history).unwrap();

        assert_eq!(report.temperature.max_temp_rank, 1);
        assert_eq!(report.temperature.headline, TemperatureHeadline::Hottest);
        assert_eq!(report.temperature.hottest, YearValue { year: 1951, value: 12.0 });
        assert_eq!(report.temperature.coldest, YearValue { year: 1950, value: -2.0 });
        assert_eq!(report.wind.wind_speed_rank, 1);
        assert_eq!(report.wind.headline, WindHeadline::Highest);
        assert_eq!(report.wind.windiest.year, 1951);

        let text = report.to_string();
        assert!(text.contains("hottest day since 1945"));
        assert!(text.contains("last rain on this date was in 1951 with 3.0"));
        assert!(text.contains("highest wind speed on record"));
    }

    #[test]
    fn test_hottest_checked_before_coldest() {
        let history = history(vec![record(1990, 7.0, 7.0, 0.0, 1.0)]);
        let today = record(2024, 7.0, 7.0, 0.0, 1.0);
        let report = compare(&today, &history).unwrap();

        assert_eq!(report.temperature.max_temp_rank, 1);
        assert_eq!(report.temperature.min_temp_rank, 1);
        assert_eq!(report.temperature.headline, TemperatureHeadline::Hottest);
    }

    #[test]
    fn test_max_rank_monotonic_in_today_max() {
        let history = varied_history();
        let mut previous = 0;
        for tenths in (-50..=250).rev() {
            let max = f64::from(tenths) / 10.0;
            let today = record(2024, max, max - 1.0, 0.0, 1.0);
            let rank = compare(&today, &history).unwrap().temperature.max_temp_rank;
            assert!(rank >= previous);
            let at_least_all = history.records().iter().all(|r| max >= r.temp_max());
            assert_eq!(rank == 1, at_least_all);
            previous = rank;
        }
    }

    #[test]
    fn test_single_year_history() {
        let history = history(vec![record(1990, 10.0, 0.0, 0.0, 3.0)]);
        let today = record(2024, 9.0, 1.0, 0.0, 3.0);
        let report = compare(&today, &history).unwrap();

        assert_eq!(report.temperature.max_temp_rank, 2);
        assert_eq!(report.temperature.min_temp_rank, 2);
        assert_eq!(report.temperature.hottest.year, 1990);
        assert_eq!(report.wind.wind_speed_rank, 1);
    }
}
