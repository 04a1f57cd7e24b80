//! Distribution, period rollups, and time-of-day statistics

use std::collections::BTreeMap;

use chrono::{FixedOffset, Timelike};
use serde::{Deserialize, Serialize};

use crate::models::{AnalysisWindow, Granularity, MoodRecord};

/// Fixed value ranges for the distribution, covering 1..=10
pub const DISTRIBUTION_RANGES: [(i32, i32); 5] = [(1, 2), (3, 4), (5, 6), (7, 8), (9, 10)];

/// Count of records falling in one value range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionBucket {
    pub low: i32,
    pub high: i32,
    pub count: usize,
    /// Share of all records, rounded to a whole percent
    pub percentage: u32,
}

impl DistributionBucket {
    pub fn contains(&self, value: i32) -> bool {
        value >= self.low && value <= self.high
    }

    /// Range label such as "3-4"
    pub fn label(&self) -> String {
        format!("{}-{}", self.low, self.high)
    }
}

/// Aggregate of the records in one day/week/month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRollup {
    pub period_key: String,
    pub average: f64,
    pub count: usize,
    pub high: i32,
    pub low: i32,
}

/// Average mood of the records logged during one hour of the day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeOfDayBucket {
    pub hour: u32,
    /// Rounded to one decimal for display
    pub average_value: f64,
    pub count: usize,
    #[serde(default)]
    pub value_sum: i64,
}

impl TimeOfDayBucket {
    /// Unrounded mean of the hour's values
    pub fn mean(&self) -> f64 {
        exact_mean(self.value_sum, self.count)
    }
}

/// Raw totals over the whole window
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Summary {
    pub total_entries: usize,
    /// Rounded to one decimal for display
    pub average_value: f64,
    #[serde(default)]
    pub value_sum: i64,
    /// 0 when there are no entries
    pub highest_value: i32,
    /// 0 when there are no entries
    pub lowest_value: i32,
}

impl Summary {
    /// Unrounded mean, used for threshold checks
    pub fn mean(&self) -> f64 {
        exact_mean(self.value_sum, self.total_entries)
    }
}

/// Everything the statistics calculator derives from a record set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub distribution: Vec<DistributionBucket>,
    pub granularity: Granularity,
    pub period_rollups: Vec<PeriodRollup>,
    pub time_of_day: Vec<TimeOfDayBucket>,
    pub summary: Summary,
}

/// Round to one decimal place
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn exact_mean(sum: i64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

/// Stateless calculator; holds only the caller's presentation choices
#[derive(Debug, Clone, Copy)]
pub struct StatisticsCalculator {
    granularity: Granularity,
    timezone: FixedOffset,
}

impl StatisticsCalculator {
    pub fn new(granularity: Granularity, timezone: FixedOffset) -> Self {
        Self {
            granularity,
            timezone,
        }
    }

    /// Compute all statistics for the records inside `window`.
    ///
    /// Records whose `occurred_on` falls outside the window are ignored.
    pub fn calculate(&self, records: &[MoodRecord], window: &AnalysisWindow) -> Statistics {
        let in_window: Vec<&MoodRecord> = records
            .iter()
            .filter(|r| window.contains(r.occurred_on))
            .collect();

        Statistics {
            distribution: distribution(&in_window),
            granularity: self.granularity,
            period_rollups: period_rollups(&in_window, self.granularity),
            time_of_day: time_of_day(&in_window, self.timezone),
            summary: summarize(&in_window),
        }
    }
}

/// Partition records into the five fixed value ranges.
///
/// Counts always sum to the input size. With no records every percentage
/// is 0.
pub fn distribution(records: &[&MoodRecord]) -> Vec<DistributionBucket> {
    let total = records.len();

    DISTRIBUTION_RANGES
        .iter()
        .map(|&(low, high)| {
            let count = records
                .iter()
                .filter(|r| r.value >= low && r.value <= high)
                .count();
            let percentage = if total > 0 {
                ((count as f64 / total as f64) * 100.0).round() as u32
            } else {
                0
            };
            DistributionBucket {
                low,
                high,
                count,
                percentage,
            }
        })
        .collect()
}

/// Group by the period containing each record's `occurred_on`
pub fn period_rollups(records: &[&MoodRecord], granularity: Granularity) -> Vec<PeriodRollup> {
    let mut groups: BTreeMap<String, Vec<i32>> = BTreeMap::new();
    for record in records {
        groups
            .entry(granularity.period_key(record.occurred_on))
            .or_default()
            .push(record.value);
    }

    groups
        .into_iter()
        .filter_map(|(period_key, values)| {
            let high = *values.iter().max()?;
            let low = *values.iter().min()?;
            let sum: i32 = values.iter().sum();
            Some(PeriodRollup {
                period_key,
                average: round1(f64::from(sum) / values.len() as f64),
                count: values.len(),
                high,
                low,
            })
        })
        .collect()
}

/// Group by the local hour of `logged_at`; hours without data are omitted
pub fn time_of_day(records: &[&MoodRecord], timezone: FixedOffset) -> Vec<TimeOfDayBucket> {
    let mut by_hour: BTreeMap<u32, (i64, usize)> = BTreeMap::new();
    for record in records {
        let hour = record.logged_at.with_timezone(&timezone).hour();
        let entry = by_hour.entry(hour).or_insert((0, 0));
        entry.0 += i64::from(record.value);
        entry.1 += 1;
    }

    by_hour
        .into_iter()
        .map(|(hour, (sum, count))| TimeOfDayBucket {
            hour,
            average_value: round1(exact_mean(sum, count)),
            count,
            value_sum: sum,
        })
        .collect()
}

/// Totals, mean, and extremes
pub fn summarize(records: &[&MoodRecord]) -> Summary {
    if records.is_empty() {
        return Summary::default();
    }

    let sum: i64 = records.iter().map(|r| i64::from(r.value)).sum();
    Summary {
        total_entries: records.len(),
        average_value: round1(exact_mean(sum, records.len())),
        value_sum: sum,
        highest_value: records.iter().map(|r| r.value).max().unwrap_or(0),
        lowest_value: records.iter().map(|r| r.value).min().unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate, TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record_at(value: i32, on: NaiveDate, hour: u32) -> MoodRecord {
        MoodRecord {
            id: format!("r-{}-{}", on, hour),
            user_id: "u1".to_string(),
            value,
            note: None,
            occurred_on: on,
            logged_at: Utc
                .with_ymd_and_hms(on.year(), on.month(), on.day(), hour, 0, 0)
                .unwrap(),
        }
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_distribution_counts_sum_to_total() {
        let records: Vec<MoodRecord> = (1..=10)
            .map(|v| record_at(v, date(2026, 1, v as u32), 9))
            .collect();
        let refs: Vec<&MoodRecord> = records.iter().collect();

        let buckets = distribution(&refs);
        assert_eq!(buckets.len(), 5);
        assert_eq!(buckets.iter().map(|b| b.count).sum::<usize>(), 10);
        assert!(buckets.iter().all(|b| b.count == 2 && b.percentage == 20));
        assert_eq!(buckets[1].label(), "3-4");
    }

    #[test]
    fn test_distribution_rounding() {
        // 1/3 each across three buckets: 33 + 33 + 33 = 99
        let records = vec![
            record_at(1, date(2026, 1, 1), 9),
            record_at(5, date(2026, 1, 2), 9),
            record_at(9, date(2026, 1, 3), 9),
        ];
        let refs: Vec<&MoodRecord> = records.iter().collect();

        let buckets = distribution(&refs);
        let total_pct: u32 = buckets.iter().map(|b| b.percentage).sum();
        assert_eq!(total_pct, 99);
        assert!(buckets.iter().all(|b| b.percentage <= 100));
    }

    #[test]
    fn test_distribution_empty() {
        let buckets = distribution(&[]);
        assert_eq!(buckets.len(), 5);
        assert!(buckets.iter().all(|b| b.count == 0 && b.percentage == 0));
    }

    #[test]
    fn test_period_rollups_weekly() {
        // 2026-10-12 is a Monday; 10-19 starts the next ISO week
        let records = vec![
            record_at(4, date(2026, 10, 12), 9),
            record_at(7, date(2026, 10, 14), 9),
            record_at(8, date(2026, 10, 18), 9),
            record_at(2, date(2026, 10, 19), 9),
        ];
        let refs: Vec<&MoodRecord> = records.iter().collect();

        let rollups = period_rollups(&refs, Granularity::Week);
        assert_eq!(rollups.len(), 2);
        assert_eq!(rollups[0].period_key, "2026-W42");
        assert_eq!(rollups[0].count, 3);
        assert_eq!(rollups[0].average, 6.3);
        assert_eq!(rollups[0].high, 8);
        assert_eq!(rollups[0].low, 4);
        assert_eq!(rollups[1].period_key, "2026-W43");
        assert_eq!(rollups[1].average, 2.0);
    }

    #[test]
    fn test_period_rollups_use_occurred_on() {
        // Logged just after midnight on the 2nd, but describes the 1st
        let mut r = record_at(6, date(2026, 3, 1), 0);
        r.logged_at = Utc.with_ymd_and_hms(2026, 3, 2, 0, 30, 0).unwrap();
        let rollups = period_rollups(&[&r], Granularity::Day);
        assert_eq!(rollups[0].period_key, "2026-03-01");
    }

    #[test]
    fn test_time_of_day_omits_empty_hours() {
        let records = vec![
            record_at(4, date(2026, 1, 1), 8),
            record_at(6, date(2026, 1, 2), 8),
            record_at(9, date(2026, 1, 3), 21),
        ];
        let refs: Vec<&MoodRecord> = records.iter().collect();

        let buckets = time_of_day(&refs, utc());
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].hour, 8);
        assert_eq!(buckets[0].average_value, 5.0);
        assert_eq!(buckets[0].count, 2);
        assert_eq!(buckets[1].hour, 21);
    }

    #[test]
    fn test_time_of_day_respects_timezone() {
        let r = record_at(5, date(2026, 1, 1), 23);
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let buckets = time_of_day(&[&r], plus_two);
        assert_eq!(buckets[0].hour, 1);
    }

    #[test]
    fn test_calculate_filters_to_window() {
        let records = vec![
            record_at(2, date(2026, 1, 1), 9),
            record_at(9, date(2026, 1, 10), 9),
        ];
        let window = AnalysisWindow::new(date(2026, 1, 5), date(2026, 1, 31)).unwrap();

        let stats = StatisticsCalculator::new(Granularity::Month, utc()).calculate(&records, &window);
        assert_eq!(stats.summary.total_entries, 1);
        assert_eq!(stats.summary.average_value, 9.0);
        assert_eq!(stats.summary.highest_value, 9);
        assert_eq!(stats.summary.lowest_value, 9);
        assert_eq!(stats.period_rollups.len(), 1);
    }

    #[test]
    fn test_summary_keeps_exact_mean() {
        let mut records = vec![record_at(4, date(2026, 1, 1), 9)];
        for day in 2..=25 {
            records.push(record_at(3, date(2026, 1, day), 9));
        }
        let refs: Vec<&MoodRecord> = records.iter().collect();

        let summary = summarize(&refs);
        assert_eq!(summary.average_value, 3.0);
        assert_eq!(summary.value_sum, 76);
        assert!((summary.mean() - 3.04).abs() < 1e-9);

        let buckets = time_of_day(&refs, utc());
        assert!((buckets[0].mean() - 3.04).abs() < 1e-9);
        assert_eq!(Summary::default().mean(), 0.0);
    }

    #[test]
    fn test_empty_statistics() {
        let window = AnalysisWindow::new(date(2026, 1, 1), date(2026, 1, 31)).unwrap();
        let stats = StatisticsCalculator::new(Granularity::Week, utc()).calculate(&[], &window);

        assert_eq!(stats.summary, Summary::default());
        assert!(stats.period_rollups.is_empty());
        assert!(stats.time_of_day.is_empty());
        assert_eq!(stats.distribution.len(), 5);
    }
}
