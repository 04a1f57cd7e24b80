//! Consecutive-day logging streaks

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ActivityLog;

/// Streak information
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreakState {
    /// Consecutive active days ending today (0 if today is inactive)
    pub current: u32,
    /// Longest run of consecutive active days anywhere in the history
    pub longest: u32,
    /// Number of distinct active days
    pub total_logged_days: u32,
    /// First day of the current run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_run_start: Option<NaiveDate>,
    /// Most recent active day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_active_day: Option<NaiveDate>,
}

/// Computes streaks over calendar days in one reference timezone
#[derive(Debug, Clone, Copy)]
pub struct StreakTracker {
    timezone: FixedOffset,
}

impl StreakTracker {
    pub fn new(timezone: FixedOffset) -> Self {
        Self { timezone }
    }

    /// Calendar day of a timestamp in the reference timezone
    pub fn local_day(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.timezone).date_naive()
    }

    /// Normalize activity timestamps to a deduplicated, sorted day set
    pub fn active_days(&self, logs: &[ActivityLog]) -> BTreeSet<NaiveDate> {
        logs.iter().map(|log| self.local_day(log.occurred_at)).collect()
    }

    /// Compute the streak state for a set of active days.
    ///
    /// Input order and duplicates do not matter.
    pub fn calculate<I>(&self, days: I, today: NaiveDate) -> StreakState
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let days: BTreeSet<NaiveDate> = days.into_iter().collect();

        if days.is_empty() {
            return StreakState::default();
        }

        // Longest: single ascending scan
        let mut longest = 0u32;
        let mut run = 0u32;
        let mut prev: Option<NaiveDate> = None;
        for &day in &days {
            run = match prev {
                Some(p) if day - p == Duration::days(1) => run + 1,
                _ => 1,
            };
            longest = longest.max(run);
            prev = Some(day);
        }

        // Current: walk back from today until the first missing day
        let mut current = 0u32;
        let mut check = today;
        let mut current_run_start = None;
        while days.contains(&check) {
            current += 1;
            current_run_start = Some(check);
            check -= Duration::days(1);
        }

        StreakState {
            current,
            longest,
            total_logged_days: days.len() as u32,
            current_run_start,
            last_active_day: days.iter().next_back().copied(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActivityKind;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tracker() -> StreakTracker {
        StreakTracker::new(FixedOffset::east_opt(0).unwrap())
    }

    fn run(start: NaiveDate, n: i64) -> Vec<NaiveDate> {
        (0..n).map(|i| start + Duration::days(i)).collect()
    }

    #[test]
    fn test_streak_empty() {
        let streak = tracker().calculate(Vec::new(), date(2026, 1, 1));
        assert_eq!(streak, StreakState::default());
        assert_eq!(streak.current, 0);
        assert_eq!(streak.longest, 0);
        assert_eq!(streak.total_logged_days, 0);
    }

    #[test]
    fn test_single_day_today() {
        let today = date(2026, 1, 1);
        let streak = tracker().calculate(vec![today], today);
        assert_eq!(streak.current, 1);
        assert_eq!(streak.longest, 1);
        assert_eq!(streak.total_logged_days, 1);
        assert_eq!(streak.current_run_start, Some(today));
    }

    #[test]
    fn test_consecutive_run() {
        let start = date(2026, 1, 1);
        let days = run(start, 10);
        let streak = tracker().calculate(days, date(2026, 1, 10));
        assert_eq!(streak.longest, 10);
        assert_eq!(streak.current, 10);
        assert_eq!(streak.current_run_start, Some(start));
    }

    #[test]
    fn test_gap_splits_run() {
        let start = date(2026, 1, 1);
        let mut days = run(start, 10);
        days.remove(4); // drop Jan 5
        let streak = tracker().calculate(days, date(2026, 1, 10));
        assert_eq!(streak.longest, 5);
        assert!(streak.longest < 10);
        assert_eq!(streak.current, 5);
        assert_eq!(streak.total_logged_days, 9);
    }

    #[test]
    fn test_today_missing_breaks_current() {
        let days = run(date(2026, 1, 1), 5);
        let streak = tracker().calculate(days, date(2026, 1, 6));
        assert_eq!(streak.current, 0);
        assert_eq!(streak.longest, 5);
        assert_eq!(streak.current_run_start, None);
        assert_eq!(streak.last_active_day, Some(date(2026, 1, 5)));
    }

    #[test]
    fn test_unsorted_and_duplicate_input() {
        let today = date(2026, 1, 3);
        let days = vec![
            date(2026, 1, 3),
            date(2026, 1, 1),
            date(2026, 1, 2),
            date(2026, 1, 2),
            date(2026, 1, 3),
        ];
        let streak = tracker().calculate(days, today);
        assert_eq!(streak.current, 3);
        assert_eq!(streak.longest, 3);
        assert_eq!(streak.total_logged_days, 3);
    }

    #[test]
    fn test_active_days_normalize_timezone() {
        // 23:30 UTC on Jan 1 is already Jan 2 at UTC+2
        let logs = vec![
            ActivityLog {
                kind: ActivityKind::Journal,
                occurred_at: Utc.with_ymd_and_hms(2026, 1, 1, 23, 30, 0).unwrap(),
            },
            ActivityLog {
                kind: ActivityKind::Breathing,
                occurred_at: Utc.with_ymd_and_hms(2026, 1, 2, 8, 0, 0).unwrap(),
            },
        ];

        let utc_days = tracker().active_days(&logs);
        assert_eq!(utc_days.len(), 2);

        let plus_two = StreakTracker::new(FixedOffset::east_opt(2 * 3600).unwrap());
        let local_days = plus_two.active_days(&logs);
        assert_eq!(local_days.len(), 1);
        assert!(local_days.contains(&date(2026, 1, 2)));
    }
}
