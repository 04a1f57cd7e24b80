//! Input records and shared value types

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Lowest mood value a record may carry
pub const MIN_MOOD_VALUE: i32 = 1;
/// Highest mood value a record may carry
pub const MAX_MOOD_VALUE: i32 = 10;

/// A single self-reported mood entry.
///
/// `occurred_on` is the calendar day the mood describes; `logged_at` is the
/// moment the user actually recorded it. Statistics keyed by period use the
/// former, time-of-day statistics use the latter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodRecord {
    pub id: String,
    pub user_id: String,
    pub value: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub occurred_on: NaiveDate,
    pub logged_at: DateTime<Utc>,
}

impl MoodRecord {
    /// Check the record's own invariants (value range, non-empty ids)
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::InvalidRecord {
                id: self.id.clone(),
                reason: "record id is empty".to_string(),
            });
        }
        if self.user_id.trim().is_empty() {
            return Err(Error::InvalidRecord {
                id: self.id.clone(),
                reason: "user id is empty".to_string(),
            });
        }
        if !(MIN_MOOD_VALUE..=MAX_MOOD_VALUE).contains(&self.value) {
            return Err(Error::InvalidRecord {
                id: self.id.clone(),
                reason: format!(
                    "value {} is outside {}..={}",
                    self.value, MIN_MOOD_VALUE, MAX_MOOD_VALUE
                ),
            });
        }
        Ok(())
    }
}

/// Validate a user's record set before analysis.
///
/// Every record must be valid on its own, belong to `user_id`, and no two
/// records may share an `occurred_on` date. Violations are returned as
/// errors instead of being repaired so upstream bugs stay visible.
pub fn validate_records(user_id: &str, records: &[MoodRecord]) -> Result<()> {
    let mut seen = HashSet::with_capacity(records.len());

    for record in records {
        record.validate()?;

        if record.user_id != user_id {
            return Err(Error::UserMismatch {
                id: record.id.clone(),
                expected: user_id.to_string(),
                found: record.user_id.clone(),
            });
        }

        if !seen.insert(record.occurred_on) {
            return Err(Error::DuplicateDate {
                user_id: user_id.to_string(),
                date: record.occurred_on,
            });
        }
    }

    Ok(())
}

/// Inclusive calendar-date range to analyze
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl AnalysisWindow {
    /// Create a window, rejecting `end < start`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(Error::InvalidWindow(format!(
                "end {} is before start {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// The last `days` calendar days ending at (and including) `today`
    pub fn last_days(days: u32, today: NaiveDate) -> Result<Self> {
        if days == 0 {
            return Err(Error::InvalidWindow(
                "window must cover at least one day".to_string(),
            ));
        }
        let start = today - Duration::days(i64::from(days) - 1);
        Self::new(start, today)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of calendar days covered
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Period size for rollups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Day,
    Week,
    Month,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    /// Locale-neutral period key for a date.
    ///
    /// Day: `2026-10-18`, week: ISO week `2026-W42`, month: `2026-10`.
    /// Keys sort lexically in chronological order.
    pub fn period_key(&self, date: NaiveDate) -> String {
        match self {
            Self::Day => date.format("%Y-%m-%d").to_string(),
            Self::Week => {
                let week = date.iso_week();
                format!("{:04}-W{:02}", week.year(), week.week())
            }
            Self::Month => format!("{:04}-{:02}", date.year(), date.month()),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" | "daily" => Ok(Self::Day),
            "week" | "weekly" => Ok(Self::Week),
            "month" | "monthly" => Ok(Self::Month),
            _ => Err(format!(
                "Unknown granularity: {} (valid: day, week, month)",
                s
            )),
        }
    }
}

/// Kinds of tracked activity that count toward a streak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Mood,
    Journal,
    Breathing,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mood => "mood",
            Self::Journal => "journal",
            Self::Breathing => "breathing",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mood" => Ok(Self::Mood),
            "journal" => Ok(Self::Journal),
            "breathing" => Ok(Self::Breathing),
            _ => Err(format!("Unknown activity kind: {}", s)),
        }
    }
}

/// "Something was logged at this moment" signal from any tracked record type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLog {
    pub kind: ActivityKind,
    pub occurred_at: DateTime<Utc>,
}
