//! Analysis pipeline entry point
//!
//! Runs the statistics, streak, and trend calculators over one user's
//! records and packages the results as an [`AnalysisContext`], the single
//! input the insight rules see.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::models::{validate_records, ActivityLog, AnalysisWindow, Granularity, MoodRecord};

use super::statistics::{
    DistributionBucket, PeriodRollup, Statistics, StatisticsCalculator, Summary, TimeOfDayBucket,
};
use super::streak::{StreakState, StreakTracker};
use super::trend::{TrendAnalyzer, TrendResult};

/// What to analyze, resolved by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub user_id: String,
    pub window: AnalysisWindow,
    /// Rollup granularity (config default when absent)
    pub granularity: Option<Granularity>,
    /// Evaluation instant. Streaks count back from its calendar day and
    /// insights are stamped with it; the engine never reads the clock.
    pub as_of: DateTime<Utc>,
}

impl AnalysisRequest {
    pub fn new(user_id: impl Into<String>, window: AnalysisWindow, as_of: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            window,
            granularity: None,
            as_of,
        }
    }

    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = Some(granularity);
        self
    }
}

/// Complete derived state for one evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisContext {
    pub user_id: String,
    pub window: AnalysisWindow,
    pub as_of: DateTime<Utc>,
    /// `as_of` as a calendar day in the reference timezone
    pub today: NaiveDate,
    pub statistics: Statistics,
    pub streak: StreakState,
    pub trend: TrendResult,
}

impl AnalysisContext {
    pub fn summary(&self) -> &Summary {
        &self.statistics.summary
    }

    pub fn distribution(&self) -> &[DistributionBucket] {
        &self.statistics.distribution
    }

    pub fn period_rollups(&self) -> &[PeriodRollup] {
        &self.statistics.period_rollups
    }

    pub fn time_of_day(&self) -> &[TimeOfDayBucket] {
        &self.statistics.time_of_day
    }

    pub fn is_empty(&self) -> bool {
        self.statistics.summary.total_entries == 0
    }

    /// Count in the distribution bucket covering exactly `low..=high`
    pub fn bucket_count(&self, low: i32, high: i32) -> Result<usize> {
        self.statistics
            .distribution
            .iter()
            .find(|b| b.low == low && b.high == high)
            .map(|b| b.count)
            .ok_or_else(|| Error::NotFound(format!("distribution bucket {}-{}", low, high)))
    }

    /// Records valued 1-4
    pub fn low_value_count(&self) -> Result<usize> {
        Ok(self.bucket_count(1, 2)? + self.bucket_count(3, 4)?)
    }

    /// Records valued 7-10
    pub fn high_value_count(&self) -> Result<usize> {
        Ok(self.bucket_count(7, 8)? + self.bucket_count(9, 10)?)
    }

    /// Hour with the highest average among hours with at least `min_entries`.
    /// Ties go to the earlier hour.
    pub fn best_hour(&self, min_entries: usize) -> Option<&TimeOfDayBucket> {
        self.statistics
            .time_of_day
            .iter()
            .filter(|b| b.count >= min_entries)
            .fold(None, |best: Option<&TimeOfDayBucket>, b| match best {
                Some(current) if current.mean() >= b.mean() => Some(current),
                _ => Some(b),
            })
    }

    /// Template variables for insight titles and descriptions
    pub fn to_template_vars(&self) -> HashMap<&'static str, String> {
        let summary = &self.statistics.summary;
        let mut vars = HashMap::new();

        vars.insert("user_id", self.user_id.clone());
        vars.insert("window_start", self.window.start.to_string());
        vars.insert("window_end", self.window.end.to_string());
        vars.insert("window_days", self.window.days().to_string());
        vars.insert("total_entries", summary.total_entries.to_string());
        vars.insert("average", format!("{:.1}", summary.average_value));
        vars.insert("highest", summary.highest_value.to_string());
        vars.insert("lowest", summary.lowest_value.to_string());
        vars.insert("current_streak", self.streak.current.to_string());
        vars.insert("longest_streak", self.streak.longest.to_string());
        vars.insert("logged_days", self.streak.total_logged_days.to_string());
        vars.insert("trend", self.trend.direction.to_string());
        vars.insert("trend_magnitude", format!("{:.1}", self.trend.magnitude.abs()));

        if let Ok(low) = self.low_value_count() {
            vars.insert("low_count", low.to_string());
        }
        if let Ok(high) = self.high_value_count() {
            vars.insert("high_count", high.to_string());
        }
        if let Some(best) = self.best_hour(1) {
            vars.insert("best_hour", format!("{:02}:00", best.hour));
            vars.insert("best_hour_average", format!("{:.1}", best.average_value));
        }

        vars
    }
}

/// Builds analysis contexts; holds configuration only
#[derive(Debug, Clone)]
pub struct Analyzer {
    default_granularity: Granularity,
    streaks: StreakTracker,
    trend: TrendAnalyzer,
    timezone: chrono::FixedOffset,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl Analyzer {
    pub fn new(config: &EngineConfig) -> Self {
        let timezone = config.timezone();
        Self {
            default_granularity: config.default_granularity,
            streaks: StreakTracker::new(timezone),
            trend: TrendAnalyzer::from_config(&config.trend),
            timezone,
        }
    }

    /// Validate the input and run all calculators.
    ///
    /// `records` may extend beyond the window; only in-window records feed
    /// statistics and trend, while every record date plus every activity
    /// counts toward streaks.
    pub fn analyze(
        &self,
        request: &AnalysisRequest,
        records: &[MoodRecord],
        activities: &[ActivityLog],
    ) -> Result<AnalysisContext> {
        AnalysisWindow::new(request.window.start, request.window.end)?;
        validate_records(&request.user_id, records)?;

        let in_window: Vec<MoodRecord> = records
            .iter()
            .filter(|r| request.window.contains(r.occurred_on))
            .cloned()
            .collect();

        let granularity = request.granularity.unwrap_or(self.default_granularity);
        let statistics = StatisticsCalculator::new(granularity, self.timezone)
            .calculate(&in_window, &request.window);
        let trend = self.trend.analyze_records(&in_window);

        let today = self.streaks.local_day(request.as_of);
        let mut active_days = self.streaks.active_days(activities);
        active_days.extend(records.iter().map(|r| r.occurred_on));
        let streak = self.streaks.calculate(active_days, today);

        tracing::debug!(
            user = %request.user_id,
            records = records.len(),
            in_window = in_window.len(),
            activities = activities.len(),
            trend = trend.direction.as_str(),
            current_streak = streak.current,
            "Analysis complete"
        );

        Ok(AnalysisContext {
            user_id: request.user_id.clone(),
            window: request.window,
            as_of: request.as_of,
            today,
            statistics,
            streak,
            trend,
        })
    }
}
