//! Mood analytics
//!
//! Pure calculators that turn a user's records into derived state:
//!
//! - **Statistics** - value distribution, period rollups, time-of-day averages
//! - **Streak** - current and longest consecutive active-day runs
//! - **Trend** - improving / declining / stable classification
//!
//! [`Analyzer`] runs all three and returns an [`AnalysisContext`] for the
//! insight rules. Nothing here performs I/O or reads the clock.

pub mod context;
pub mod statistics;
pub mod streak;
pub mod trend;

pub use context::{AnalysisContext, AnalysisRequest, Analyzer};
pub use statistics::{
    DistributionBucket, PeriodRollup, Statistics, StatisticsCalculator, Summary, TimeOfDayBucket,
};
pub use streak::{StreakState, StreakTracker};
pub use trend::{TrendAnalyzer, TrendDirection, TrendResult};
