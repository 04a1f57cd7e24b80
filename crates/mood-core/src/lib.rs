//! Mood Core Library
//!
//! Insight and analytics engine for self-reported mood data:
//! - Statistics: distribution, period rollups, time-of-day averages
//! - Streak tracking over consecutive active days
//! - Trend classification (improving / declining / stable)
//! - Declarative insight rules with deterministic dedup keys
//! - SQLite insight store with cooldown suppression and read state
//! - CSV / JSON record import
//!
//! The analytics and rule layers are pure: callers supply records and an
//! evaluation instant, and get the same output for the same input.

pub mod analytics;
pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod insights;
pub mod models;

pub use analytics::{
    AnalysisContext, AnalysisRequest, Analyzer, Statistics, StatisticsCalculator, StreakState,
    StreakTracker, TrendAnalyzer, TrendDirection, TrendResult,
};
pub use config::EngineConfig;
pub use db::{Database, InsightQuery, Page, SaveSummary};
pub use error::{Error, Result};
pub use import::RecordFormat;
pub use insights::{
    EngineReport, Insight, InsightRule, InsightRuleEngine, InsightType, Priority, RuleSet,
};
pub use models::{ActivityKind, ActivityLog, AnalysisWindow, Granularity, MoodRecord};
