//! Insight Engine - rule-based observations about mood data
//!
//! Rules are declarative: each one is a predicate over an
//! [`AnalysisContext`](crate::analytics::AnalysisContext) plus the text and
//! classification of the insight it emits. The engine runs every rule,
//! isolates failures, and orders the results by priority.
//!
//! ## Built-in Rules
//!
//! - **low_average** - window average at or below the low threshold
//! - **declining_trend** / **improving_trend** - confident trend direction
//! - **low_mood_dominance** - low-value entries outnumber high-value ones
//! - **high_average** - consistently good mood
//! - **streak_milestone** / **lapsed_streak** - check-in streaks
//! - **best_time_of_day** - an hour that stands out above the average
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mood_core::{Analyzer, AnalysisRequest, EngineConfig, InsightRuleEngine};
//!
//! let config = EngineConfig::load(None)?;
//! let ctx = Analyzer::new(&config).analyze(&request, &records, &activities)?;
//! let report = InsightRuleEngine::new(&config).evaluate(&ctx);
//! ```

pub mod engine;
pub mod rules;
pub mod types;

pub use engine::{EngineReport, InsightRuleEngine, RuleFailure};
pub use rules::{cooldown_bucket_start, render, DedupScope, InsightRule, RuleSet};
pub use types::{insight_id, Insight, InsightState, InsightType, Priority};
