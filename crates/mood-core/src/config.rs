//! Engine configuration
//!
//! All thresholds the calculators and rules use live here, so the rule set
//! stays static code while its tuning stays data.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Explicit path, or the override in the data dir
//!    (~/.local/share/mood/config/engine.toml)
//! 2. Fall back to embedded defaults (compiled into binary)

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::Granularity;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/engine.toml");

/// Largest UTC offset accepted for the reference timezone (18 hours)
const MAX_OFFSET_MINUTES: i32 = 18 * 60;

/// Trend classification tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Minimum records for a confident classification
    pub min_samples: usize,
    /// Half-to-half change needed to leave "stable"
    pub threshold: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            min_samples: 4,
            threshold: 0.5,
        }
    }
}

/// Thresholds used by the built-in insight rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleThresholds {
    /// Window average at or below this is a low-mood warning
    pub low_average_max: f64,
    /// Window average at or above this is a celebration...
    pub high_average_min: f64,
    /// ...but only with at least this many entries
    pub high_average_min_entries: usize,
    /// Current streak length that counts as a milestone
    pub streak_milestone_days: u32,
    /// Low buckets must exceed high buckets by this factor
    pub dominance_ratio: f64,
    /// Minimum entries in an hour before it can be the "best" hour
    pub time_of_day_min_entries: usize,
    /// Minimum lift of the best hour over the window average
    pub time_of_day_min_lift: f64,
    /// A lapsed streak is only worth mentioning after a run this long
    pub lapsed_streak_min_longest: u32,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            low_average_max: 3.0,
            high_average_min: 8.0,
            high_average_min_entries: 5,
            streak_milestone_days: 7,
            dominance_ratio: 2.0,
            time_of_day_min_entries: 3,
            time_of_day_min_lift: 1.0,
            lapsed_streak_min_longest: 3,
        }
    }
}

/// Insight lifecycle tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightSettings {
    /// Length of a dedup bucket in days
    pub cooldown_days: u32,
    /// Days until an insight expires (0 = never)
    pub ttl_days: u32,
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            cooldown_days: 7,
            ttl_days: 14,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Reference timezone for calendar-day and hour extraction
    pub utc_offset_minutes: i32,
    /// Rollup granularity when the caller does not pick one
    pub default_granularity: Granularity,
    pub trend: TrendConfig,
    pub rules: RuleThresholds,
    pub insights: InsightSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            default_granularity: Granularity::Week,
            trend: TrendConfig::default(),
            rules: RuleThresholds::default(),
            insights: InsightSettings::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration (override first, then embedded default)
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let content = match override_path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                fs::read_to_string(path)?
            }
            None => match default_config_path() {
                Some(path) if path.exists() => {
                    tracing::debug!(path = %path.display(), "Using config override");
                    fs::read_to_string(&path)?
                }
                _ => DEFAULT_CONFIG.to_string(),
            },
        };

        Self::from_toml(&content)
    }

    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the calculators cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(Error::Config(format!(
                "utc_offset_minutes {} is outside ±{}",
                self.utc_offset_minutes, MAX_OFFSET_MINUTES
            )));
        }
        if self.trend.min_samples < 2 {
            return Err(Error::Config(
                "trend.min_samples must be at least 2".to_string(),
            ));
        }
        if !(self.trend.threshold > 0.0) {
            return Err(Error::Config(
                "trend.threshold must be positive".to_string(),
            ));
        }
        if self.rules.dominance_ratio <= 0.0 {
            return Err(Error::Config(
                "rules.dominance_ratio must be positive".to_string(),
            ));
        }
        if self.insights.cooldown_days == 0 {
            return Err(Error::Config(
                "insights.cooldown_days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The reference timezone as a chrono offset
    pub fn timezone(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or(Utc.fix())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("mood").join("config").join("engine.toml"))
}
