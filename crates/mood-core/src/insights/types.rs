//! Core types for the insight engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Kind of observation an insight makes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
    /// Suggests something the user can do
    Recommendation,
    /// Flags a concerning pattern
    Warning,
    /// Acknowledges something going well
    Celebration,
    /// Describes a neutral regularity in the data
    Pattern,
    /// Marks an achievement such as a streak length
    Milestone,
}

impl InsightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightType::Recommendation => "recommendation",
            InsightType::Warning => "warning",
            InsightType::Celebration => "celebration",
            InsightType::Pattern => "pattern",
            InsightType::Milestone => "milestone",
        }
    }
}

impl fmt::Display for InsightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InsightType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recommendation" => Ok(InsightType::Recommendation),
            "warning" => Ok(InsightType::Warning),
            "celebration" => Ok(InsightType::Celebration),
            "pattern" => Ok(InsightType::Pattern),
            "milestone" => Ok(InsightType::Milestone),
            _ => Err(format!("Unknown insight type: {}", s)),
        }
    }
}

/// How prominently an insight should be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Numeric priority for sorting (higher = more urgent)
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

/// Where an insight is in its lifecycle.
///
/// `Unread -> Read` happens when the user acknowledges it; either state
/// becomes `Expired` once `expires_at` passes. Nothing moves backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightState {
    Unread,
    Read,
    Expired,
}

impl InsightState {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightState::Unread => "unread",
            InsightState::Read => "read",
            InsightState::Expired => "expired",
        }
    }
}

impl fmt::Display for InsightState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A generated observation about a user's mood data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    /// Stable id derived from user, rule, and dedup key
    pub id: String,
    pub user_id: String,
    /// Rule that produced this insight
    pub rule_id: String,
    /// Key the store uses to suppress repeats (e.g. "low_average:2026-10-15")
    pub dedup_key: String,
    pub insight_type: InsightType,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub actionable: bool,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Insight {
    /// Create a new, unread insight
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: impl Into<String>,
        rule_id: impl Into<String>,
        dedup_key: impl Into<String>,
        insight_type: InsightType,
        priority: Priority,
        title: impl Into<String>,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let user_id = user_id.into();
        let rule_id = rule_id.into();
        let dedup_key = dedup_key.into();
        Self {
            id: insight_id(&user_id, &rule_id, &dedup_key),
            user_id,
            rule_id,
            dedup_key,
            insight_type,
            title: title.into(),
            description: description.into(),
            priority,
            actionable: false,
            is_read: false,
            created_at,
            expires_at: None,
        }
    }

    pub fn with_actionable(mut self, actionable: bool) -> Self {
        self.actionable = actionable;
        self
    }

    /// Set expiration time
    pub fn with_expiration(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    pub fn state(&self, now: DateTime<Utc>) -> InsightState {
        if self.is_expired(now) {
            InsightState::Expired
        } else if self.is_read {
            InsightState::Read
        } else {
            InsightState::Unread
        }
    }
}

/// Deterministic insight id: first 16 hex chars of SHA-256 over the parts
pub fn insight_id(user_id: &str, rule_id: &str, dedup_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(user_id.as_bytes());
    hasher.update([0u8]);
    hasher.update(rule_id.as_bytes());
    hasher.update([0u8]);
    hasher.update(dedup_key.as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..8])
}
