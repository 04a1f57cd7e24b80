//! Declarative insight rules
//!
//! Each rule pairs a side-effect-free predicate over the [`AnalysisContext`]
//! with the type, priority, actionability, and text of the insight it emits.
//! Rules never see each other's results, so evaluation order does not
//! change which rules match.

use std::collections::HashMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};

use crate::analytics::{AnalysisContext, TrendDirection};
use crate::config::RuleThresholds;
use crate::error::Result;

use super::types::{InsightType, Priority};

/// Predicate deciding whether a rule matches
pub type Predicate = Box<dyn Fn(&AnalysisContext) -> Result<bool> + Send + Sync>;

/// Extra template variables a rule contributes on top of the context's own
pub type VarsFn = Box<dyn Fn(&AnalysisContext) -> HashMap<&'static str, String> + Send + Sync>;

/// How a rule's dedup key is bucketed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupScope {
    /// One emission per cooldown bucket of `cooldown_days`
    Cooldown,
    /// One emission per streak run (keyed by the run's first day)
    StreakRun,
}

/// A single insight rule
pub struct InsightRule {
    pub id: &'static str,
    pub insight_type: InsightType,
    pub priority: Priority,
    pub actionable: bool,
    pub title_template: &'static str,
    pub description_template: &'static str,
    pub dedup_scope: DedupScope,
    predicate: Predicate,
    vars: Option<VarsFn>,
}

impl fmt::Debug for InsightRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InsightRule")
            .field("id", &self.id)
            .field("insight_type", &self.insight_type)
            .field("priority", &self.priority)
            .field("actionable", &self.actionable)
            .field("dedup_scope", &self.dedup_scope)
            .finish_non_exhaustive()
    }
}

impl InsightRule {
    pub fn new<F>(
        id: &'static str,
        insight_type: InsightType,
        priority: Priority,
        actionable: bool,
        predicate: F,
    ) -> Self
    where
        F: Fn(&AnalysisContext) -> Result<bool> + Send + Sync + 'static,
    {
        Self {
            id,
            insight_type,
            priority,
            actionable,
            title_template: "",
            description_template: "",
            dedup_scope: DedupScope::Cooldown,
            predicate: Box::new(predicate),
            vars: None,
        }
    }

    pub fn with_text(mut self, title: &'static str, description: &'static str) -> Self {
        self.title_template = title;
        self.description_template = description;
        self
    }

    pub fn with_dedup_scope(mut self, scope: DedupScope) -> Self {
        self.dedup_scope = scope;
        self
    }

    pub fn with_vars<F>(mut self, vars: F) -> Self
    where
        F: Fn(&AnalysisContext) -> HashMap<&'static str, String> + Send + Sync + 'static,
    {
        self.vars = Some(Box::new(vars));
        self
    }

    /// Evaluate the predicate
    pub fn matches(&self, ctx: &AnalysisContext) -> Result<bool> {
        (self.predicate)(ctx)
    }

    /// Template variables for this rule: the context's plus the rule's own
    pub fn template_vars(&self, ctx: &AnalysisContext) -> HashMap<&'static str, String> {
        let mut vars = ctx.to_template_vars();
        if let Some(extra) = &self.vars {
            vars.extend(extra(ctx));
        }
        vars
    }

    /// Key identifying "the same conclusion" for cooldown suppression
    pub fn dedup_key(&self, ctx: &AnalysisContext, cooldown_days: u32) -> String {
        let bucket = match (self.dedup_scope, ctx.streak.current_run_start) {
            (DedupScope::StreakRun, Some(start)) => format!("run-{}", start),
            _ => cooldown_bucket_start(ctx.today, cooldown_days).to_string(),
        };
        format!("{}:{}", self.id, bucket)
    }
}

/// First day of the `days`-long bucket containing `date`.
///
/// Buckets are aligned to the proleptic Gregorian day count so every caller
/// agrees on the boundaries without shared state.
pub fn cooldown_bucket_start(date: NaiveDate, days: u32) -> NaiveDate {
    let days = i32::try_from(days.max(1)).unwrap_or(i32::MAX);
    let day_number = date.num_days_from_ce();
    let start = day_number - day_number.rem_euclid(days);
    NaiveDate::from_num_days_from_ce_opt(start).unwrap_or(date)
}

/// Replace `{{var}}` placeholders in one left-to-right pass.
///
/// Substituted values are never rescanned. Unknown placeholders are kept.
pub fn render(template: &str, vars: &HashMap<&'static str, String>) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        result.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            result.push_str(&rest[open..]);
            return result;
        };

        let name = &after[..close];
        match vars.get(name) {
            Some(value) => result.push_str(value),
            None => {
                result.push_str("{{");
                result.push_str(name);
                result.push_str("}}");
            }
        }
        rest = &after[close + 2..];
    }

    result.push_str(rest);
    result
}

/// Ordered collection of rules; declaration order breaks priority ties
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: Vec<InsightRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// The built-in rules, tuned by `t`
    pub fn builtin(t: &RuleThresholds) -> Self {
        let mut set = Self::new();

        let low_max = t.low_average_max;
        set.push(
            InsightRule::new(
                "low_average",
                InsightType::Warning,
                Priority::High,
                true,
                move |ctx| Ok(!ctx.is_empty() && ctx.summary().mean() <= low_max),
            )
            .with_text(
                "Your mood has been low lately",
                "Your average mood over the last {{window_days}} days was {{average}} out of 10 \
                 across {{total_entries}} entries. Consider reaching out to someone you trust \
                 or to a professional for support.",
            ),
        );

        set.push(
            InsightRule::new(
                "declining_trend",
                InsightType::Warning,
                Priority::Medium,
                true,
                |ctx| Ok(ctx.trend.is_confidently(TrendDirection::Declining)),
            )
            .with_text(
                "Your mood is trending down",
                "Your recent entries average {{trend_magnitude}} points lower than earlier in \
                 this period. Try to notice what changed and plan something restorative.",
            ),
        );

        let ratio = t.dominance_ratio;
        set.push(
            InsightRule::new(
                "low_mood_dominance",
                InsightType::Recommendation,
                Priority::Medium,
                true,
                move |ctx| {
                    let low = ctx.low_value_count()?;
                    let high = ctx.high_value_count()?;
                    Ok(low > 0 && low as f64 > ratio * high as f64)
                },
            )
            .with_text(
                "Low days are outnumbering good ones",
                "{{low_count}} of your {{total_entries}} entries were 4 or below, compared with \
                 {{high_count}} at 7 or above. Small daily routines like a short walk or a \
                 breathing exercise can help.",
            ),
        );

        set.push(
            InsightRule::new(
                "improving_trend",
                InsightType::Celebration,
                Priority::Low,
                false,
                |ctx| Ok(ctx.trend.is_confidently(TrendDirection::Improving)),
            )
            .with_text(
                "Your mood is improving",
                "Your recent entries average {{trend_magnitude}} points higher than earlier in \
                 this period. Keep doing what's working.",
            ),
        );

        let high_min = t.high_average_min;
        let high_min_entries = t.high_average_min_entries;
        set.push(
            InsightRule::new(
                "high_average",
                InsightType::Celebration,
                Priority::Low,
                false,
                move |ctx| {
                    let summary = ctx.summary();
                    Ok(summary.total_entries >= high_min_entries
                        && summary.mean() >= high_min)
                },
            )
            .with_text(
                "You've been feeling great",
                "Your average mood across {{total_entries}} entries was {{average}} out of 10.",
            ),
        );

        let milestone = t.streak_milestone_days;
        set.push(
            InsightRule::new(
                "streak_milestone",
                InsightType::Milestone,
                Priority::Low,
                false,
                move |ctx| Ok(milestone > 0 && ctx.streak.current >= milestone),
            )
            .with_text(
                "{{current_streak}}-day check-in streak",
                "You've checked in {{current_streak}} days in a row. Your longest streak is \
                 {{longest_streak}} days.",
            )
            .with_dedup_scope(DedupScope::StreakRun),
        );

        let lapsed_min = t.lapsed_streak_min_longest;
        set.push(
            InsightRule::new(
                "lapsed_streak",
                InsightType::Recommendation,
                Priority::Low,
                true,
                move |ctx| Ok(ctx.streak.current == 0 && ctx.streak.longest >= lapsed_min),
            )
            .with_text(
                "Pick your streak back up",
                "You haven't checked in today. Your best run so far is {{longest_streak}} days \
                 in a row.",
            ),
        );

        let hour_min_entries = t.time_of_day_min_entries;
        let hour_min_lift = t.time_of_day_min_lift;
        set.push(
            InsightRule::new(
                "best_time_of_day",
                InsightType::Pattern,
                Priority::Low,
                false,
                move |ctx| {
                    let average = ctx.summary().mean();
                    Ok(ctx
                        .best_hour(hour_min_entries)
                        .is_some_and(|best| best.mean() - average >= hour_min_lift))
                },
            )
            .with_text(
                "You tend to feel better around {{best_hour}}",
                "Entries logged around {{best_hour}} average {{best_hour_average}}, compared \
                 with {{average}} overall.",
            )
            .with_vars(move |ctx| {
                let mut vars = HashMap::new();
                if let Some(best) = ctx.best_hour(hour_min_entries) {
                    vars.insert("best_hour", format!("{:02}:00", best.hour));
                    vars.insert("best_hour_average", format!("{:.1}", best.average_value));
                }
                vars
            }),
        );

        set
    }

    pub fn push(&mut self, rule: InsightRule) {
        self.rules.push(rule);
    }

    pub fn iter(&self) -> impl Iterator<Item = &InsightRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&InsightRule> {
        self.rules.iter().find(|r| r.id == id)
    }
}
