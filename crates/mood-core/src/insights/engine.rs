//! Insight Engine - evaluates rules against an analysis context

use chrono::Duration;
use serde::Serialize;

use crate::analytics::AnalysisContext;
use crate::config::{EngineConfig, InsightSettings};

use super::rules::{render, InsightRule, RuleSet};
use super::types::Insight;

/// A rule whose predicate returned an error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleFailure {
    pub rule_id: String,
    pub message: String,
}

/// Outcome of one evaluation pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct EngineReport {
    pub rules_evaluated: usize,
    pub rules_matched: usize,
    pub rules_failed: usize,
    pub failures: Vec<RuleFailure>,
    /// Generated insights, highest priority first
    pub insights: Vec<Insight>,
}

/// The rule engine. Holds rules and settings only, so one instance can be
/// shared across threads evaluating different users.
#[derive(Debug)]
pub struct InsightRuleEngine {
    rules: RuleSet,
    settings: InsightSettings,
}

impl Default for InsightRuleEngine {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl InsightRuleEngine {
    /// Create an engine with the built-in rules
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_rules(RuleSet::builtin(&config.rules), config.insights.clone())
    }

    pub fn with_rules(rules: RuleSet, settings: InsightSettings) -> Self {
        Self { rules, settings }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Evaluate every rule against `ctx`.
    ///
    /// A failing rule is logged and skipped; the rest still run.
    pub fn evaluate(&self, ctx: &AnalysisContext) -> EngineReport {
        let mut report = EngineReport::default();

        for rule in self.rules.iter() {
            report.rules_evaluated += 1;
            match rule.matches(ctx) {
                Ok(true) => {
                    report.rules_matched += 1;
                    report.insights.push(self.build_insight(rule, ctx));
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(
                        rule = rule.id,
                        user = %ctx.user_id,
                        error = %e,
                        "Insight rule failed"
                    );
                    report.rules_failed += 1;
                    report.failures.push(RuleFailure {
                        rule_id: rule.id.to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        // Stable sort keeps declaration order within a priority
        report
            .insights
            .sort_by(|a, b| b.priority.rank().cmp(&a.priority.rank()));

        tracing::debug!(
            user = %ctx.user_id,
            evaluated = report.rules_evaluated,
            matched = report.rules_matched,
            failed = report.rules_failed,
            "Insight evaluation complete"
        );

        report
    }

    /// Convenience wrapper returning only the insights
    pub fn generate(&self, ctx: &AnalysisContext) -> Vec<Insight> {
        self.evaluate(ctx).insights
    }

    fn build_insight(&self, rule: &InsightRule, ctx: &AnalysisContext) -> Insight {
        let vars = rule.template_vars(ctx);
        let insight = Insight::new(
            ctx.user_id.clone(),
            rule.id,
            rule.dedup_key(ctx, self.settings.cooldown_days),
            rule.insight_type,
            rule.priority,
            render(rule.title_template, &vars),
            render(rule.description_template, &vars),
            ctx.as_of,
        )
        .with_actionable(rule.actionable);

        if self.settings.ttl_days > 0 {
            insight.with_expiration(ctx.as_of + Duration::days(i64::from(self.settings.ttl_days)))
        } else {
            insight
        }
    }
}
