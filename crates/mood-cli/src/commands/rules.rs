//! Rule listing

use anyhow::Result;
use mood_core::insights::DedupScope;
use mood_core::{EngineConfig, InsightRuleEngine};

pub fn cmd_rules(config: &EngineConfig) -> Result<()> {
    let engine = InsightRuleEngine::new(config);

    println!("📋 Insight rules (evaluated in this order)");
    println!("   ─────────────────────────────");
    for rule in engine.rules().iter() {
        let scope = match rule.dedup_scope {
            DedupScope::Cooldown => format!("once per {} days", config.insights.cooldown_days),
            DedupScope::StreakRun => "once per streak".to_string(),
        };
        println!(
            "   {:<20} {:<15} {:<7} {:<11} {}",
            rule.id,
            rule.insight_type.as_str(),
            rule.priority.as_str(),
            if rule.actionable { "actionable" } else { "" },
            scope
        );
    }

    println!();
    if config.insights.ttl_days > 0 {
        println!("   Insights expire after {} days.", config.insights.ttl_days);
    } else {
        println!("   Insights never expire.");
    }
    Ok(())
}
