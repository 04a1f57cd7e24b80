//! Insight commands (generate, list, read, archive)

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use mood_core::db::Database;
use mood_core::{EngineConfig, Insight, InsightQuery, InsightRuleEngine, Priority};

use super::{open_db, run_analysis, truncate};
use crate::cli::InputArgs;

fn priority_icon(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "🔴",
        Priority::Medium => "🟡",
        Priority::Low => "🟢",
    }
}

fn print_insight(insight: &Insight) {
    let read = if insight.is_read { "" } else { " •" };
    println!(
        "{} [{}] {}{}",
        priority_icon(insight.priority),
        insight.insight_type,
        insight.title,
        read
    );
    println!("   {}", insight.description);
    println!(
        "   id: {}  rule: {}{}",
        insight.id,
        insight.rule_id,
        if insight.actionable { "  (actionable)" } else { "" }
    );
}

pub fn cmd_insights_generate(
    db_path: &Path,
    config: &EngineConfig,
    input: &InputArgs,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let ctx = run_analysis(config, input)?;
    let report = InsightRuleEngine::new(config).evaluate(&ctx);

    if dry_run {
        if json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }
        println!(
            "🔍 {} of {} rules matched (dry run, nothing stored)",
            report.rules_matched, report.rules_evaluated
        );
        for insight in &report.insights {
            println!();
            print_insight(insight);
        }
        return Ok(());
    }

    let db = open_db(db_path)?;
    let summary = db
        .save_insights(&report.insights, ctx.as_of)
        .context("Failed to save insights")?;

    if json {
        let output = serde_json::json!({
            "report": report,
            "saved": summary,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "💡 {} rules matched: {} new, {} suppressed",
        report.rules_matched, summary.inserted, summary.suppressed
    );
    if report.rules_failed > 0 {
        println!("   ⚠️  {} rules failed (see logs)", report.rules_failed);
    }
    if summary.inserted > 0 {
        println!("   Run 'mood insights list --user {}' to see them.", ctx.user_id);
    }

    Ok(())
}

pub fn cmd_insights_list(
    db: &Database,
    user: &str,
    unread: bool,
    page: u32,
    per_page: u32,
    json: bool,
) -> Result<()> {
    let now = Utc::now();
    let query = InsightQuery {
        unread_only: unread,
        page,
        per_page,
    };
    let results = db.list_insights(user, query, now)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.items.is_empty() {
        println!("No insights for {}.", user);
        return Ok(());
    }

    println!(
        "💡 Insights for {} (page {} of {}, {} total, {} unread)",
        user,
        results.page,
        results.total_pages(),
        results.total,
        db.count_unread(user, now)?
    );
    println!("   ─────────────────────────────");
    for insight in &results.items {
        println!();
        print_insight(insight);
    }

    Ok(())
}

pub fn cmd_insights_read(db: &Database, user: &str, id: &str) -> Result<()> {
    db.mark_insight_read(user, id)
        .with_context(|| format!("Could not mark insight {} as read", id))?;

    match db.get_insight(user, id)? {
        Some(insight) => println!("✓ Marked as read: {}", truncate(&insight.title, 60)),
        None => println!("✓ Marked as read: {}", id),
    }
    Ok(())
}

pub fn cmd_insights_archive(db: &Database) -> Result<()> {
    let archived = db.archive_expired(Utc::now())?;
    println!("🗄️  Archived {} expired insights", archived);
    Ok(())
}
