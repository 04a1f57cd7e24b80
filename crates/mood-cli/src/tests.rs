//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, TimeZone, Utc};
use mood_core::{EngineConfig, InsightQuery, MoodRecord};
use tempfile::TempDir;

use crate::cli::InputArgs;
use crate::commands::{self, truncate};

/// Write eight days of steadily falling mood for `u1`, plus one `u2` row
fn write_declining_csv(dir: &Path) -> PathBuf {
    let mut csv = String::from("id,user_id,value,occurred_on,logged_at,note\n");
    for (i, value) in [8, 7, 6, 5, 4, 3, 2, 1].iter().enumerate() {
        let day = 11 + i;
        csv.push_str(&format!(
            "m{},u1,{},2026-10-{:02},2026-10-{:02}T20:00:00Z,\n",
            i, value, day, day
        ));
    }
    csv.push_str("x1,u2,9,2026-10-18,2026-10-18T08:00:00Z,other user\n");

    let path = dir.join("moods.csv");
    std::fs::write(&path, csv).unwrap();
    path
}

fn input(records: PathBuf) -> InputArgs {
    InputArgs {
        records,
        activities: None,
        format: None,
        user: "u1".to_string(),
        period: "last-30-days".to_string(),
        from: None,
        to: None,
        granularity: None,
        as_of: Some("2026-10-18".to_string()),
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ========== Window Resolution Tests ==========

#[test]
fn test_resolve_window_presets() {
    let today = date(2026, 10, 18);
    let week = commands::resolve_window("last-7-days", None, None, today, &[]).unwrap();
    assert_eq!(week.start, date(2026, 10, 12));
    assert_eq!(week.end, today);
    assert_eq!(week.days(), 7);

    let year = commands::resolve_window("LAST-365-DAYS", None, None, today, &[]).unwrap();
    assert_eq!(year.days(), 365);

    assert!(commands::resolve_window("fortnight", None, None, today, &[]).is_err());
}

#[test]
fn test_resolve_window_custom_range() {
    let today = date(2026, 10, 18);
    let window =
        commands::resolve_window("all", Some("2026-10-01"), Some("2026-10-10"), today, &[])
            .unwrap();
    assert_eq!(window.start, date(2026, 10, 1));
    assert_eq!(window.end, date(2026, 10, 10));

    let open_ended =
        commands::resolve_window("all", Some("2026-10-01"), None, today, &[]).unwrap();
    assert_eq!(open_ended.end, today);

    // Reversed and half-specified ranges are rejected
    assert!(
        commands::resolve_window("all", Some("2026-10-10"), Some("2026-10-01"), today, &[])
            .is_err()
    );
    assert!(commands::resolve_window("all", None, Some("2026-10-01"), today, &[]).is_err());
    assert!(commands::resolve_window("all", Some("10/01/2026"), None, today, &[]).is_err());
}

#[test]
fn test_resolve_window_all_spans_records() {
    let today = date(2026, 10, 18);
    let record = MoodRecord {
        id: "m1".to_string(),
        user_id: "u1".to_string(),
        value: 5,
        note: None,
        occurred_on: date(2026, 1, 3),
        logged_at: Utc.with_ymd_and_hms(2026, 1, 3, 9, 0, 0).unwrap(),
    };
    let window = commands::resolve_window("all", None, None, today, &[record]).unwrap();
    assert_eq!(window.start, date(2026, 1, 3));
    assert_eq!(window.end, today);

    let empty = commands::resolve_window("all", None, None, today, &[]).unwrap();
    assert_eq!(empty.days(), 1);
}

#[test]
fn test_parse_as_of() {
    let utc = EngineConfig::default().timezone();
    let end_of_day = commands::parse_as_of(Some("2026-10-18"), utc).unwrap();
    assert_eq!(
        end_of_day,
        Utc.with_ymd_and_hms(2026, 10, 18, 23, 59, 59).unwrap()
    );

    let plus_two = chrono::FixedOffset::east_opt(2 * 3600).unwrap();
    let local = commands::parse_as_of(Some("2026-10-18"), plus_two).unwrap();
    assert_eq!(local, Utc.with_ymd_and_hms(2026, 10, 18, 21, 59, 59).unwrap());

    let exact = commands::parse_as_of(Some("2026-10-18T07:30:00Z"), utc).unwrap();
    assert_eq!(exact, Utc.with_ymd_and_hms(2026, 10, 18, 7, 30, 0).unwrap());

    assert!(commands::parse_as_of(Some("tomorrow"), utc).is_err());
}

// ========== Analyze Command Tests ==========

#[test]
fn test_run_analysis_filters_to_user() {
    let dir = TempDir::new().unwrap();
    let args = input(write_declining_csv(dir.path()));

    let ctx = commands::run_analysis(&EngineConfig::default(), &args).unwrap();
    assert_eq!(ctx.summary().total_entries, 8);
    assert_eq!(ctx.streak.current, 8);
    assert_eq!(ctx.today, date(2026, 10, 18));
}

#[test]
fn test_prepare_analysis_skips_other_users() {
    let dir = TempDir::new().unwrap();
    let args = input(write_declining_csv(dir.path()));

    let (request, records, _) = commands::prepare_analysis(&EngineConfig::default(), &args).unwrap();
    assert_eq!(request.user_id, "u1");
    assert_eq!(records.len(), 8);
    assert!(records.iter().all(|r| r.user_id == "u1"));

    let mut other = args.clone();
    other.user = "u2".to_string();
    let (_, records, _) = commands::prepare_analysis(&EngineConfig::default(), &other).unwrap();
    assert_eq!(records.len(), 1);
}

#[test]
fn test_cmd_analyze_text_and_json() {
    let dir = TempDir::new().unwrap();
    let mut args = input(write_declining_csv(dir.path()));
    args.granularity = Some("day".to_string());

    assert!(commands::cmd_analyze(&EngineConfig::default(), &args, false).is_ok());
    assert!(commands::cmd_analyze(&EngineConfig::default(), &args, true).is_ok());
}

#[test]
fn test_cmd_analyze_bad_inputs() {
    let dir = TempDir::new().unwrap();
    let config = EngineConfig::default();

    let mut args = input(write_declining_csv(dir.path()));
    args.granularity = Some("hourly".to_string());
    assert!(commands::cmd_analyze(&config, &args, false).is_err());

    let missing = input(dir.path().join("missing.csv"));
    assert!(commands::cmd_analyze(&config, &missing, false).is_err());

    let bad_value = dir.path().join("bad.csv");
    std::fs::write(
        &bad_value,
        "id,user_id,value,occurred_on,logged_at\nm1,u1,11,2026-10-18,2026-10-18T08:00:00Z\n",
    )
    .unwrap();
    assert!(commands::cmd_analyze(&config, &input(bad_value), false).is_err());
}

// ========== Insights Command Tests ==========

#[test]
fn test_cmd_insights_generate_and_list() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("mood.db");
    let args = input(write_declining_csv(dir.path()));
    let config = EngineConfig::default();

    commands::cmd_insights_generate(&db_path, &config, &args, false, false).unwrap();

    let db = commands::open_db(&db_path).unwrap();
    let as_of = Utc.with_ymd_and_hms(2026, 10, 18, 23, 59, 59).unwrap();
    let page = db
        .list_insights("u1", InsightQuery::default(), as_of)
        .unwrap();
    assert!(page.items.iter().any(|i| i.rule_id == "declining_trend"));
    let stored = page.total;

    // Second run is fully suppressed
    commands::cmd_insights_generate(&db_path, &config, &args, false, true).unwrap();
    let page = db
        .list_insights("u1", InsightQuery::default(), as_of)
        .unwrap();
    assert_eq!(page.total, stored);

    // Read one
    let id = page.items[0].id.clone();
    commands::cmd_insights_read(&db, "u1", &id).unwrap();
    assert!(db.get_insight("u1", &id).unwrap().unwrap().is_read);
    assert!(commands::cmd_insights_read(&db, "u1", "0000000000000000").is_err());

    assert!(commands::cmd_insights_list(&db, "u1", true, 1, 20, false).is_ok());
    assert!(commands::cmd_insights_list(&db, "nobody", false, 1, 20, true).is_ok());
    assert!(commands::cmd_insights_archive(&db).is_ok());
}

#[test]
fn test_cmd_insights_generate_dry_run_stores_nothing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("mood.db");
    let args = input(write_declining_csv(dir.path()));

    commands::cmd_insights_generate(&db_path, &EngineConfig::default(), &args, true, false)
        .unwrap();
    assert!(!db_path.exists());
}

// ========== Misc Command Tests ==========

#[test]
fn test_cmd_init_and_rules() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("mood.db");

    commands::cmd_init(&db_path).unwrap();
    assert!(db_path.exists());
    assert!(commands::cmd_rules(&EngineConfig::default()).is_ok());
}

#[test]
fn test_load_config_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("engine.toml");
    std::fs::write(&path, "[insights]\ncooldown_days = 3\n").unwrap();

    let config = commands::load_config(Some(&path)).unwrap();
    assert_eq!(config.insights.cooldown_days, 3);
    assert_eq!(config.insights.ttl_days, 14);

    assert!(commands::load_config(Some(&dir.path().join("missing.toml"))).is_err());
}

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a much longer title", 10), "a much ...");
    assert_eq!(truncate("héllo wörld", 8), "héllo...");
}
