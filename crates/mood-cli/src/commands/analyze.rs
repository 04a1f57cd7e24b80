//! Analysis command and input resolution shared with `insights generate`

use anyhow::{bail, Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use mood_core::import::{load_activities, load_records, parse_timestamp};
use mood_core::{
    ActivityLog, AnalysisContext, AnalysisRequest, AnalysisWindow, Analyzer, EngineConfig,
    Granularity, MoodRecord, RecordFormat,
};

use crate::cli::InputArgs;

/// Resolve the evaluation instant.
///
/// A bare date means the end of that day in the reference timezone.
pub fn parse_as_of(as_of: Option<&str>, timezone: FixedOffset) -> Result<DateTime<Utc>> {
    let Some(s) = as_of else {
        return Ok(Utc::now());
    };

    if let Ok(day) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let end_of_day = day
            .and_hms_opt(23, 59, 59)
            .context("Invalid --as-of date")?;
        return end_of_day
            .and_local_timezone(timezone)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .context("Invalid --as-of date");
    }

    parse_timestamp(s).context("Invalid --as-of (use YYYY-MM-DD or RFC 3339)")
}

/// Resolve a named period (or --from/--to) into an inclusive window ending
/// at `today`
pub fn resolve_window(
    period: &str,
    custom_from: Option<&str>,
    custom_to: Option<&str>,
    today: NaiveDate,
    records: &[MoodRecord],
) -> Result<AnalysisWindow> {
    if custom_from.is_some() || custom_to.is_some() {
        let to = match custom_to {
            Some(to) => NaiveDate::parse_from_str(to, "%Y-%m-%d")
                .context("Invalid --to date format (use YYYY-MM-DD)")?,
            None => today,
        };
        let from = match custom_from {
            Some(from) => NaiveDate::parse_from_str(from, "%Y-%m-%d")
                .context("Invalid --from date format (use YYYY-MM-DD)")?,
            None => bail!("--to requires --from"),
        };
        return Ok(AnalysisWindow::new(from, to)?);
    }

    let days = match period.to_lowercase().as_str() {
        "last-7-days" => 7,
        "last-30-days" => 30,
        "last-90-days" => 90,
        "last-180-days" => 180,
        "last-365-days" => 365,
        "all" => {
            let first = records.iter().map(|r| r.occurred_on).min().unwrap_or(today);
            let last = records.iter().map(|r| r.occurred_on).max().unwrap_or(today);
            return Ok(AnalysisWindow::new(first.min(today), last.max(today))?);
        }
        _ => bail!(
            "Unknown period: {} (valid: last-7-days, last-30-days, last-90-days, \
             last-180-days, last-365-days, all)",
            period
        ),
    };

    Ok(AnalysisWindow::last_days(days, today)?)
}

/// Load input files and build the analysis request
pub fn prepare_analysis(
    config: &EngineConfig,
    input: &InputArgs,
) -> Result<(AnalysisRequest, Vec<MoodRecord>, Vec<ActivityLog>)> {
    let format = input
        .format
        .as_deref()
        .map(|f| f.parse::<RecordFormat>())
        .transpose()
        .map_err(anyhow::Error::msg)?;

    let records = load_records(&input.records, format)
        .with_context(|| format!("Failed to read records from {}", input.records.display()))?;
    let activities = match &input.activities {
        Some(path) => load_activities(path, format)
            .with_context(|| format!("Failed to read activities from {}", path.display()))?,
        None => Vec::new(),
    };

    let timezone = config.timezone();
    let as_of = parse_as_of(input.as_of.as_deref(), timezone)?;
    let today = as_of.with_timezone(&timezone).date_naive();

    // Only this user's records define the "all" window
    let total = records.len();
    let own: Vec<MoodRecord> = records
        .into_iter()
        .filter(|r| r.user_id == input.user)
        .collect();
    if own.len() < total {
        tracing::debug!(
            user = %input.user,
            skipped = total - own.len(),
            "Skipped records for other users"
        );
    }

    let window = resolve_window(
        &input.period,
        input.from.as_deref(),
        input.to.as_deref(),
        today,
        &own,
    )?;

    let mut request = AnalysisRequest::new(input.user.clone(), window, as_of);
    if let Some(g) = &input.granularity {
        request = request.with_granularity(g.parse::<Granularity>().map_err(anyhow::Error::msg)?);
    }

    tracing::debug!(
        records = own.len(),
        activities = activities.len(),
        start = %window.start,
        end = %window.end,
        "Input loaded"
    );

    Ok((request, own, activities))
}

/// Load inputs and run the analyzer
pub fn run_analysis(config: &EngineConfig, input: &InputArgs) -> Result<AnalysisContext> {
    let (request, records, activities) = prepare_analysis(config, input)?;
    Analyzer::new(config)
        .analyze(&request, &records, &activities)
        .context("Analysis failed")
}

pub fn cmd_analyze(config: &EngineConfig, input: &InputArgs, json: bool) -> Result<()> {
    let ctx = run_analysis(config, input)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&ctx)?);
        return Ok(());
    }

    print_analysis(&ctx, config.trend.min_samples);
    Ok(())
}

fn print_analysis(ctx: &AnalysisContext, min_samples: usize) {
    let summary = ctx.summary();

    println!();
    println!(
        "📊 Mood Analysis for {} ({} to {})",
        ctx.user_id, ctx.window.start, ctx.window.end
    );
    println!("   ─────────────────────────────");

    if ctx.is_empty() {
        println!("   No entries in this window.");
    } else {
        println!("   Entries:  {}", summary.total_entries);
        println!("   Average:  {:.1}", summary.average_value);
        println!(
            "   Range:    {} - {}",
            summary.lowest_value, summary.highest_value
        );
    }

    println!();
    println!("   Distribution");
    for bucket in ctx.distribution() {
        let bar = "█".repeat((bucket.percentage / 5) as usize);
        println!(
            "   {:>6}  {:>4}  {:>3}%  {}",
            bucket.label(),
            bucket.count,
            bucket.percentage,
            bar
        );
    }

    if !ctx.period_rollups().is_empty() {
        println!();
        println!("   By {}", ctx.statistics.granularity);
        for rollup in ctx.period_rollups() {
            println!(
                "   {:<10}  avg {:>4.1}  ({} entries, {}-{})",
                rollup.period_key, rollup.average, rollup.count, rollup.low, rollup.high
            );
        }
    }

    if !ctx.time_of_day().is_empty() {
        println!();
        println!("   By time of day");
        for bucket in ctx.time_of_day() {
            println!(
                "   {:02}:00  avg {:>4.1}  ({} entries)",
                bucket.hour, bucket.average_value, bucket.count
            );
        }
    }

    println!();
    println!("🔥 Streak");
    println!("   Current:  {} days", ctx.streak.current);
    println!("   Longest:  {} days", ctx.streak.longest);
    println!("   Logged:   {} days", ctx.streak.total_logged_days);

    println!();
    let trend = &ctx.trend;
    if trend.confident {
        let icon = match trend.direction {
            mood_core::TrendDirection::Improving => "📈",
            mood_core::TrendDirection::Declining => "📉",
            mood_core::TrendDirection::Stable => "➡️",
        };
        println!(
            "{} Trend: {} ({:+.1} across {} entries)",
            icon, trend.direction, trend.magnitude, trend.sample_size
        );
    } else {
        println!(
            "➡️  Trend: not enough entries ({} of {} needed)",
            trend.sample_size, min_samples
        );
    }
}
