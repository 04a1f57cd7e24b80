//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Mood - insights and analytics for self-reported mood data
#[derive(Parser)]
#[command(name = "mood")]
#[command(about = "Mood statistics, streaks, trends, and insights", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Insight store path
    #[arg(long, default_value = "mood.db", global = true)]
    pub db: PathBuf,

    /// Engine config file (defaults to the data-dir override, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the records come from and which slice of them to analyze
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Mood record file (.csv or .json)
    #[arg(short, long)]
    pub records: PathBuf,

    /// Activity log file (.csv or .json); extends streaks
    #[arg(short, long)]
    pub activities: Option<PathBuf>,

    /// File format when the extension is not .csv/.json: csv, json
    #[arg(long)]
    pub format: Option<String>,

    /// User whose records to analyze (rows for other users in the input
    /// files are skipped)
    #[arg(short, long)]
    pub user: String,

    /// Period: last-7-days, last-30-days, last-90-days, last-180-days, last-365-days, all
    #[arg(short, long, default_value = "last-30-days")]
    pub period: String,

    /// Custom start date (YYYY-MM-DD), overrides --period
    #[arg(long)]
    pub from: Option<String>,

    /// Custom end date (YYYY-MM-DD), defaults to the --as-of day
    #[arg(long)]
    pub to: Option<String>,

    /// Rollup granularity: day, week, month (config default if omitted)
    #[arg(short, long)]
    pub granularity: Option<String>,

    /// Evaluation time: YYYY-MM-DD (end of that day) or RFC 3339; defaults to now
    #[arg(long)]
    pub as_of: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the insight store
    Init,

    /// Show statistics, streak, and trend for a user's records
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate and manage insights
    Insights {
        #[command(subcommand)]
        action: InsightsAction,
    },

    /// List the active insight rules
    Rules,
}

#[derive(Subcommand)]
pub enum InsightsAction {
    /// Run the rule engine and store new insights
    Generate {
        #[command(flatten)]
        input: InputArgs,

        /// Print insights without storing them
        #[arg(long)]
        dry_run: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List stored insights for a user
    List {
        /// User id
        #[arg(short, long)]
        user: String,

        /// Only unread insights
        #[arg(long)]
        unread: bool,

        /// Page number (1-based)
        #[arg(long, default_value = "1")]
        page: u32,

        /// Insights per page
        #[arg(long, default_value = "20")]
        per_page: u32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Mark an insight as read
    Read {
        /// User id
        #[arg(short, long)]
        user: String,

        /// Insight id
        id: String,
    },

    /// Archive insights past their expiry
    Archive,
}
