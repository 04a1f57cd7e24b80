//! Mood CLI - insights and analytics for mood records
//!
//! Usage:
//!   mood init                                         Initialize the insight store
//!   mood analyze --records moods.csv --user u1        Statistics, streak, trend
//!   mood insights generate --records moods.csv -u u1  Run rules, store insights
//!   mood insights list --user u1 --unread             Show stored insights

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Analyze { input, json } => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_analyze(&config, &input, json)
        }
        Commands::Insights { action } => match action {
            InsightsAction::Generate {
                input,
                dry_run,
                json,
            } => {
                let config = commands::load_config(cli.config.as_deref())?;
                commands::cmd_insights_generate(&cli.db, &config, &input, dry_run, json)
            }
            InsightsAction::List {
                user,
                unread,
                page,
                per_page,
                json,
            } => {
                let db = commands::open_db(&cli.db)?;
                commands::cmd_insights_list(&db, &user, unread, page, per_page, json)
            }
            InsightsAction::Read { user, id } => {
                let db = commands::open_db(&cli.db)?;
                commands::cmd_insights_read(&db, &user, &id)
            }
            InsightsAction::Archive => {
                let db = commands::open_db(&cli.db)?;
                commands::cmd_insights_archive(&db)
            }
        },
        Commands::Rules => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_rules(&config)
        }
    }
}
