//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the insight store
//! - `load_config` - Engine config resolution
//! - `cmd_init` - Initialize the insight store

use std::path::Path;

use anyhow::{Context, Result};
use mood_core::{config::default_config_path, db::Database, EngineConfig};

/// Open the insight store, creating it if needed
pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    Database::new(path_str).context("Failed to open database")
}

/// Load the engine config from `--config`, the data-dir override, or defaults
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let config = EngineConfig::load(path).context("Failed to load engine config")?;
    tracing::debug!(
        utc_offset_minutes = config.utc_offset_minutes,
        granularity = config.default_granularity.as_str(),
        "Engine config loaded"
    );
    Ok(config)
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing insight store at {}...", db_path.display());

    open_db(db_path)?;

    if let Some(path) = default_config_path() {
        if path.exists() {
            println!("   Config override: {}", path.display());
        } else {
            println!("   Using built-in config (override: {})", path.display());
        }
    }

    println!("✅ Insight store initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Analyze records: mood analyze --records moods.csv --user <ID>");
    println!("  2. Generate insights: mood insights generate --records moods.csv --user <ID>");

    Ok(())
}
