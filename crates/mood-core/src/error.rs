//! Error types for the mood engine

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid record {id}: {reason}")]
    InvalidRecord { id: String, reason: String },

    #[error("Duplicate record for user {user_id} on {date}")]
    DuplicateDate { user_id: String, date: NaiveDate },

    #[error("Record {id} belongs to user {found}, expected {expected}")]
    UserMismatch {
        id: String,
        expected: String,
        found: String,
    },

    #[error("Invalid window: {0}")]
    InvalidWindow(String),

    #[error("Rule {rule_id} failed: {message}")]
    Rule { rule_id: String, message: String },

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
