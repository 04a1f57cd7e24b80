//! Insight store with connection pooling and migrations
//!
//! - `insights` - save with dedup suppression, list, read, archive

use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::error::Result;

mod insights;

pub use insights::{InsightQuery, Page, SaveSummary};

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Stored timestamp format; sorts lexicographically in time order
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// How long a writer waits on a locked database before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

/// Parse a stored datetime string into a DateTime<Utc>
pub(crate) fn parse_datetime(s: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).map(|dt| dt.and_utc())
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Open (or create) the store at `path` and run migrations
    pub fn new(path: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path)
            .with_init(|conn| conn.busy_timeout(BUSY_TIMEOUT));
        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a throwaway database (for testing)
    ///
    /// Uses a temporary file rather than `:memory:` so every pooled
    /// connection sees the same data.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "mood_test_{}_{}.db",
            std::process::id(),
            id
        ));

        // Remove any existing file
        let _ = std::fs::remove_file(&path);

        Self::new(&path.to_string_lossy())
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL mode: readers don't block the writer
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;

            -- Generated insights
            CREATE TABLE IF NOT EXISTS insights (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                rule_id TEXT NOT NULL,
                dedup_key TEXT NOT NULL,
                insight_type TEXT NOT NULL,        -- recommendation, warning, celebration, pattern, milestone
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                priority TEXT NOT NULL,            -- low, medium, high
                actionable BOOLEAN NOT NULL DEFAULT 0,
                is_read BOOLEAN NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                expires_at TEXT,                   -- NULL = never expires
                archived_at TEXT,
                UNIQUE(user_id, rule_id, dedup_key)
            );

            CREATE INDEX IF NOT EXISTS idx_insights_user ON insights(user_id, is_read);
            CREATE INDEX IF NOT EXISTS idx_insights_user_rule ON insights(user_id, rule_id);
            CREATE INDEX IF NOT EXISTS idx_insights_expires ON insights(expires_at);
            "#,
        )?;

        info!(path = %self.db_path, "Database migrations complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_in_memory_db() {
        let db = Database::in_memory().unwrap();
        let conn = db.conn().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM insights", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mood.db");
        let path = path.to_string_lossy();

        Database::new(&path).unwrap();
        let reopened = Database::new(&path).unwrap();
        assert_eq!(reopened.path(), path);
    }

    #[test]
    fn test_datetime_format_round_trip() {
        let at = Utc.with_ymd_and_hms(2026, 10, 18, 7, 30, 0).unwrap();
        let stored = format_datetime(at);
        assert_eq!(stored, "2026-10-18 07:30:00");
        assert_eq!(parse_datetime(&stored).unwrap(), at);
        assert!(parse_datetime("yesterday").is_err());
    }
}
