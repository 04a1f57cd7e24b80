//! Insight database operations

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, TransactionBehavior};
use serde::Serialize;

use super::{format_datetime, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::insights::{Insight, InsightType, Priority};

/// Largest page size `list_insights` will return
const MAX_PER_PAGE: u32 = 100;

const INSIGHT_COLUMNS: &str = "id, user_id, rule_id, dedup_key, insight_type, title, description, \
     priority, actionable, is_read, created_at, expires_at";

/// Outcome of a `save_insights` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SaveSummary {
    pub inserted: usize,
    pub suppressed: usize,
}

/// Listing options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsightQuery {
    pub unread_only: bool,
    /// 1-based page number
    pub page: u32,
    pub per_page: u32,
}

impl Default for InsightQuery {
    fn default() -> Self {
        Self {
            unread_only: false,
            page: 1,
            per_page: 20,
        }
    }
}

/// One page of results plus the total across all pages
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: usize,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> usize {
        if self.per_page == 0 {
            return 0;
        }
        self.total.div_ceil(self.per_page as usize)
    }
}

impl Database {
    /// Persist generated insights, suppressing repeats.
    ///
    /// An insight is skipped when one with the same (user, rule, dedup key)
    /// was ever stored, or when the same (user, rule) still has an unread,
    /// unexpired, unarchived insight. The whole batch runs in one IMMEDIATE
    /// transaction so concurrent writers cannot both pass the checks.
    pub fn save_insights(&self, insights: &[Insight], now: DateTime<Utc>) -> Result<SaveSummary> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let now_str = format_datetime(now);
        let mut summary = SaveSummary::default();

        for insight in insights {
            let same_key: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM insights WHERE user_id = ? AND rule_id = ? AND dedup_key = ?)",
                params![insight.user_id, insight.rule_id, insight.dedup_key],
                |row| row.get(0),
            )?;

            let still_pending: bool = tx.query_row(
                r#"
                SELECT EXISTS(
                    SELECT 1 FROM insights
                    WHERE user_id = ? AND rule_id = ?
                      AND is_read = 0
                      AND archived_at IS NULL
                      AND (expires_at IS NULL OR expires_at > ?)
                )
                "#,
                params![insight.user_id, insight.rule_id, now_str],
                |row| row.get(0),
            )?;

            if same_key || still_pending {
                tracing::debug!(
                    rule = %insight.rule_id,
                    key = %insight.dedup_key,
                    "Insight suppressed"
                );
                summary.suppressed += 1;
                continue;
            }

            tx.execute(
                r#"
                INSERT INTO insights (
                    id, user_id, rule_id, dedup_key, insight_type, title, description,
                    priority, actionable, is_read, created_at, expires_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
                params![
                    insight.id,
                    insight.user_id,
                    insight.rule_id,
                    insight.dedup_key,
                    insight.insight_type.as_str(),
                    insight.title,
                    insight.description,
                    insight.priority.as_str(),
                    insight.actionable,
                    insight.is_read,
                    format_datetime(insight.created_at),
                    insight.expires_at.map(format_datetime),
                ],
            )?;
            summary.inserted += 1;
        }

        tx.commit()?;

        tracing::info!(
            inserted = summary.inserted,
            suppressed = summary.suppressed,
            "Insights saved"
        );
        Ok(summary)
    }

    /// List a user's visible insights (not archived, not expired)
    pub fn list_insights(
        &self,
        user_id: &str,
        query: InsightQuery,
        now: DateTime<Utc>,
    ) -> Result<Page<Insight>> {
        let conn = self.conn()?;
        let now_str = format_datetime(now);
        let page = query.page.max(1);
        let per_page = query.per_page.clamp(1, MAX_PER_PAGE);
        let offset = i64::from(page - 1) * i64::from(per_page);

        let total: i64 = conn.query_row(
            r#"
            SELECT COUNT(*) FROM insights
            WHERE user_id = ?1
              AND archived_at IS NULL
              AND (expires_at IS NULL OR expires_at > ?2)
              AND (?3 = 0 OR is_read = 0)
            "#,
            params![user_id, now_str, query.unread_only],
            |row| row.get(0),
        )?;

        let sql = format!(
            r#"
            SELECT {}
            FROM insights
            WHERE user_id = ?1
              AND archived_at IS NULL
              AND (expires_at IS NULL OR expires_at > ?2)
              AND (?3 = 0 OR is_read = 0)
            ORDER BY
                CASE priority
                    WHEN 'high' THEN 1
                    WHEN 'medium' THEN 2
                    ELSE 3
                END,
                created_at DESC,
                id
            LIMIT ?4 OFFSET ?5
            "#,
            INSIGHT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![
                user_id,
                now_str,
                query.unread_only,
                i64::from(per_page),
                offset
            ],
            row_to_insight,
        )?;
        let items = rows.collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Page {
            items,
            page,
            per_page,
            total: total as usize,
        })
    }

    /// Get a single insight owned by `user_id`
    pub fn get_insight(&self, user_id: &str, id: &str) -> Result<Option<Insight>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM insights WHERE user_id = ? AND id = ?",
            INSIGHT_COLUMNS
        );
        Ok(conn
            .query_row(&sql, params![user_id, id], row_to_insight)
            .optional()?)
    }

    /// Mark an insight as read. There is no way back to unread.
    pub fn mark_insight_read(&self, user_id: &str, id: &str) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE insights SET is_read = 1 WHERE user_id = ? AND id = ?",
            params![user_id, id],
        )?;

        if updated == 0 {
            return Err(Error::NotFound(format!(
                "insight {} for user {}",
                id, user_id
            )));
        }
        Ok(())
    }

    /// Archive every insight whose expiry has passed
    pub fn archive_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let conn = self.conn()?;
        let now_str = format_datetime(now);
        let archived = conn.execute(
            r#"
            UPDATE insights SET archived_at = ?1
            WHERE archived_at IS NULL
              AND expires_at IS NOT NULL
              AND expires_at <= ?1
            "#,
            params![now_str],
        )?;

        tracing::info!(archived, "Expired insights archived");
        Ok(archived)
    }

    /// Count a user's unread, visible insights
    pub fn count_unread(&self, user_id: &str, now: DateTime<Utc>) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            r#"
            SELECT COUNT(*) FROM insights
            WHERE user_id = ?
              AND is_read = 0
              AND archived_at IS NULL
              AND (expires_at IS NULL OR expires_at > ?)
            "#,
            params![user_id, format_datetime(now)],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

fn conversion_error(
    idx: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

/// Helper to convert a row to Insight
fn row_to_insight(row: &rusqlite::Row) -> rusqlite::Result<Insight> {
    let insight_type_str: String = row.get(4)?;
    let priority_str: String = row.get(7)?;
    let created_str: String = row.get(10)?;
    let expires_str: Option<String> = row.get(11)?;

    let created_at = parse_datetime(&created_str).map_err(|e| conversion_error(10, e))?;
    let expires_at = expires_str
        .map(|s| parse_datetime(&s))
        .transpose()
        .map_err(|e| conversion_error(11, e))?;

    Ok(Insight {
        id: row.get(0)?,
        user_id: row.get(1)?,
        rule_id: row.get(2)?,
        dedup_key: row.get(3)?,
        insight_type: insight_type_str.parse().unwrap_or(InsightType::Pattern),
        title: row.get(5)?,
        description: row.get(6)?,
        priority: priority_str.parse().unwrap_or(Priority::Low),
        actionable: row.get(8)?,
        is_read: row.get(9)?,
        created_at,
        expires_at,
    })
}
