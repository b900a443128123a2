//! Analytics query layer — reads from the existing `dreams` table.
//!
//! Each method is an independent read; the aggregator does not require
//! transactional consistency across them (read-committed staleness between
//! sub-queries is acceptable).

use anyhow::{Context as _, Result};
use sqlx::SqlitePool;

/// Read-only aggregate queries over one user's dreams.
pub struct AnalyticsStorage {
    pool: SqlitePool,
}

impl AnalyticsStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Count of all owned dreams, regardless of date or visibility.
    pub async fn total_dreams(&self, user_id: &str) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM dreams WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .context("total dream count")?;
        Ok(count as u64)
    }

    /// Count of owned dreams created in the given calendar month
    /// (`month` is `YYYY-MM`).
    pub async fn dreams_in_month(&self, user_id: &str, month: &str) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM dreams
              WHERE user_id = ? AND strftime('%Y-%m', created_at) = ?",
        )
        .bind(user_id)
        .bind(month)
        .fetch_one(&self.pool)
        .await
        .context("this-month dream count")?;
        Ok(count as u64)
    }

    /// Per-mood group counts, descending by count.
    ///
    /// Ties order lexicographically ascending by mood, with the absent-mood
    /// (NULL) group first — SQLite sorts NULL first under `ASC`, which pins
    /// the documented deterministic tie-break.
    pub async fn mood_counts(&self, user_id: &str) -> Result<Vec<(Option<String>, i64)>> {
        let rows: Vec<(Option<String>, i64)> = sqlx::query_as(
            "SELECT mood, COUNT(*) AS cnt
               FROM dreams
              WHERE user_id = ?
           GROUP BY mood
           ORDER BY cnt DESC, mood ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("mood group counts")?;
        Ok(rows)
    }

    /// Daily dream counts for owned dreams created on or after `from_date`
    /// (`YYYY-MM-DD`), ascending by day. Days with no dreams are absent —
    /// the aggregator zero-fills the window.
    pub async fn daily_counts(&self, user_id: &str, from_date: &str) -> Result<Vec<(String, i64)>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT date(created_at) AS day, COUNT(*) AS cnt
               FROM dreams
              WHERE user_id = ? AND date(created_at) >= ?
           GROUP BY day
           ORDER BY day ASC",
        )
        .bind(user_id)
        .bind(from_date)
        .fetch_all(&self.pool)
        .await
        .context("daily dream counts")?;
        Ok(rows)
    }

    /// The raw tags column of every owned dream, in deterministic
    /// `(created_at, id)` order. This scan order defines "first seen" for
    /// the tag tie-break.
    pub async fn tag_columns(&self, user_id: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT tags FROM dreams WHERE user_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("tag columns")?;
        Ok(rows.into_iter().map(|(t,)| t).collect())
    }
}
