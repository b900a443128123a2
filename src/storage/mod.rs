//! SQLite persistence layer.
//!
//! Schema is bootstrapped with idempotent `CREATE TABLE IF NOT EXISTS`
//! statements on startup. Timestamps are RFC 3339 UTC strings. Dream tags are
//! stored as a JSON array in a TEXT column. The `reactions` table carries a
//! `UNIQUE(dream_id, user_id, kind)` constraint — it is the only concurrency
//! control the reaction toggle relies on.

use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteConnectOptions, ConnectOptions as _, SqlitePool};
use std::{path::Path, str::FromStr};
use uuid::Uuid;

/// Default timeout for individual SQLite queries.
/// Prevents hung queries from blocking the server indefinitely.
const QUERY_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Execute a future with the standard query timeout.
async fn with_timeout<T>(fut: impl std::future::Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(QUERY_TIMEOUT, fut).await {
        Ok(result) => result,
        Err(_) => Err(anyhow::anyhow!(
            "database query timed out after {}s",
            QUERY_TIMEOUT.as_secs()
        )),
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProfileRow {
    pub user_id: String,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DreamRow {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    /// NULL when the author recorded no mood; empty strings are normalised
    /// to NULL on write so "absent mood" is a single group in analytics.
    pub mood: Option<String>,
    /// JSON array of tag strings, e.g. `["flying","water"]`.
    pub tags: String,
    pub is_public: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl DreamRow {
    /// Parse the stored tags column. Anything that is not a JSON string
    /// array yields an empty list (mirrors the original's lenient handling).
    pub fn tags_vec(&self) -> Vec<String> {
        serde_json::from_str(&self.tags).unwrap_or_default()
    }
}

/// A public-feed row: dream plus author profile and heart count.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PublicDreamRow {
    pub id: String,
    pub title: String,
    pub content: String,
    pub mood: Option<String>,
    pub tags: String,
    pub created_at: String,
    pub username: String,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub heart_count: i64,
}

impl PublicDreamRow {
    pub fn tags_vec(&self) -> Vec<String> {
        serde_json::from_str(&self.tags).unwrap_or_default()
    }
}

#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub async fn new(data_dir: &Path) -> Result<Self> {
        Self::new_with_slow_query(data_dir, 0).await
    }

    /// Create storage with slow-query logging enabled.
    ///
    /// `slow_query_ms` is the threshold in milliseconds — queries exceeding it
    /// are logged at WARN level. Set to 0 to disable slow-query logging.
    pub async fn new_with_slow_query(data_dir: &Path, slow_query_ms: u64) -> Result<Self> {
        tokio::fs::create_dir_all(data_dir).await?;
        let db_path = data_dir.join("dreamd.db");
        let mut opts =
            SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", db_path.display()))?
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
                .create_if_missing(true);

        if slow_query_ms > 0 {
            opts = opts.log_slow_statements(
                log::LevelFilter::Warn,
                std::time::Duration::from_millis(slow_query_ms),
            );
        }

        let pool = SqlitePool::connect_with(opts).await?;
        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    /// Return a clone of the connection pool (cheap — Arc-backed).
    /// Used to create AnalyticsStorage sharing the same SQLite connection.
    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    async fn migrate(pool: &SqlitePool) -> Result<()> {
        let stmts = [
            "CREATE TABLE IF NOT EXISTS users (
                id            TEXT PRIMARY KEY,
                username      TEXT NOT NULL UNIQUE,
                email         TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at    TEXT NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS auth_tokens (
                token      TEXT PRIMARY KEY,
                user_id    TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at TEXT NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS profiles (
                user_id    TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
                full_name  TEXT,
                bio        TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS dreams (
                id         TEXT PRIMARY KEY,
                user_id    TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                title      TEXT NOT NULL,
                content    TEXT NOT NULL,
                mood       TEXT,
                tags       TEXT NOT NULL DEFAULT '[]',
                is_public  INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS reactions (
                id         TEXT PRIMARY KEY,
                dream_id   TEXT NOT NULL REFERENCES dreams(id) ON DELETE CASCADE,
                user_id    TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                kind       TEXT NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE(dream_id, user_id, kind)
            )",
            "CREATE INDEX IF NOT EXISTS idx_dreams_user ON dreams(user_id)",
            "CREATE INDEX IF NOT EXISTS idx_dreams_public ON dreams(is_public)",
            "CREATE INDEX IF NOT EXISTS idx_reactions_dream ON reactions(dream_id, kind)",
            "CREATE INDEX IF NOT EXISTS idx_tokens_user ON auth_tokens(user_id)",
        ];
        for stmt in stmts {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .context("schema bootstrap")?;
        }
        Ok(())
    }

    // ─── Users ──────────────────────────────────────────────────────────────

    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserRow> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        self.get_user(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("user not found after insert"))
    }

    pub async fn get_user(&self, id: &str) -> Result<Option<UserRow>> {
        Ok(sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        Ok(sqlx::query_as("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0 > 0)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0 > 0)
    }

    // ─── Auth tokens ────────────────────────────────────────────────────────

    /// Resolve a bearer token to its user. None for unknown tokens.
    pub async fn get_user_by_token(&self, token: &str) -> Result<Option<UserRow>> {
        Ok(sqlx::query_as(
            "SELECT u.* FROM users u
               JOIN auth_tokens t ON t.user_id = u.id
              WHERE t.token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Return the user's existing token, or persist `fresh` as their token.
    /// One live token per user, re-used across logins.
    pub async fn get_or_insert_token(&self, user_id: &str, fresh: &str) -> Result<String> {
        if let Some((token,)) =
            sqlx::query_as::<_, (String,)>("SELECT token FROM auth_tokens WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?
        {
            return Ok(token);
        }
        let now = Utc::now().to_rfc3339();
        sqlx::query("INSERT INTO auth_tokens (token, user_id, created_at) VALUES (?, ?, ?)")
            .bind(fresh)
            .bind(user_id)
            .bind(&now)
            .execute(&self.pool)
            .await?;
        Ok(fresh.to_string())
    }

    /// Delete all tokens for a user (logout).
    pub async fn delete_tokens_for_user(&self, user_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM auth_tokens WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ─── Profiles ───────────────────────────────────────────────────────────

    /// Fetch the user's profile, creating an empty one on first access.
    pub async fn get_or_create_profile(&self, user_id: &str) -> Result<ProfileRow> {
        if let Some(profile) = sqlx::query_as("SELECT * FROM profiles WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
        {
            return Ok(profile);
        }
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT OR IGNORE INTO profiles (user_id, created_at, updated_at) VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        Ok(sqlx::query_as("SELECT * FROM profiles WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?)
    }

    /// Partial profile update: `None` fields are left unchanged.
    pub async fn update_profile(
        &self,
        user_id: &str,
        full_name: Option<&str>,
        bio: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<ProfileRow> {
        let current = self.get_or_create_profile(user_id).await?;
        let full_name = full_name.or(current.full_name.as_deref());
        let bio = bio.or(current.bio.as_deref());
        sqlx::query(
            "UPDATE profiles SET full_name = ?, bio = ?, updated_at = ? WHERE user_id = ?",
        )
        .bind(full_name)
        .bind(bio)
        .bind(now.to_rfc3339())
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(sqlx::query_as("SELECT * FROM profiles WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?)
    }

    // ─── Dreams ─────────────────────────────────────────────────────────────

    #[allow(clippy::too_many_arguments)]
    pub async fn create_dream(
        &self,
        user_id: &str,
        title: &str,
        content: &str,
        mood: Option<&str>,
        tags: &[String],
        is_public: bool,
        now: DateTime<Utc>,
    ) -> Result<DreamRow> {
        let id = Uuid::new_v4().to_string();
        let now = now.to_rfc3339();
        // Empty mood collapses to NULL so analytics sees one "absent" group.
        let mood = mood.filter(|m| !m.is_empty());
        let tags_json = serde_json::to_string(tags)?;
        sqlx::query(
            "INSERT INTO dreams (id, user_id, title, content, mood, tags, is_public, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(title)
        .bind(content)
        .bind(mood)
        .bind(&tags_json)
        .bind(is_public)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        self.get_dream(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("dream not found after insert"))
    }

    pub async fn get_dream(&self, id: &str) -> Result<Option<DreamRow>> {
        Ok(sqlx::query_as("SELECT * FROM dreams WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Fetch a dream only when owned by `user_id`. Hides other users'
    /// dreams behind "not found".
    pub async fn get_dream_owned(&self, id: &str, user_id: &str) -> Result<Option<DreamRow>> {
        Ok(
            sqlx::query_as("SELECT * FROM dreams WHERE id = ? AND user_id = ?")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn list_dreams_for_user(&self, user_id: &str) -> Result<Vec<DreamRow>> {
        with_timeout(async {
            Ok(sqlx::query_as(
                "SELECT * FROM dreams WHERE user_id = ? ORDER BY created_at DESC, id DESC",
            )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
        })
        .await
    }

    /// Overwrite a dream's mutable fields (owner checked by the caller).
    #[allow(clippy::too_many_arguments)]
    pub async fn update_dream(
        &self,
        id: &str,
        title: &str,
        content: &str,
        mood: Option<&str>,
        tags: &[String],
        is_public: bool,
        now: DateTime<Utc>,
    ) -> Result<DreamRow> {
        let mood = mood.filter(|m| !m.is_empty());
        let tags_json = serde_json::to_string(tags)?;
        sqlx::query(
            "UPDATE dreams
                SET title = ?, content = ?, mood = ?, tags = ?, is_public = ?, updated_at = ?
              WHERE id = ?",
        )
        .bind(title)
        .bind(content)
        .bind(mood)
        .bind(&tags_json)
        .bind(is_public)
        .bind(now.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;
        self.get_dream(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("dream not found after update"))
    }

    /// Delete an owned dream. Returns `false` when no matching row existed.
    pub async fn delete_dream(&self, id: &str, user_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM dreams WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Public feed: every public dream, newest first, with author profile
    /// fields and the current heart count.
    pub async fn list_public_dreams(&self) -> Result<Vec<PublicDreamRow>> {
        with_timeout(async {
            Ok(sqlx::query_as(
                "SELECT d.id, d.title, d.content, d.mood, d.tags, d.created_at,
                        u.username, p.full_name, p.bio,
                        (SELECT COUNT(*) FROM reactions r
                          WHERE r.dream_id = d.id AND r.kind = 'heart') AS heart_count
                   FROM dreams d
                   JOIN users u ON u.id = d.user_id
              LEFT JOIN profiles p ON p.user_id = d.user_id
                  WHERE d.is_public = 1
               ORDER BY d.created_at DESC, d.id DESC",
            )
            .fetch_all(&self.pool)
            .await?)
        })
        .await
    }

    // ─── Reactions ──────────────────────────────────────────────────────────

    /// Remove the (dream, user, kind) reaction row if present.
    /// Returns `true` when a row was deleted.
    pub async fn delete_reaction(&self, dream_id: &str, user_id: &str, kind: &str) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM reactions WHERE dream_id = ? AND user_id = ? AND kind = ?")
                .bind(dream_id)
                .bind(user_id)
                .bind(kind)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert a reaction row, treating a uniqueness collision as a no-op.
    ///
    /// `INSERT OR IGNORE` is the race-resolution mechanism: when two
    /// concurrent adds collide, the loser's insert affects zero rows and the
    /// single existing row stands. Returns `true` if this call inserted.
    pub async fn insert_reaction_or_ignore(
        &self,
        dream_id: &str,
        user_id: &str,
        kind: &str,
    ) -> Result<bool> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let rows_affected = sqlx::query(
            "INSERT OR IGNORE INTO reactions (id, dream_id, user_id, kind, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(dream_id)
        .bind(user_id)
        .bind(kind)
        .bind(&now)
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(rows_affected > 0)
    }

    /// Current total count of `kind` reactions on a dream.
    pub async fn count_reactions(&self, dream_id: &str, kind: &str) -> Result<u64> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM reactions WHERE dream_id = ? AND kind = ?")
                .bind(dream_id)
                .bind(kind)
                .fetch_one(&self.pool)
                .await?;
        Ok(row.0 as u64)
    }
}
