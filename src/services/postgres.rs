use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Relationship kinds that remove a pair from each other's candidate pools
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "exclusion_kind", rename_all = "lowercase")]
pub enum ExclusionKind {
    Connected,
    Blocked,
}

impl From<crate::models::ExclusionKind> for ExclusionKind {
    fn from(value: crate::models::ExclusionKind) -> Self {
        match value {
            crate::models::ExclusionKind::Connected => ExclusionKind::Connected,
            crate::models::ExclusionKind::Blocked => ExclusionKind::Blocked,
        }
    }
}

/// Record of an excluded pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exclusion {
    pub user_id: String,
    pub target_user_id: String,
    pub kind: ExclusionKind,
    pub recorded_at: chrono::DateTime<chrono::Utc>,
}

/// PostgreSQL client for tracking match exclusions
///
/// The main application lives on Appwrite; this service keeps its own small
/// table of connected/blocked pairs so candidate pools never resurface a
/// user someone already matched with or blocked.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
        )
        .await
    }

    /// Record an exclusion between two users
    ///
    /// Uses INSERT ... ON CONFLICT so repeated events for the same pair
    /// update the kind and timestamp instead of failing.
    pub async fn record_exclusion(
        &self,
        user_id: &str,
        target_user_id: &str,
        kind: ExclusionKind,
    ) -> Result<(), PostgresError> {
        let query = r#"
            INSERT INTO match_exclusions (user_id, target_user_id, kind, recorded_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (user_id, target_user_id)
            DO UPDATE SET
                kind = EXCLUDED.kind,
                recorded_at = EXCLUDED.recorded_at
        "#;

        sqlx::query(query)
            .bind(user_id)
            .bind(target_user_id)
            .bind(&kind)
            .execute(&self.pool)
            .await?;

        tracing::debug!(
            "Recorded exclusion: {} -> {} ({:?})",
            user_id,
            target_user_id,
            kind
        );

        Ok(())
    }

    /// Get all user IDs excluded from the given user's candidate pool, in
    /// either direction: a block by B removes A from B's pool and B from
    /// A's.
    pub async fn get_exclusions(&self, user_id: &str) -> Result<Vec<String>, PostgresError> {
        let query = r#"
            SELECT target_user_id AS other
            FROM match_exclusions
            WHERE user_id = $1
            UNION
            SELECT user_id AS other
            FROM match_exclusions
            WHERE target_user_id = $1
        "#;

        let rows = sqlx::query(query).bind(user_id).fetch_all(&self.pool).await?;

        let excluded: Vec<String> = rows.iter().map(|row| row.get("other")).collect();

        tracing::debug!("User {} has {} excluded users", user_id, excluded.len());

        Ok(excluded)
    }

    /// Remove an exclusion record (e.g. a block was lifted)
    pub async fn remove_exclusion(
        &self,
        user_id: &str,
        target_user_id: &str,
    ) -> Result<bool, PostgresError> {
        let query = r#"
            DELETE FROM match_exclusions
            WHERE user_id = $1 AND target_user_id = $2
        "#;

        let result = sqlx::query(query)
            .bind(user_id)
            .bind(target_user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Get statistics about a user's exclusions
    pub async fn get_exclusion_stats(&self, user_id: &str) -> Result<ExclusionStats, PostgresError> {
        let query = r#"
            SELECT
                COUNT(*) as total,
                COUNT(*) FILTER (WHERE kind = 'connected') as connected,
                COUNT(*) FILTER (WHERE kind = 'blocked') as blocked,
                MAX(recorded_at) as last_recorded_at
            FROM match_exclusions
            WHERE user_id = $1
        "#;

        let row = sqlx::query(query).bind(user_id).fetch_one(&self.pool).await?;

        Ok(ExclusionStats {
            user_id: user_id.to_string(),
            total: row.get("total"),
            connected: row.get("connected"),
            blocked: row.get("blocked"),
            last_recorded_at: row.get("last_recorded_at"),
        })
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

/// Statistics about a user's exclusions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExclusionStats {
    pub user_id: String,
    pub total: i64,
    pub connected: i64,
    pub blocked: i64,
    pub last_recorded_at: Option<chrono::DateTime<chrono::Utc>>,
}
