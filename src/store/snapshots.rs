//! Append-only engagement history.

use sqlx::FromRow;
use tracing::instrument;

use crate::db::Database;
use crate::engagement::SnapshotFields;

use super::Result;

/// One point-in-time engagement measurement for a URL.
///
/// Count columns are `None` when the upstream response did not carry the
/// field; that is distinct from a reported zero.
#[derive(Debug, Clone, FromRow)]
pub struct EngagementSnapshot {
    /// Unique identifier.
    pub id: i64,
    /// Measured URL row.
    pub url_id: i64,
    /// Raw upstream response body.
    pub response: Option<String>,
    /// Reaction count.
    pub reactions: Option<i64>,
    /// Share count.
    pub shares: Option<i64>,
    /// Comment count.
    pub comments: Option<i64>,
    /// Comments-plugin count from the canonical object.
    pub plugin_comments: Option<i64>,
    /// Capture time assigned by the store (`YYYY-MM-DDTHH:MM:SS.sssZ`).
    pub captured_at: String,
}

/// Append-only snapshot store.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    db: Database,
}

impl SnapshotStore {
    /// Creates a store over the given database.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Appends a snapshot for a successful fetch.
    ///
    /// The capture timestamp comes from the database clock and is clamped to
    /// the URL's latest existing capture, so sequential appends never go
    /// backwards in time.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`](super::StoreError::Database) if the insert fails
    /// (including a foreign-key failure when the URL was purged).
    #[instrument(skip(self, captured), fields(url_id = captured.url_id))]
    pub async fn append(&self, captured: &SnapshotFields) -> Result<EngagementSnapshot> {
        let snapshot = sqlx::query_as::<_, EngagementSnapshot>(
            r"INSERT INTO engagement_snapshot (
                url_id,
                response,
                reactions,
                shares,
                comments,
                plugin_comments,
                captured_at
              )
              VALUES (?, ?, ?, ?, ?, ?, max(
                  strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                  COALESCE(
                      (SELECT MAX(captured_at) FROM engagement_snapshot WHERE url_id = ?),
                      ''
                  )
              ))
              RETURNING *",
        )
        .bind(captured.url_id)
        .bind(&captured.response)
        .bind(captured.reactions)
        .bind(captured.shares)
        .bind(captured.comments)
        .bind(captured.plugin_comments)
        .bind(captured.url_id)
        .fetch_one(self.db.pool())
        .await?;

        Ok(snapshot)
    }

    /// Returns the engagement history of one URL, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`](super::StoreError::Database) if the query fails.
    #[instrument(skip(self))]
    pub async fn history(&self, url_id: i64) -> Result<Vec<EngagementSnapshot>> {
        let snapshots = sqlx::query_as::<_, EngagementSnapshot>(
            r"SELECT * FROM engagement_snapshot
              WHERE url_id = ?
              ORDER BY captured_at ASC, id ASC",
        )
        .bind(url_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(snapshots)
    }

    /// Counts every stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`](super::StoreError::Database) if the query fails.
    #[instrument(skip(self))]
    pub async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM engagement_snapshot")
            .fetch_one(self.db.pool())
            .await?;

        Ok(count)
    }

    /// Counts the snapshots of one URL.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`](super::StoreError::Database) if the query fails.
    #[instrument(skip(self))]
    pub async fn count_for_url(&self, url_id: i64) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM engagement_snapshot WHERE url_id = ?",
        )
        .bind(url_id)
        .fetch_one(self.db.pool())
        .await?;

        Ok(count)
    }
}
