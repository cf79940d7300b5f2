//! Repository for the `snapshots` table.

use flightclock_core::types::DbId;
use sqlx::SqliteExecutor;

use crate::models::snapshot::{CreateSnapshot, Snapshot};

/// Column list for `snapshots` SELECT queries.
const COLUMNS: &str = "id, iata, data, changed_by, changed_at";

pub const DEFAULT_SNAPSHOT_TAKE: i64 = 50;
pub const MAX_SNAPSHOT_TAKE: i64 = 200;

/// Provides insert and query operations for snapshots.
pub struct SnapshotRepo;

impl SnapshotRepo {
    pub async fn insert<'e, E: SqliteExecutor<'e>>(
        executor: E,
        snapshot: &CreateSnapshot,
    ) -> Result<Snapshot, sqlx::Error> {
        let query = format!(
            "INSERT INTO snapshots (iata, data, changed_by, changed_at) \
             VALUES (?, ?, ?, ?) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Snapshot>(&query)
            .bind(&snapshot.iata)
            .bind(&snapshot.data)
            .bind(&snapshot.changed_by)
            .bind(snapshot.changed_at)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e, E: SqliteExecutor<'e>>(
        executor: E,
        id: DbId,
    ) -> Result<Option<Snapshot>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM snapshots WHERE id = ?");
        sqlx::query_as::<_, Snapshot>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Snapshots of one airport, newest first. `take` defaults to
    /// [`DEFAULT_SNAPSHOT_TAKE`] and is clamped to `1..=MAX_SNAPSHOT_TAKE`.
    pub async fn list_by_iata<'e, E: SqliteExecutor<'e>>(
        executor: E,
        iata: &str,
        take: Option<i64>,
    ) -> Result<Vec<Snapshot>, sqlx::Error> {
        let take = take.unwrap_or(DEFAULT_SNAPSHOT_TAKE).clamp(1, MAX_SNAPSHOT_TAKE);
        let query = format!(
            "SELECT {COLUMNS} FROM snapshots WHERE iata = ? \
             ORDER BY changed_at DESC, id DESC LIMIT ?"
        );
        sqlx::query_as::<_, Snapshot>(&query)
            .bind(iata)
            .bind(take)
            .fetch_all(executor)
            .await
    }

    pub async fn delete_all<'e, E: SqliteExecutor<'e>>(executor: E) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM snapshots").execute(executor).await?;
        Ok(result.rows_affected())
    }
}
