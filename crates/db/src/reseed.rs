//! Writing reseed chunks.
//!
//! Reseeding bypasses the audit trail: it replaces reference data wholesale
//! and writes neither audit rows nor snapshots.

use chrono::Utc;
use flightclock_core::reseed::SeedAirport;

use crate::repositories::{AirportRepo, AuditLogRepo, SnapshotRepo};
use crate::DbPool;

/// What one chunk write did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkWritten {
    /// Airports removed by a reset. Zero when `reset` was false.
    pub cleared: u64,
    /// Rows upserted from the chunk.
    pub written: usize,
    /// Airports in the table after the chunk committed.
    pub count: i64,
}

/// Upsert one chunk of seed rows in a single transaction.
///
/// With `reset`, airports, audit logs and snapshots are all cleared first,
/// in the same transaction.
pub async fn write_chunk(
    pool: &DbPool,
    rows: &[SeedAirport],
    reset: bool,
) -> Result<ChunkWritten, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let mut cleared = 0;
    if reset {
        SnapshotRepo::delete_all(&mut *tx).await?;
        AuditLogRepo::delete_all(&mut *tx).await?;
        cleared = AirportRepo::delete_all(&mut *tx).await?;
        tracing::warn!(cleared, "Reseed reset cleared airports, audit logs and snapshots");
    }

    let now = Utc::now();
    for row in rows {
        AirportRepo::upsert_seed(&mut *tx, row, now).await?;
    }

    let count = AirportRepo::count(&mut *tx, None).await?;
    tx.commit().await?;

    tracing::info!(written = rows.len(), count, "Reseed chunk written");
    Ok(ChunkWritten {
        cleared,
        written: rows.len(),
        count,
    })
}
