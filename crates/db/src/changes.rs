//! Transactional change recording.
//!
//! Every airport mutation goes through [`ChangeRecorder`]. Inside one
//! transaction it loads the current row, applies a validated patch, writes one
//! audit row per field whose canonical value changed and exactly one snapshot
//! of the resulting row. Nothing is written if any step fails.

use chrono::Utc;
use flightclock_core::airport::{diff_fields, AirportField, AirportPatch, Blank, FieldValues};
use flightclock_core::audit::{rollback_patch, rollback_to_patch, ChangeKind, RecordedChange};
use flightclock_core::error::CoreError;
use flightclock_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::SqliteConnection;

use crate::models::airport::Airport;
use crate::models::audit::{AuditLog, CreateAuditLog};
use crate::models::snapshot::{CreateSnapshot, Snapshot};
use crate::repositories::{AirportRepo, AuditLogRepo, SnapshotRepo};
use crate::DbPool;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Who is changing what, and why.
#[derive(Debug, Clone)]
pub struct ChangeContext {
    pub kind: ChangeKind,
    pub user: Option<String>,
    pub reason: String,
}

impl ChangeContext {
    pub fn new(kind: ChangeKind, user: Option<&str>, reason: impl Into<String>) -> Self {
        Self {
            kind,
            user: user.map(str::to_string),
            reason: reason.into(),
        }
    }

    /// Label written to `changed_by`.
    pub fn actor(&self) -> Option<String> {
        self.kind.actor_label(self.user.as_deref())
    }
}

/// Everything one committed mutation wrote.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeOutcome {
    pub airport: Airport,
    pub changes: Vec<AuditLog>,
    pub snapshot: Snapshot,
}

/// Result of a point-in-time rollback.
#[derive(Debug, Clone)]
pub enum RollbackToOutcome {
    Applied(ChangeOutcome),
    /// No audit entries were recorded after the cutoff; nothing was written.
    NothingToRollBack(Airport),
}

#[derive(Debug, thiserror::Error)]
pub enum ChangeError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

// ---------------------------------------------------------------------------
// ChangeRecorder
// ---------------------------------------------------------------------------

/// The single write path for airport mutations.
pub struct ChangeRecorder;

impl ChangeRecorder {
    /// Insert a new airport. The audit trail records every assigned field
    /// against an empty "before" state.
    pub async fn create(
        pool: &DbPool,
        iata: &str,
        patch: &AirportPatch,
        ctx: &ChangeContext,
    ) -> Result<ChangeOutcome, ChangeError> {
        let mut tx = pool.begin().await?;

        if AirportRepo::find_by_iata(&mut *tx, iata).await?.is_some() {
            return Err(CoreError::Conflict(format!("Airport {iata} already exists")).into());
        }

        let now = Utc::now();
        let mut draft = Airport::draft(iata.to_string(), now);
        draft.apply_patch(patch)?;
        if draft.timezone.is_empty() {
            return Err(CoreError::Validation("Field 'timezone' is required".into()).into());
        }

        let stored = AirportRepo::insert(&mut *tx, &draft).await?;
        let outcome = record(&mut tx, &Blank, stored, ctx, now).await?;
        tx.commit().await?;

        log_outcome(&outcome, ctx);
        Ok(outcome)
    }

    /// Apply a patch to an existing airport.
    pub async fn apply(
        pool: &DbPool,
        iata: &str,
        patch: &AirportPatch,
        ctx: &ChangeContext,
    ) -> Result<ChangeOutcome, ChangeError> {
        if patch.is_empty() {
            return Err(CoreError::Validation("No valid fields to update".into()).into());
        }

        let mut tx = pool.begin().await?;
        let airport = load(&mut tx, iata).await?;
        let outcome = apply_in_tx(&mut tx, airport, patch, ctx).await?;
        tx.commit().await?;

        log_outcome(&outcome, ctx);
        Ok(outcome)
    }

    /// Put the field touched by one audit entry back to its old value.
    pub async fn rollback_entry(
        pool: &DbPool,
        iata: &str,
        audit_id: DbId,
        ctx: &ChangeContext,
    ) -> Result<ChangeOutcome, ChangeError> {
        let mut tx = pool.begin().await?;

        let entry = AuditLogRepo::find_by_id(&mut *tx, audit_id)
            .await?
            .filter(|e| e.iata == iata)
            .ok_or_else(|| CoreError::not_found("AuditLog", audit_id))?;
        let airport = load(&mut tx, iata).await?;

        let patch = rollback_patch(&entry.recorded_change())?;
        let outcome = apply_in_tx(&mut tx, airport, &patch, ctx).await?;
        tx.commit().await?;

        tracing::info!(iata, audit_id, "Audit entry rolled back");
        log_outcome(&outcome, ctx);
        Ok(outcome)
    }

    /// Revert every change recorded after `cutoff`, restoring each touched
    /// field to the value it held at the cutoff.
    pub async fn rollback_to(
        pool: &DbPool,
        iata: &str,
        cutoff: Timestamp,
        ctx: &ChangeContext,
    ) -> Result<RollbackToOutcome, ChangeError> {
        let mut tx = pool.begin().await?;
        let airport = load(&mut tx, iata).await?;

        let entries = AuditLogRepo::list_after(&mut *tx, iata, cutoff).await?;
        if entries.is_empty() {
            tracing::debug!(iata, %cutoff, "Nothing recorded after cutoff");
            return Ok(RollbackToOutcome::NothingToRollBack(airport));
        }

        let recorded: Vec<RecordedChange> = entries.iter().map(AuditLog::recorded_change).collect();
        let patch = rollback_to_patch(&recorded)?;
        let outcome = apply_in_tx(&mut tx, airport, &patch, ctx).await?;
        tx.commit().await?;

        tracing::info!(iata, %cutoff, entries = entries.len(), "Airport rolled back to cutoff");
        log_outcome(&outcome, ctx);
        Ok(RollbackToOutcome::Applied(outcome))
    }

    /// Copy the editable fields of a stored snapshot back onto the airport.
    pub async fn restore_snapshot(
        pool: &DbPool,
        iata: &str,
        snapshot_id: DbId,
        ctx: &ChangeContext,
    ) -> Result<ChangeOutcome, ChangeError> {
        let mut tx = pool.begin().await?;

        let snapshot = SnapshotRepo::find_by_id(&mut *tx, snapshot_id)
            .await?
            .filter(|s| s.iata == iata)
            .ok_or_else(|| CoreError::not_found("Snapshot", snapshot_id))?;
        let airport = load(&mut tx, iata).await?;

        let data = snapshot.data.as_object().ok_or_else(|| {
            CoreError::Internal(format!("Snapshot {snapshot_id} does not hold an object"))
        })?;
        let patch = AirportPatch::from_json(data)?;
        let outcome = apply_in_tx(&mut tx, airport, &patch, ctx).await?;
        tx.commit().await?;

        tracing::info!(iata, snapshot_id, "Snapshot restored");
        log_outcome(&outcome, ctx);
        Ok(outcome)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load(conn: &mut SqliteConnection, iata: &str) -> Result<Airport, ChangeError> {
    AirportRepo::find_by_iata(&mut *conn, iata)
        .await?
        .ok_or_else(|| CoreError::not_found("Airport", iata).into())
}

async fn apply_in_tx(
    conn: &mut SqliteConnection,
    airport: Airport,
    patch: &AirportPatch,
    ctx: &ChangeContext,
) -> Result<ChangeOutcome, ChangeError> {
    let now = Utc::now();
    let mut next = airport.clone();
    next.apply_patch(patch)?;
    next.updated_at = now;

    let stored = AirportRepo::update(&mut *conn, &next).await?;
    record(conn, &airport, stored, ctx, now).await
}

/// Write the audit rows for `before -> after` and the snapshot of `after`.
async fn record<B: FieldValues>(
    conn: &mut SqliteConnection,
    before: &B,
    after: Airport,
    ctx: &ChangeContext,
    now: Timestamp,
) -> Result<ChangeOutcome, ChangeError> {
    let actor = ctx.actor();

    let mut changes = Vec::new();
    for change in diff_fields(before, &after, AirportField::ALL) {
        let entry = CreateAuditLog {
            iata: after.iata.clone(),
            field: change.field.as_str().to_string(),
            old_value: change.old_value,
            new_value: change.new_value,
            changed_by: actor.clone(),
            reason: ctx.reason.clone(),
            changed_at: now,
        };
        changes.push(AuditLogRepo::insert(&mut *conn, &entry).await?);
    }

    let data = serde_json::to_value(&after)
        .map_err(|e| CoreError::Internal(format!("Failed to serialize snapshot: {e}")))?;
    let snapshot = SnapshotRepo::insert(
        &mut *conn,
        &CreateSnapshot {
            iata: after.iata.clone(),
            data,
            changed_by: actor,
            changed_at: now,
        },
    )
    .await?;

    Ok(ChangeOutcome {
        airport: after,
        changes,
        snapshot,
    })
}

fn log_outcome(outcome: &ChangeOutcome, ctx: &ChangeContext) {
    tracing::info!(
        iata = %outcome.airport.iata,
        kind = %ctx.kind,
        actor = ctx.actor().as_deref().unwrap_or("-"),
        changed_fields = outcome.changes.len(),
        snapshot_id = outcome.snapshot.id,
        "Airport change recorded",
    );
}
