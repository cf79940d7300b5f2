//! Shared response types for mutating endpoints.

use flightclock_core::types::{DbId, Timestamp};
use flightclock_db::changes::ChangeOutcome;
use flightclock_db::models::airport::Airport;
use flightclock_db::models::audit::AuditLog;
use serde::Serialize;

/// Body returned by create, edit, rollback, rollback-to and restore.
#[derive(Debug, Serialize)]
pub struct ChangeResponse {
    pub ok: bool,
    pub updated: Airport,
    /// Audit entries written by this mutation.
    pub changes: Vec<AuditLog>,
    pub snapshot_id: DbId,
    /// Cutoff of a point-in-time rollback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at: Option<Timestamp>,
}

impl From<ChangeOutcome> for ChangeResponse {
    fn from(outcome: ChangeOutcome) -> Self {
        Self {
            ok: true,
            updated: outcome.airport,
            changes: outcome.changes,
            snapshot_id: outcome.snapshot.id,
            at: None,
        }
    }
}

/// Body returned when a point-in-time rollback finds nothing to undo.
#[derive(Debug, Serialize)]
pub struct NothingToRollBack {
    pub ok: bool,
    pub message: &'static str,
    pub airport: Airport,
}
