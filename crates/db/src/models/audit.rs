//! Audit log entity model and DTOs.
//!
//! Audit rows are append-only: one row per field whose canonical value
//! changed in a mutation. They have no `updated_at`.

use flightclock_core::audit::RecordedChange;
use flightclock_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Audit log entity
// ---------------------------------------------------------------------------

/// A single audit log entry.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct AuditLog {
    pub id: DbId,
    pub iata: String,
    pub field: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub changed_by: Option<String>,
    pub reason: String,
    pub changed_at: Timestamp,
}

impl AuditLog {
    pub fn recorded_change(&self) -> RecordedChange {
        RecordedChange {
            id: self.id,
            field: self.field.clone(),
            old_value: self.old_value.clone(),
            changed_at: self.changed_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// DTO for inserting a new audit log entry.
#[derive(Debug, Clone)]
pub struct CreateAuditLog {
    pub iata: String,
    pub field: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub changed_by: Option<String>,
    pub reason: String,
    pub changed_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Filters for querying the audit trail of one airport.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditQuery {
    /// Exact field name.
    pub field: Option<String>,
    /// Case-insensitive substring of `changed_by`.
    pub user: Option<String>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}
