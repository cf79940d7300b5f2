//! Audit and rollback bookkeeping rules.
//!
//! Covers the mandatory change reason, how the acting admin is labeled for
//! each kind of change, timestamp parsing for audit filters and cutoffs, and
//! reconstruction of rollback patches from audit entries.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use crate::airport::{AirportField, AirportPatch, FieldValue};
use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Maximum number of audit entries returned by a filtered audit query.
pub const MAX_AUDIT_QUERY_ROWS: i64 = 500;

/// Maximum number of entries considered by a point-in-time rollback.
pub const MAX_ROLLBACK_ENTRIES: i64 = 10_000;

// ---------------------------------------------------------------------------
// Reason
// ---------------------------------------------------------------------------

/// Resolve the mandatory change reason. A reason in the request body wins
/// over one in the query string; both are trimmed and blanks are ignored.
pub fn require_reason(
    body_reason: Option<&str>,
    query_reason: Option<&str>,
) -> Result<String, CoreError> {
    [body_reason, query_reason]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|r| !r.is_empty())
        .map(str::to_string)
        .ok_or_else(|| CoreError::Validation("Reason is required".into()))
}

// ---------------------------------------------------------------------------
// Change kinds and actor labels
// ---------------------------------------------------------------------------

/// The kind of mutation being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeKind {
    Create,
    Edit,
    Rollback,
    RollbackTo,
    RestoreSnapshot,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Rollback => "rollback",
            Self::RollbackTo => "rollback-to",
            Self::RestoreSnapshot => "restore-snapshot",
        }
    }

    /// Label written to `changed_by` on audit and snapshot rows.
    ///
    /// Direct edits record the user as-is. History operations append the
    /// operation in parentheses so they stand out in the trail, and still
    /// carry a label when no user is known.
    pub fn actor_label(&self, user: Option<&str>) -> Option<String> {
        let user = user.map(str::trim).filter(|u| !u.is_empty());
        match self {
            Self::Create | Self::Edit => user.map(str::to_string),
            _ => Some(match user {
                Some(u) => format!("{u} ({})", self.as_str()),
                None => format!("({})", self.as_str()),
            }),
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Parse a user-supplied timestamp.
///
/// Accepts RFC 3339 (`2024-03-01T10:00:00Z`), a naive date-time
/// (`2024-03-01T10:00` or with seconds, taken as UTC) or a bare date
/// (midnight UTC). Returns `None` for anything else.
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// ---------------------------------------------------------------------------
// Rollback reconstruction
// ---------------------------------------------------------------------------

/// The parts of an audit entry that rollback reconstruction needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedChange {
    pub id: DbId,
    pub field: String,
    pub old_value: FieldValue,
    pub changed_at: Timestamp,
}

fn field_of(change: &RecordedChange) -> Result<AirportField, CoreError> {
    AirportField::parse(&change.field).ok_or_else(|| {
        CoreError::Validation(format!(
            "Audit entry {} refers to non-editable field '{}'",
            change.id, change.field
        ))
    })
}

/// Patch that puts a single audited field back to its old value.
pub fn rollback_patch(change: &RecordedChange) -> Result<AirportPatch, CoreError> {
    let mut patch = AirportPatch::new();
    patch.set(field_of(change)?, change.old_value.clone())?;
    Ok(patch)
}

/// Patch that reverts every change made after a cutoff.
///
/// For each field touched after the cutoff the earliest recorded old value
/// is the value the field held at the cutoff, so entries are walked in
/// chronological order and the first one per field wins. The input order
/// does not matter.
pub fn rollback_to_patch(changes: &[RecordedChange]) -> Result<AirportPatch, CoreError> {
    let mut ordered: Vec<&RecordedChange> = changes.iter().collect();
    ordered.sort_by_key(|c| (c.changed_at, c.id));

    let mut patch = AirportPatch::new();
    for change in ordered {
        patch.set_if_absent(field_of(change)?, change.old_value.clone())?;
    }
    Ok(patch)
}
