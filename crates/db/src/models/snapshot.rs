//! Snapshot entity model and DTOs.

use flightclock_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A full copy of an airport row taken right after a mutation.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Snapshot {
    pub id: DbId,
    pub iata: String,
    pub data: serde_json::Value,
    pub changed_by: Option<String>,
    pub changed_at: Timestamp,
}

/// DTO for inserting a new snapshot.
#[derive(Debug, Clone)]
pub struct CreateSnapshot {
    pub iata: String,
    pub data: serde_json::Value,
    pub changed_by: Option<String>,
    pub changed_at: Timestamp,
}
