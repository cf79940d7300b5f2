//! Repository for the `audit_logs` table.

use flightclock_core::audit::{MAX_AUDIT_QUERY_ROWS, MAX_ROLLBACK_ENTRIES};
use flightclock_core::types::{DbId, Timestamp};
use sqlx::SqliteExecutor;

use crate::models::audit::{AuditLog, AuditQuery, CreateAuditLog};
use crate::repositories::airport_repo::escape_like;

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

/// Column list for `audit_logs` SELECT queries.
const COLUMNS: &str = "\
    id, iata, field, old_value, new_value, changed_by, reason, changed_at";

/// Column list for INSERT (excludes auto-generated `id`).
const INSERT_COLUMNS: &str = "\
    iata, field, old_value, new_value, changed_by, reason, changed_at";

// ---------------------------------------------------------------------------
// AuditLogRepo
// ---------------------------------------------------------------------------

/// Provides insert and query operations for audit logs.
pub struct AuditLogRepo;

impl AuditLogRepo {
    /// Append one audit entry.
    pub async fn insert<'e, E: SqliteExecutor<'e>>(
        executor: E,
        entry: &CreateAuditLog,
    ) -> Result<AuditLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO audit_logs ({INSERT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(&entry.iata)
            .bind(&entry.field)
            .bind(&entry.old_value)
            .bind(&entry.new_value)
            .bind(&entry.changed_by)
            .bind(&entry.reason)
            .bind(entry.changed_at)
            .fetch_one(executor)
            .await
    }

    /// Find an audit entry by its ID.
    pub async fn find_by_id<'e, E: SqliteExecutor<'e>>(
        executor: E,
        id: DbId,
    ) -> Result<Option<AuditLog>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM audit_logs WHERE id = ?");
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Audit trail of one airport, newest first, capped at
    /// [`MAX_AUDIT_QUERY_ROWS`].
    pub async fn query<'e, E: SqliteExecutor<'e>>(
        executor: E,
        iata: &str,
        params: &AuditQuery,
    ) -> Result<Vec<AuditLog>, sqlx::Error> {
        let (where_clause, bind_values) = build_audit_filter(iata, params);
        let query = format!(
            "SELECT {COLUMNS} FROM audit_logs {where_clause} \
             ORDER BY changed_at DESC, id DESC \
             LIMIT ?"
        );

        let mut q = sqlx::query_as::<_, AuditLog>(&query);
        for val in &bind_values {
            q = match val {
                BindValue::Text(v) => q.bind(v.as_str()),
                BindValue::Timestamp(v) => q.bind(*v),
            };
        }
        q.bind(MAX_AUDIT_QUERY_ROWS).fetch_all(executor).await
    }

    /// Entries of one airport recorded strictly after `cutoff`, oldest first,
    /// capped at [`MAX_ROLLBACK_ENTRIES`].
    pub async fn list_after<'e, E: SqliteExecutor<'e>>(
        executor: E,
        iata: &str,
        cutoff: Timestamp,
    ) -> Result<Vec<AuditLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM audit_logs \
             WHERE iata = ? AND changed_at > ? \
             ORDER BY changed_at ASC, id ASC \
             LIMIT ?"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(iata)
            .bind(cutoff)
            .bind(MAX_ROLLBACK_ENTRIES)
            .fetch_all(executor)
            .await
    }

    /// Remove every audit entry. Only a reseed reset does this.
    pub async fn delete_all<'e, E: SqliteExecutor<'e>>(executor: E) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM audit_logs").execute(executor).await?;
        Ok(result.rows_affected())
    }
}

// ---------------------------------------------------------------------------
// Filter building
// ---------------------------------------------------------------------------

/// Typed bind value for dynamically built queries.
#[derive(Debug, Clone, PartialEq)]
enum BindValue {
    Text(String),
    Timestamp(Timestamp),
}

/// Build the WHERE clause for an audit query. The IATA condition is always
/// present; blank filters are skipped.
fn build_audit_filter(iata: &str, params: &AuditQuery) -> (String, Vec<BindValue>) {
    let mut conditions: Vec<&str> = vec!["iata = ?"];
    let mut bind_values = vec![BindValue::Text(iata.to_string())];

    if let Some(field) = params.field.as_deref().map(str::trim).filter(|f| !f.is_empty()) {
        conditions.push("field = ?");
        bind_values.push(BindValue::Text(field.to_string()));
    }

    if let Some(user) = params.user.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
        conditions.push("changed_by LIKE ? ESCAPE '\\'");
        bind_values.push(BindValue::Text(format!("%{}%", escape_like(user))));
    }

    if let Some(from) = params.from {
        conditions.push("changed_at >= ?");
        bind_values.push(BindValue::Timestamp(from));
    }

    if let Some(to) = params.to {
        conditions.push("changed_at <= ?");
        bind_values.push(BindValue::Timestamp(to));
    }

    (format!("WHERE {}", conditions.join(" AND ")), bind_values)
}
