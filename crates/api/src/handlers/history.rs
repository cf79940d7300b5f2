//! Handlers for an airport's change history: audit trail, snapshots, and
//! the rollback / rollback-to / restore actions. All admin-only.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use flightclock_core::airport::normalize_iata;
use flightclock_core::audit::{parse_timestamp, require_reason, ChangeKind};
use flightclock_core::types::DbId;
use flightclock_db::changes::{ChangeContext, ChangeRecorder, RollbackToOutcome};
use flightclock_db::models::audit::{AuditLog, AuditQuery};
use flightclock_db::models::snapshot::Snapshot;
use flightclock_db::repositories::{AuditLogRepo, SnapshotRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::RequireAdmin;
use crate::query::{lenient_i64, AuditParams, HistoryParams, TakeParams};
use crate::request::{body_reason, json_object};
use crate::response::{ChangeResponse, NothingToRollBack};
use crate::state::AppState;

/// GET /api/v1/airports/{iata}/audit?field=&user=&from=&to=
///
/// Newest first. Unparseable `from`/`to` values are ignored.
pub async fn list_audit(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(iata): Path<String>,
    Query(params): Query<AuditParams>,
) -> AppResult<Json<Vec<AuditLog>>> {
    let iata = normalize_iata(&iata)?;
    let query = AuditQuery {
        field: params.field,
        user: params.user,
        from: params.from.as_deref().and_then(parse_timestamp),
        to: params.to.as_deref().and_then(parse_timestamp),
    };
    let logs = AuditLogRepo::query(&state.pool, &iata, &query).await?;
    Ok(Json(logs))
}

/// GET /api/v1/airports/{iata}/snapshots?take=
pub async fn list_snapshots(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(iata): Path<String>,
    Query(params): Query<TakeParams>,
) -> AppResult<Json<Vec<Snapshot>>> {
    let iata = normalize_iata(&iata)?;
    let take = lenient_i64(params.take.as_deref());
    let snapshots = SnapshotRepo::list_by_iata(&state.pool, &iata, take).await?;
    Ok(Json(snapshots))
}

/// POST /api/v1/airports/{iata}/rollback?id=&reason=
///
/// Revert the single field recorded by one audit entry.
pub async fn rollback(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(iata): Path<String>,
    Query(params): Query<HistoryParams>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<ChangeResponse>> {
    let iata = normalize_iata(&iata)?;
    let reason = resolve_reason(&headers, &body, &params)?;
    let audit_id = required_id(&params, "Provide ?id=<auditLogId>")?;

    let ctx = ChangeContext::new(ChangeKind::Rollback, Some(&admin.username), reason);
    let outcome = ChangeRecorder::rollback_entry(&state.pool, &iata, audit_id, &ctx).await?;
    Ok(Json(outcome.into()))
}

/// POST /api/v1/airports/{iata}/rollback-to?at=&reason=
///
/// Revert everything recorded after `at`.
pub async fn rollback_to(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(iata): Path<String>,
    Query(params): Query<HistoryParams>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Response> {
    let iata = normalize_iata(&iata)?;
    let reason = resolve_reason(&headers, &body, &params)?;
    let at = params
        .at
        .as_deref()
        .and_then(parse_timestamp)
        .ok_or_else(|| AppError::BadRequest("Provide a valid ?at=ISO-8601 timestamp".into()))?;

    let ctx = ChangeContext::new(ChangeKind::RollbackTo, Some(&admin.username), reason);
    let response = match ChangeRecorder::rollback_to(&state.pool, &iata, at, &ctx).await? {
        RollbackToOutcome::Applied(outcome) => {
            let mut body = ChangeResponse::from(outcome);
            body.at = Some(at);
            Json(body).into_response()
        }
        RollbackToOutcome::NothingToRollBack(airport) => Json(NothingToRollBack {
            ok: true,
            message: "No changes after the specified time; nothing to roll back.",
            airport,
        })
        .into_response(),
    };
    Ok(response)
}

/// POST /api/v1/airports/{iata}/restore?id=&reason=
///
/// Copy the editable fields of a snapshot back onto the airport.
pub async fn restore(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(iata): Path<String>,
    Query(params): Query<HistoryParams>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<ChangeResponse>> {
    let iata = normalize_iata(&iata)?;
    let reason = resolve_reason(&headers, &body, &params)?;
    let snapshot_id = required_id(&params, "Provide ?id=<snapshotId>")?;

    let ctx = ChangeContext::new(ChangeKind::RestoreSnapshot, Some(&admin.username), reason);
    let outcome =
        ChangeRecorder::restore_snapshot(&state.pool, &iata, snapshot_id, &ctx).await?;
    Ok(Json(outcome.into()))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn resolve_reason(headers: &HeaderMap, body: &Bytes, params: &HistoryParams) -> AppResult<String> {
    let body = json_object(headers, body)?;
    Ok(require_reason(body_reason(&body), params.reason.as_deref())?)
}

fn required_id(params: &HistoryParams, hint: &str) -> AppResult<DbId> {
    lenient_i64(params.id.as_deref()).ok_or_else(|| AppError::BadRequest(hint.to_string()))
}
