//! Handlers for the `/airports` resource: public lookups plus admin create
//! and edit.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use flightclock_core::airport::{normalize_iata, AirportPatch, NewAirport};
use flightclock_core::audit::{require_reason, ChangeKind};
use flightclock_core::error::CoreError;
use flightclock_db::changes::{ChangeContext, ChangeRecorder};
use flightclock_db::models::airport::Airport;
use flightclock_db::repositories::AirportRepo;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::RequireAdmin;
use crate::query::{lenient_i64, ReasonParams, SearchParams};
use crate::request::{body_reason, json_object};
use crate::response::ChangeResponse;
use crate::state::AppState;

/// GET /api/v1/airports?q=&take=
///
/// Case-insensitive search over code, name, city and country.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<Airport>>> {
    let take = lenient_i64(params.take.as_deref());
    let airports = AirportRepo::search(&state.pool, &params.q, take).await?;
    Ok(Json(airports))
}

/// GET /api/v1/airports/iata?q=&take=
///
/// IATA code prefix search for autocompletion.
pub async fn search_iata(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<Airport>>> {
    let take = lenient_i64(params.take.as_deref());
    let airports = AirportRepo::search_iata_prefix(&state.pool, &params.q, take).await?;
    Ok(Json(airports))
}

/// GET /api/v1/airports/{iata}
pub async fn get_by_iata(
    State(state): State<AppState>,
    Path(iata): Path<String>,
) -> AppResult<Json<Airport>> {
    let iata = normalize_iata(&iata)?;
    let airport = AirportRepo::find_by_iata(&state.pool, &iata)
        .await?
        .ok_or_else(|| CoreError::not_found("Airport", &iata))?;
    Ok(Json(airport))
}

/// POST /api/v1/airports
///
/// Create an airport. Every field is audited against an empty record.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(params): Query<ReasonParams>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<(StatusCode, Json<ChangeResponse>)> {
    let body = json_object(&headers, &body)?;
    let reason = require_reason(body_reason(&body), params.reason.as_deref())?;

    let input: NewAirport = serde_json::from_value(Value::Object(body))
        .map_err(|e| AppError::BadRequest(format!("Invalid airport: {e}")))?;
    let (iata, patch) = input.into_parts()?;

    let ctx = ChangeContext::new(ChangeKind::Create, Some(&admin.username), reason);
    let outcome = ChangeRecorder::create(&state.pool, &iata, &patch, &ctx).await?;
    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// PATCH /api/v1/airports/{iata}
///
/// Edit allow-listed fields. Keys outside the allow-list are ignored; a
/// body with no allow-listed key is rejected.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(iata): Path<String>,
    Query(params): Query<ReasonParams>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<ChangeResponse>> {
    let iata = normalize_iata(&iata)?;
    let body = json_object(&headers, &body)?;
    let reason = require_reason(body_reason(&body), params.reason.as_deref())?;
    let patch = AirportPatch::from_json(&body)?;

    let ctx = ChangeContext::new(ChangeKind::Edit, Some(&admin.username), reason);
    let outcome = ChangeRecorder::apply(&state.pool, &iata, &patch, &ctx).await?;
    Ok(Json(outcome.into()))
}
