//! Handler for the airport timezone lookup.

use axum::extract::{Query, State};
use axum::Json;
use flightclock_core::airport::normalize_iata;
use flightclock_core::error::CoreError;
use flightclock_db::models::airport::AirportTimezone;
use flightclock_db::repositories::AirportRepo;

use crate::error::{AppError, AppResult};
use crate::query::TimezoneParams;
use crate::state::AppState;

/// GET /api/v1/timezone?iata=
pub async fn lookup(
    State(state): State<AppState>,
    Query(params): Query<TimezoneParams>,
) -> AppResult<Json<AirportTimezone>> {
    let iata = params
        .iata
        .as_deref()
        .and_then(|raw| normalize_iata(raw).ok())
        .ok_or_else(|| AppError::BadRequest("Provide ?iata=AAA".into()))?;

    let found = AirportRepo::find_timezone(&state.pool, &iata)
        .await?
        .ok_or_else(|| CoreError::not_found("Airport", &iata))?;
    Ok(Json(found))
}
