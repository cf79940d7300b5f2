//! Handler for multi-leg journey computation.

use std::collections::HashMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono_tz::Tz;
use flightclock_core::airport::validate_timezone;
use flightclock_core::journey::{compute_journey, JourneyRequest, JourneySummary};
use flightclock_db::repositories::AirportRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/v1/journey
///
/// Resolve every airport's zone from the database, then compute leg,
/// transit and total durations. Unknown airports are reported as warnings
/// in the summary, not as request errors.
pub async fn compute(
    State(state): State<AppState>,
    payload: Result<Json<JourneyRequest>, JsonRejection>,
) -> AppResult<Json<JourneySummary>> {
    let Json(input) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let mut zones: HashMap<String, Tz> = HashMap::new();
    for leg in &input.legs {
        for code in [&leg.origin, &leg.destination] {
            let code = code.trim().to_ascii_uppercase();
            if zones.contains_key(&code) {
                continue;
            }
            if let Some(found) = AirportRepo::find_timezone(&state.pool, &code).await? {
                match validate_timezone(&found.timezone) {
                    Ok(tz) => {
                        zones.insert(code, tz);
                    }
                    Err(_) => {
                        tracing::warn!(iata = %code, timezone = %found.timezone, "Stored timezone is not a known IANA zone");
                    }
                }
            }
        }
    }

    let summary = compute_journey(&input.legs, |code| zones.get(code).copied());
    Ok(Json(summary))
}
