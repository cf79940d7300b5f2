use axum::extract::State;
use axum::{routing::get, Json, Router};
use flightclock_db::repositories::AirportRepo;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database is unreachable.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Rows in the airport table; absent when the database is down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airports: Option<i64>,
}

/// GET /health -- always 200.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = flightclock_db::health_check(&state.pool).await.is_ok();
    let airports = if db_healthy {
        AirportRepo::count(&state.pool, None).await.ok()
    } else {
        None
    };

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        airports,
    })
}

/// Root-level health route, outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
