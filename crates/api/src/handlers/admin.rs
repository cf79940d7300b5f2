//! Handlers for the admin airport listing.

use axum::extract::{Query, State};
use axum::Json;
use flightclock_db::models::airport::AirportPage;
use flightclock_db::repositories::AirportRepo;

use crate::error::AppResult;
use crate::middleware::auth::RequireAdmin;
use crate::query::{lenient_i64, PageParams};
use crate::state::AppState;

/// GET /api/v1/admin/airports?page=&take=&q=
pub async fn list_airports(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<PageParams>,
) -> AppResult<Json<AirportPage>> {
    let page = AirportRepo::list_page(
        &state.pool,
        params.q.as_deref(),
        lenient_i64(params.page.as_deref()),
        lenient_i64(params.take.as_deref()),
    )
    .await?;
    Ok(Json(page))
}
