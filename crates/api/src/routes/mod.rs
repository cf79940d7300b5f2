pub mod airports;
pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{admin, journey, reseed, timezone};
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /airports                                        search, create
/// /airports/iata                                   IATA prefix search
/// /airports/{iata}                                 get, edit
/// /airports/{iata}/audit                           audit trail (admin)
/// /airports/{iata}/snapshots                       snapshots (admin)
/// /airports/{iata}/rollback                        undo one audit entry (admin)
/// /airports/{iata}/rollback-to                     point-in-time rollback (admin)
/// /airports/{iata}/restore                         snapshot restore (admin)
///
/// /timezone                                        zone of one airport
/// /journey                                         multi-leg durations (POST)
///
/// /admin/airports                                  paged listing (admin)
/// /reseed                                          one reseed chunk (admin, POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/airports", airports::router())
        .route("/timezone", get(timezone::lookup))
        .route("/journey", post(journey::compute))
        .route("/admin/airports", get(admin::list_airports))
        .route("/reseed", post(reseed::run_chunk))
}
