//! Route definitions for the `/airports` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{airports, history};
use crate::state::AppState;

/// Routes mounted at `/airports`.
///
/// ```text
/// GET    /                         -> search           (?q=&take=)
/// POST   /                         -> create           (admin)
/// GET    /iata                     -> search_iata      (?q=&take=)
/// GET    /{iata}                   -> get_by_iata
/// PATCH  /{iata}                   -> update           (admin)
/// GET    /{iata}/audit             -> list_audit       (admin, ?field=&user=&from=&to=)
/// GET    /{iata}/snapshots         -> list_snapshots   (admin, ?take=)
/// POST   /{iata}/rollback          -> rollback         (admin, ?id=&reason=)
/// POST   /{iata}/rollback-to       -> rollback_to      (admin, ?at=&reason=)
/// POST   /{iata}/restore           -> restore          (admin, ?id=&reason=)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(airports::search).post(airports::create))
        .route("/iata", get(airports::search_iata))
        .route("/{iata}", get(airports::get_by_iata).patch(airports::update))
        .route("/{iata}/audit", get(history::list_audit))
        .route("/{iata}/snapshots", get(history::list_snapshots))
        .route("/{iata}/rollback", post(history::rollback))
        .route("/{iata}/rollback-to", post(history::rollback_to))
        .route("/{iata}/restore", post(history::restore))
}
