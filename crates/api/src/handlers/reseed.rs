//! Handler for chunked reseeding from the airport data file.

use axum::extract::{Query, State};
use axum::Json;
use flightclock_core::reseed::{clamp_chunk_size, normalize_rows, ReseedPlan, SourceAirport};
use flightclock_db::reseed::write_chunk;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::RequireAdmin;
use crate::query::{lenient_i64, ReseedParams};
use crate::state::AppState;

/// Progress report for one reseed chunk.
#[derive(Debug, Serialize)]
pub struct ReseedResponse {
    pub ok: bool,
    /// Whether this chunk cleared existing data first.
    pub reset: bool,
    /// Airports removed by the reset.
    pub cleared: u64,
    pub offset: usize,
    pub processed: usize,
    pub next_offset: usize,
    pub total: usize,
    pub done: bool,
    /// Airports in the database after this chunk.
    pub count: i64,
}

/// POST /api/v1/reseed?offset=&limit=&reset=
///
/// Upsert one chunk of the airport data file. The caller repeats with
/// `next_offset` until `done`. `reset=true` only takes effect on the chunk
/// at offset 0, so later chunks never wipe rows written by earlier ones.
pub async fn run_chunk(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(params): Query<ReseedParams>,
) -> AppResult<Json<ReseedResponse>> {
    let path = &state.config.airports_data_path;
    let raw = tokio::fs::read(path).await.map_err(|e| {
        AppError::InternalError(format!("Failed to read airport data file {path}: {e}"))
    })?;
    let source: Vec<SourceAirport> = serde_json::from_slice(&raw).map_err(|e| {
        AppError::InternalError(format!("Failed to parse airport data file {path}: {e}"))
    })?;
    let rows = normalize_rows(source);

    let chunk_size = clamp_chunk_size(
        lenient_i64(params.limit.as_deref()),
        state.config.reseed_chunk_size,
    );
    let offset = lenient_i64(params.offset.as_deref()).unwrap_or(0);
    let plan = ReseedPlan::new(rows.len(), offset, chunk_size);
    let reset = params.reset_requested() && plan.offset == 0;

    let written = write_chunk(&state.pool, &rows[plan.offset..plan.end], reset).await?;

    tracing::info!(
        user = %admin.username,
        offset = plan.offset,
        processed = written.written,
        total = plan.total,
        reset,
        cleared = written.cleared,
        "Reseed chunk processed",
    );

    Ok(Json(ReseedResponse {
        ok: true,
        reset,
        cleared: written.cleared,
        offset: plan.offset,
        processed: written.written,
        next_offset: plan.next_offset(),
        total: plan.total,
        done: plan.done(),
        count: written.count,
    }))
}
