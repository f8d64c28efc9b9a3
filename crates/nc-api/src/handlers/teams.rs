//! Team listing, manual rotation, and actuality sync.

use axum::Json;
use axum::extract::{Path, State};
use tokio::time::Instant;

use nc_core::types::TeamId;
use nc_database::RotationStore;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/teams
pub async fn list_teams(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let teams = state.services.store.list_teams().await?;
    Ok(Json(serde_json::json!({ "success": true, "data": teams })))
}

/// POST /api/teams/{id}/rotate
///
/// Runs one rotation pass now and returns the per-pool report. Pool
/// failures are part of the report, not an error response. The run
/// supersedes any scheduled run of the same team and restarts its period.
pub async fn rotate_team(
    State(state): State<AppState>,
    Path(id): Path<TeamId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let token = state.runs.begin_manual(id, Instant::now()).await;
    let report = state.services.rotation.rotate_team(id, token).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": report })))
}

/// POST /api/teams/sync-actuality
pub async fn sync_actuality(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let summary = state.services.actuality.sync_all().await?;
    Ok(Json(serde_json::json!({ "success": true, "data": summary })))
}
