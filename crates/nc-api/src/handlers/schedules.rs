//! Rotation schedule management.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use nc_core::types::ScheduleId;

use crate::dto::{CreateScheduleRequest, MessageResponse, validated};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/schedules
pub async fn list_schedules(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let schedules = state.services.schedules.list().await?;
    Ok(Json(serde_json::json!({ "success": true, "data": schedules })))
}

/// POST /api/schedules
pub async fn create_schedule(
    State(state): State<AppState>,
    Json(req): Json<CreateScheduleRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let req = validated(req)?;
    let schedule = state.services.schedules.create(req.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "success": true, "data": schedule })),
    ))
}

/// DELETE /api/schedules/{id}
pub async fn delete_schedule(
    State(state): State<AppState>,
    Path(id): Path<ScheduleId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.services.schedules.delete(id).await?;
    let body = MessageResponse {
        message: format!("Schedule {id} deleted"),
    };
    Ok(Json(serde_json::json!({ "success": true, "data": body })))
}
