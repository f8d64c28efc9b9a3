//! Number include/exclude and redistribution.

use axum::Json;
use axum::extract::State;

use crate::dto::{MoveNumbersRequest, NumberIdsRequest, UpdatedResponse, validated};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/numbers/exclude
pub async fn exclude_numbers(
    State(state): State<AppState>,
    Json(req): Json<NumberIdsRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let req = validated(req)?;
    let updated = state.services.numbers.exclude(&req.ids).await?;
    let body = UpdatedResponse { updated };
    Ok(Json(serde_json::json!({ "success": true, "data": body })))
}

/// POST /api/numbers/include
pub async fn include_numbers(
    State(state): State<AppState>,
    Json(req): Json<NumberIdsRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let req = validated(req)?;
    let updated = state.services.numbers.include(&req.ids).await?;
    let body = UpdatedResponse { updated };
    Ok(Json(serde_json::json!({ "success": true, "data": body })))
}

/// POST /api/numbers/move
pub async fn move_numbers(
    State(state): State<AppState>,
    Json(req): Json<MoveNumbersRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let req = validated(req)?;
    let summary = state
        .services
        .redistributor
        .move_numbers(&req.into())
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": summary })))
}
