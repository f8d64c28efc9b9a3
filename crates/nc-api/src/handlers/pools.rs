//! Pool building, inspection, and the subpool activation cycle.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use nc_core::types::PoolId;

use crate::dto::{CreatePoolRequest, MessageResponse, PoolListQuery, validated};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/pools
pub async fn list_pools(
    State(state): State<AppState>,
    Query(query): Query<PoolListQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let pools = state.services.pools.list(query.team_id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": pools })))
}

/// POST /api/pools
pub async fn create_pool(
    State(state): State<AppState>,
    Json(req): Json<CreatePoolRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let req = validated(req)?;
    let built = state.services.builder.build(req.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "success": true, "data": built })),
    ))
}

/// GET /api/pools/{id}
pub async fn get_pool(
    State(state): State<AppState>,
    Path(id): Path<PoolId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let pool = state.services.pools.get(id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": pool })))
}

/// DELETE /api/pools/{id}
pub async fn delete_pool(
    State(state): State<AppState>,
    Path(id): Path<PoolId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.services.pools.delete(id).await?;
    let body = MessageResponse {
        message: format!("Pool {id} deleted"),
    };
    Ok(Json(serde_json::json!({ "success": true, "data": body })))
}

/// GET /api/pools/{id}/subpools
pub async fn list_subpools(
    State(state): State<AppState>,
    Path(id): Path<PoolId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let subpools = state.services.pools.subpools(id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": subpools })))
}

/// POST /api/pools/{id}/subpools/activate
pub async fn activate_pool(
    State(state): State<AppState>,
    Path(id): Path<PoolId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let outcome = state.services.activator.activate_pool(id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": outcome })))
}

/// POST /api/subpools/activate
pub async fn activate_all(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let report = state.services.activator.activate_all().await?;
    Ok(Json(serde_json::json!({ "success": true, "data": report })))
}
