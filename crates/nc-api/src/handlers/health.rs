//! Health check handler.

use axum::Json;
use axum::extract::State;

use nc_core::error::AppError;
use nc_database::RotationStore;

use crate::dto::{ApiResponse, HealthResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/health
pub async fn health(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<HealthResponse>>, ApiError> {
    state.services.store.ping().await.map_err(|e| {
        AppError::service_unavailable(format!("Storage unavailable: {}", e.message))
    })?;

    Ok(Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: "connected".to_string(),
    })))
}
