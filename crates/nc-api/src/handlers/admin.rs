//! Administrative operations.

use axum::Json;
use axum::extract::State;

use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/admin/config/reload
///
/// Background loops pick up the new snapshot on their next tick.
pub async fn reload_config(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let config = state.config.reload()?;
    Ok(Json(serde_json::json!({
        "success": true,
        "data": {
            "rotation": config.rotation,
            "logging": config.logging,
        }
    })))
}
