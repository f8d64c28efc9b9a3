//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use nc_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// Handler error: an [`AppError`] rendered as JSON.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

/// HTTP status for an error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation | ErrorKind::Configuration => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Exhausted => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::ExternalService => StatusCode::BAD_GATEWAY,
        ErrorKind::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Internal | ErrorKind::Database | ErrorKind::Serialization => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = status_for(err.kind);
        if status.is_server_error() {
            tracing::error!(kind = %err.kind, error = %err.message, "Request failed");
        }

        let body = ApiErrorResponse {
            error: err.kind.to_string(),
            message: err.message,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::Configuration), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::Exhausted), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status_for(ErrorKind::ExternalService), StatusCode::BAD_GATEWAY);
        assert_eq!(status_for(ErrorKind::Database), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_body_carries_kind_code() {
        let response = ApiError::from(AppError::not_found("Pool 9 not found")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
