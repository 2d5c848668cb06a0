use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use botgate_core::AppError;
use serde::Serialize;
use tracing::{error, warn};
use ts_rs::TS;

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    message: String,
}

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Policy denials and directory outages are presented identically so
        // a caller cannot learn why access is absent; the real cause only
        // reaches the logs.
        let (status, message) = match &self.0 {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, self.0.to_string()),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.0.to_string()),
            AppError::Conflict(_) => (StatusCode::CONFLICT, self.0.to_string()),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, self.0.to_string()),
            AppError::Forbidden(_) => (
                StatusCode::FORBIDDEN,
                "access is not available".to_owned(),
            ),
            AppError::Unavailable(reason) => {
                warn!(reason, "directory unavailable");
                (
                    StatusCode::FORBIDDEN,
                    "access is not available".to_owned(),
                )
            }
            AppError::Signing(reason) => {
                error!(reason, "sso token issuance failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to generate sso token".to_owned(),
                )
            }
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error".to_owned(),
            ),
        };

        let payload = Json(ErrorResponse { message });

        (status, payload).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
