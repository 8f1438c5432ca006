//! API error type and its HTTP mapping
//!
//! | Variant | Status | Code |
//! |---|---|---|
//! | `NotFound` | 404 | `NOT_FOUND` |
//! | `BadRequest` | 400 | `BAD_REQUEST` |
//! | `Conflict` | 409 | `CONFLICT` |
//! | `MissingCredential` | 503 | `MISSING_CREDENTIAL` |
//! | `Upstream` | 502 | `UPSTREAM_ERROR` |
//! | `Internal` | 500 | `INTERNAL_ERROR` |

use crate::inference::InferenceError;
use crate::services::GenerationError;
use crate::view_state::ViewBusy;
use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Conflict (409) - view already loading
    #[error("Conflict: {0}")]
    Conflict(String),

    /// No API key configured (503)
    #[error("Service unavailable: {0}")]
    MissingCredential(String),

    /// Remote model failed (502)
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<InferenceError> for ApiError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::MissingCredential => ApiError::MissingCredential(
                "Gemini API key is not configured. Set XUANJI_GEMINI_API_KEY or [gemini] api_key."
                    .to_string(),
            ),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl From<xuanji_common::Error> for ApiError {
    fn from(err: xuanji_common::Error) -> Self {
        use xuanji_common::Error;
        match err {
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::NotFound(msg) => ApiError::NotFound(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Inference(e) => e.into(),
            GenerationError::Input(e) => e.into(),
        }
    }
}

impl From<ViewBusy> for ApiError {
    fn from(err: ViewBusy) -> Self {
        ApiError::Conflict(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Internal(format!("Serialization failed: {}", err))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::MissingCredential(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::MissingCredential(_) => "MISSING_CREDENTIAL",
            ApiError::Upstream(_) => "UPSTREAM_ERROR",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn message(self) -> String {
        match self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Conflict(msg)
            | ApiError::MissingCredential(msg)
            | ApiError::Upstream(msg)
            | ApiError::Internal(msg) => msg,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_code = self.code();

        if status.is_server_error() {
            error!(code = error_code, error = %self, "Request failed");
        } else {
            warn!(code = error_code, error = %self, "Request rejected");
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.message(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inference_errors_map_to_status() {
        assert_eq!(
            ApiError::from(InferenceError::MissingCredential).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(InferenceError::ApiError(500, "boom".to_string())).code(),
            "UPSTREAM_ERROR"
        );
        assert_eq!(ApiError::from(InferenceError::NoImage).status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_input_errors_are_bad_requests() {
        let err: ApiError = GenerationError::Input(xuanji_common::Error::InvalidInput("bad date".to_string())).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Invalid request: bad date");
    }

    #[test]
    fn test_missing_resource_is_not_found() {
        let err: ApiError = crate::services::find_product(99).unwrap_err().into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), "NOT_FOUND");
    }
}
