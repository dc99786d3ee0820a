//! API error types and response handling.
//!
//! Every handler returns [`ApiResult`], so all failures leave the server as
//! the same JSON envelope. The bundler UI reads `message` and the path list
//! reads `error`; both carry the same text.

use axum::extract::rejection::{JsonRejection, StringRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use specbundle_core::BundlerError;
use utoipa::ToSchema;

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A failure reported by the core library.
    #[error(transparent)]
    Bundler(#[from] BundlerError),

    /// The request body could not be decoded.
    #[error("{message}")]
    BadRequest {
        /// Machine-readable error code.
        code: &'static str,
        /// Human-readable error message.
        message: String,
    },
}

/// Standard JSON error response body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "success": false,
    "error": "Invalid filename '../evil.yaml'. It must end with .yaml or .yml and not contain path characters.",
    "message": "Invalid filename '../evil.yaml'. It must end with .yaml or .yml and not contain path characters.",
    "code": "INVALID_FILENAME"
}))]
pub struct ErrorResponse {
    /// Always `false`.
    #[schema(example = false)]
    pub success: bool,

    /// Human-readable error message.
    pub error: String,

    /// Same text as `error`.
    pub message: String,

    /// Machine-readable error code.
    #[schema(example = "INVALID_FILENAME")]
    pub code: String,
}

impl ErrorResponse {
    fn new(message: String, code: &str) -> Self {
        Self {
            success: false,
            error: message.clone(),
            message,
            code: code.to_string(),
        }
    }
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Bundler(err) => StatusCode::from_u16(err.http_status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
        }
    }

    /// Machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Bundler(err) => err.error_code(),
            Self::BadRequest { code, .. } => *code,
        }
    }

    /// Message safe to return to clients.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Bundler(err) => err.public_message(),
            Self::BadRequest { message, .. } => message.clone(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest {
            code: "INVALID_REQUEST_BODY",
            message: rejection.body_text(),
        }
    }
}

impl From<StringRejection> for ApiError {
    fn from(rejection: StringRejection) -> Self {
        Self::BadRequest {
            code: "INVALID_REQUEST_BODY",
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        match &self {
            Self::Bundler(err) if err.is_client_error() => {
                tracing::warn!(code, error = %err, "Request rejected");
            }
            Self::Bundler(err) if err.is_tool_error() => {
                tracing::error!(code, stderr = %err, "External tool failed");
            }
            Self::Bundler(err) => tracing::error!(code, error = %err, "Request failed"),
            Self::BadRequest { .. } => tracing::warn!(code, error = %self, "Request rejected"),
        }

        let body = ErrorResponse::new(self.public_message(), code);
        (status, Json(body)).into_response()
    }
}
