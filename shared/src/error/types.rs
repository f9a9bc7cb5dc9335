//! Error types and API response structures

use super::kind::ErrorKind;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application error carried across the ledger boundary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AppError {
    /// Failure class
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
}

impl AppError {
    /// Create a new error with the default message for the kind
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: kind.default_message().to_string(),
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        self.kind.http_status()
    }

    // ==================== Convenience constructors ====================

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::NotFound, format!("{} not found", resource.into()))
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::Conflict, msg)
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::InvalidInput, msg)
    }

    pub fn insufficient_stock(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::InsufficientStock, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::Internal, msg)
    }
}

/// Error payload inside a failed [`ApiResponse`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

/// Unified response envelope
///
/// ```json
/// { "success": true, "data": { ... } }
/// { "success": false, "error": { "kind": "Conflict", "message": "..." } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl<T> ApiResponse<T> {
    /// Create a success response with data
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response from an AppError
    pub fn error(err: &AppError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorBody {
                kind: err.kind,
                message: err.message.clone(),
            }),
        }
    }

    /// Convert back into a `Result` (client side)
    pub fn into_result(self) -> AppResult<Option<T>> {
        match self.error {
            Some(body) => Err(AppError::with_message(body.kind, body.message)),
            None => Ok(self.data),
        }
    }
}

impl<T> From<AppError> for ApiResponse<T> {
    fn from(err: AppError) -> Self {
        Self::error(&err)
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

// ===== Axum Integration =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = self.http_status();
        let body = ApiResponse::<()>::error(&self);

        if self.kind.is_system() {
            tracing::error!(kind = %self.kind, message = %self.message, "System error occurred");
        }

        (status, Json(body)).into_response()
    }
}

impl<T: Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = match &self.error {
            Some(body) => body.kind.http_status(),
            None => StatusCode::OK,
        };

        (status, Json(self)).into_response()
    }
}
