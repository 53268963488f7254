//! Unified error handling
//!
//! Provides the application error type and API response envelope:
//! - [`AppError`] - application error enum
//! - [`AppResponse`] - API response structure
//!
//! Error taxonomy (see handlers for usage):
//!
//! | Class | Status | Behavior |
//! |-------|--------|----------|
//! | Validation | 400 | message surfaced verbatim, caller fixes input |
//! | Conflict | 409 | identity collision, caller must sign in |
//! | Unauthorized | 401 | missing/unknown customer identity |
//! | NotFound | 404 | |
//! | BusinessRule | 422 | lifecycle/refund rule violations |
//! | ProcessorRejected | 502 | processor reason surfaced where safe |
//! | Config/Database/Internal | 500 | detail logged server-side, generic body |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::db::repository::RepoError;

/// API response envelope
///
/// ```json
/// {
///   "code": "E0000",
///   "message": "Success",
///   "data": { ... }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    /// Error code (E0000 = success)
    pub code: String,
    /// Message
    pub message: String,
    /// Response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Application error enum
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Authentication errors (4xx) ==========
    #[error("Authentication required")]
    /// Missing or unknown customer identity (401)
    Unauthorized,

    // ========== Business logic errors (4xx) ==========
    #[error("Resource not found: {0}")]
    /// Resource does not exist (404)
    NotFound(String),

    #[error("Conflict: {0}")]
    /// Identity collision / duplicate resource (409)
    Conflict(String),

    #[error("Validation failed: {0}")]
    /// Composition or input validation failure (400)
    Validation(String),

    #[error("Business rule violation: {0}")]
    /// Lifecycle/refund rule violation (422)
    BusinessRule(String),

    // ========== External collaborator errors ==========
    #[error("Payment processor rejected the request: {0}")]
    /// Processor declined a charge or refund (502)
    ProcessorRejected(String),

    // ========== System errors (5xx) ==========
    #[error("Configuration error: {0}")]
    /// Operational/setup problem, not user error (500)
    Config(String),

    #[error("Database error: {0}")]
    /// Database error (500)
    Database(String),

    #[error("Internal server error: {0}")]
    /// Internal error (500)
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "E3001",
                "Please sign in first".to_string(),
            ),

            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "E0003", msg.clone()),

            AppError::Conflict(msg) => (StatusCode::CONFLICT, "E0004", msg.clone()),

            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "E0002", msg.clone()),

            AppError::BusinessRule(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "E0005", msg.clone())
            }

            AppError::ProcessorRejected(msg) => {
                error!(target: "processor", error = %msg, "Payment processor rejected request");
                (StatusCode::BAD_GATEWAY, "E5001", msg.clone())
            }

            // Configuration problems indicate an operational/setup issue;
            // log loudly, return a generic body
            AppError::Config(msg) => {
                error!(target: "config", error = %msg, "Configuration error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9003",
                    "Something went wrong, please try again".to_string(),
                )
            }

            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9002",
                    "Something went wrong, please try again".to_string(),
                )
            }

            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9001",
                    "Something went wrong, please try again".to_string(),
                )
            }
        };

        let body = Json(AppResponse::<()> {
            code: code.to_string(),
            message,
            data: None,
        });

        (status, body).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Duplicate(msg) => AppError::Conflict(msg),
            RepoError::Validation(msg) => AppError::Validation(msg),
            RepoError::Database(msg) => AppError::Database(msg),
        }
    }
}

// ========== Helper functions ==========

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<AppResponse<T>> {
    Json(AppResponse {
        code: "E0000".to_string(),
        message: "Success".to_string(),
        data: Some(data),
    })
}
