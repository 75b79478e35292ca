//! API error handling
//!
//! Converts data-layer errors into HTTP responses with appropriate status
//! codes. Internal failures are logged in full but answered with a generic
//! message; statement labels and argument values never reach the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::error;

use tracklog_db::DbError;

/// API error type that can be converted to an HTTP response
#[derive(Debug)]
pub struct ApiError {
    status_code: StatusCode,
    message: String,
    error_code: Option<String>,
}

impl ApiError {
    /// Create a new API error
    pub fn new(status_code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
            error_code: None,
        }
    }

    /// Create an API error with an error code
    pub fn with_code(
        status_code: StatusCode,
        message: impl Into<String>,
        error_code: impl Into<String>,
    ) -> Self {
        Self {
            status_code,
            message: message.into(),
            error_code: Some(error_code.into()),
        }
    }

    /// Create a bad request error (400)
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::BAD_REQUEST, message, "INVALID_REQUEST")
    }

    /// Create a not found error (404)
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::NOT_FOUND, message, "NOT_FOUND")
    }

    /// Create an unprocessable entity error (422)
    pub fn unprocessable_entity(message: impl Into<String>) -> Self {
        Self::with_code(
            StatusCode::UNPROCESSABLE_ENTITY,
            message,
            "VALIDATION_FAILED",
        )
    }

    /// Create an unauthorized error (401)
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::UNAUTHORIZED, message, "UNAUTHORIZED")
    }

    /// Status code this error maps to
    pub fn status(&self) -> StatusCode {
        self.status_code
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

/// Error response JSON structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP status code
    pub status: u16,

    /// Error message
    pub error: String,

    /// Optional error code for programmatic handling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Timestamp of the error
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_response = ErrorResponse {
            status: self.status_code.as_u16(),
            error: self.message,
            code: self.error_code,
            timestamp: chrono::Utc::now(),
        };

        (self.status_code, Json(error_response)).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::InvalidFilter(msg) => {
                ApiError::with_code(StatusCode::BAD_REQUEST, msg, "INVALID_FILTER")
            }
            DbError::NotFound(msg) => ApiError::not_found(msg),
            DbError::Validation(msg) => ApiError::unprocessable_entity(msg),
            DbError::Conflict(msg) => ApiError::with_code(StatusCode::CONFLICT, msg, "CONFLICT"),
            DbError::ConnectTimeout | DbError::PoolExhausted => ApiError::with_code(
                StatusCode::SERVICE_UNAVAILABLE,
                "database is busy, retry shortly",
                "DATABASE_BUSY",
            ),
            DbError::Connection(msg) => {
                error!(error = %msg, "database connection failure");
                ApiError::with_code(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "database unavailable",
                    "DATABASE_UNAVAILABLE",
                )
            }
            DbError::Unavailable(msg) => {
                error!(error = %msg, "readiness check failed");
                ApiError::with_code(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "database unavailable",
                    "DATABASE_UNAVAILABLE",
                )
            }
            DbError::Query { statement, message } => {
                error!(statement = %statement, error = %message, "query failed");
                ApiError::with_code(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error",
                    "QUERY_FAILED",
                )
            }
            DbError::Mapping(msg) => {
                error!(error = %msg, "row mapping failed");
                ApiError::with_code(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error",
                    "MAPPING_FAILED",
                )
            }
            DbError::Configuration(msg) => {
                error!(error = %msg, "configuration error");
                ApiError::with_code(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error",
                    "CONFIGURATION",
                )
            }
        }
    }
}

impl From<tracklog_core::DomainError> for ApiError {
    fn from(err: tracklog_core::DomainError) -> Self {
        match err {
            tracklog_core::DomainError::Validation(msg) => ApiError::unprocessable_entity(msg),
        }
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
