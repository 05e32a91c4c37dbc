// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::pagination::CursorError;
use crate::store::StoreError;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 400, page size out of bounds
    InvalidPageSize(String),

    // 400, malformed pagination cursor
    InvalidCursor(String),

    // 400, cursor issued under a different ordering than the request's
    OrderingMismatch(String),

    // 401, missing or invalid credentials
    Unauthenticated(String),

    // 403, authenticated but not allowed to see the requested rows
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 503, the backing store could not serve the query
    StoreUnavailable(String),
}

impl AppError {
    /// Machine-stable error code included in every error body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InternalServerError(_) => "internal",
            AppError::BadRequest(_) => "bad_request",
            AppError::InvalidPageSize(_) => "invalid_page_size",
            AppError::InvalidCursor(_) => "invalid_cursor",
            AppError::OrderingMismatch(_) => "ordering_mismatch",
            AppError::Unauthenticated(_) => "unauthenticated",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::NotFound(_) => "not_found",
            AppError::StoreUnavailable(_) => "store_unavailable",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::StoreUnavailable(msg) => {
                tracing::error!("Store unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "The data store could not serve the request".to_string(),
                )
            }
            AppError::BadRequest(msg)
            | AppError::InvalidPageSize(msg)
            | AppError::InvalidCursor(msg)
            | AppError::OrderingMismatch(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Unauthorized(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };
        let body = Json(json!({
            "code": code,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Converts `StoreError` into `AppError::StoreUnavailable`.
/// Allows using `?` operator on store calls.
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::StoreUnavailable(err.to_string())
    }
}

impl From<CursorError> for AppError {
    fn from(err: CursorError) -> Self {
        match err {
            CursorError::Malformed => AppError::InvalidCursor(err.to_string()),
            CursorError::OrderingMismatch { .. } => AppError::OrderingMismatch(err.to_string()),
        }
    }
}
