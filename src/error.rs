use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Too many requests")]
    RateLimited,

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Storage(ref err) => match err {
                DatabaseError::NotFound => (StatusCode::NOT_FOUND, "Resource not found"),
                DatabaseError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "Invalid input data"),
                _ => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Survey storage is temporarily unavailable",
                ),
            },
            AppError::MalformedPayload(_) => (
                StatusCode::BAD_REQUEST,
                "Submission is missing required answers",
            ),
            AppError::UpstreamUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "The assistant is temporarily unavailable, please try again later",
            ),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "Resource not found"),
            AppError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "Too many requests"),
            AppError::InternalServerError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal server error occurred",
            ),
        };

        // Provider internals must never reach the caller; everything else can
        // carry its message as a detail.
        let details = match &self {
            AppError::UpstreamUnavailable(_) => error_message.to_string(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "details": details,
            }
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
