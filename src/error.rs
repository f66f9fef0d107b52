use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Wire shape of every error response: `{error, details?}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Everything a handler can fail with, mapped to the API's status codes.
///
/// Read-path repository failures are 500, write-path failures are 400 (they
/// usually mean the storage layer rejected the document). The asymmetry is
/// intentional.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing required fields")]
    MissingFields,
    #[error("invalid post id")]
    InvalidId,
    #[error("post not found")]
    NotFound,
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("database connection error: {0}")]
    Connection(String),
    #[error("{message}: {details}")]
    Read {
        message: &'static str,
        details: String,
    },
    #[error("{message}: {details}")]
    Write {
        message: &'static str,
        details: String,
    },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            ApiError::MissingFields => (
                StatusCode::BAD_REQUEST,
                "Missing required fields".to_string(),
                Some("Title, content, and author are required".to_string()),
            ),
            ApiError::InvalidId => (StatusCode::BAD_REQUEST, "Invalid post ID".to_string(), None),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Post not found".to_string(), None),
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "Method not allowed".to_string(),
                None,
            ),
            ApiError::Connection(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database connection error".to_string(),
                Some(details),
            ),
            ApiError::Read { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                message.to_string(),
                Some(details),
            ),
            ApiError::Write { message, details } => {
                (StatusCode::BAD_REQUEST, message.to_string(), Some(details))
            }
        };

        (status, Json(ErrorBody { error, details })).into_response()
    }
}
