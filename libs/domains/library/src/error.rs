use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Publish error: {0}")]
    Publish(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type LibraryResult<T> = Result<T, LibraryError>;

impl From<sea_orm::DbErr> for LibraryError {
    fn from(err: sea_orm::DbErr) -> Self {
        LibraryError::Database(err.to_string())
    }
}

/// Standardized error body returned by the HTTP endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for LibraryError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            LibraryError::Validation(_) => (StatusCode::BAD_REQUEST, "BadRequest"),
            LibraryError::Database(_) | LibraryError::Publish(_) | LibraryError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "InternalServerError")
            }
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            message: self.to_string(),
            details: None,
        });

        (status, body).into_response()
    }
}
