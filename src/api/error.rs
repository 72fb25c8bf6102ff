use crate::services::error::{Denial, DropError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl AppError {
    /// Map a core error to its HTTP shape. With `hide_foreign_records` a
    /// record owned by someone else is reported exactly like a missing one.
    pub fn from_drop(err: DropError, hide_foreign_records: bool) -> Self {
        match err {
            DropError::CredentialMissing => {
                AppError::Unauthorized("A credential is required".to_string())
            }
            DropError::NotFound => AppError::NotFound("File not found".to_string()),
            DropError::Unauthorized(Denial::OwnerMismatch) if hide_foreign_records => {
                AppError::NotFound("File not found".to_string())
            }
            DropError::Unauthorized(Denial::OwnerMismatch) => {
                AppError::Forbidden("File belongs to another owner".to_string())
            }
            DropError::Unauthorized(Denial::CodeMismatch) => {
                AppError::Forbidden("Access code is missing or wrong".to_string())
            }
            DropError::InvalidFilename(msg) => AppError::BadRequest(msg),
            e @ DropError::PayloadTooLarge { .. } => AppError::PayloadTooLarge(e.to_string()),
            e @ (DropError::DuplicateId(_) | DropError::Storage(_) | DropError::Internal(_)) => {
                AppError::Internal(e.to_string())
            }
        }
    }
}

impl From<DropError> for AppError {
    fn from(err: DropError) -> Self {
        AppError::from_drop(err, true)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
