use std::sync::OnceLock;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::shared::types::SubmissionResponse;

/// Whether internal error detail may be returned to clients (development only)
static EXPOSE_ERROR_DETAILS: OnceLock<bool> = OnceLock::new();

/// Enable or disable diagnostic detail in error responses.
///
/// Only the first call takes effect; later calls are ignored.
pub fn init_error_details(expose: bool) {
    let _ = EXPOSE_ERROR_DETAILS.set(expose);
}

fn expose_details() -> bool {
    EXPOSE_ERROR_DETAILS.get().copied().unwrap_or(false)
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Unknown organisation or site. `detail` is only shown in development.
    #[error("Not found: {message}")]
    NotFound {
        message: String,
        detail: Option<String>,
    },

    /// A write step of a submission failed after rollback; `message` is user-facing
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Not-found error whose `detail` only reaches clients in development
    pub fn not_found(message: impl Into<String>, detail: impl Into<String>) -> Self {
        AppError::NotFound {
            message: message.into(),
            detail: Some(detail.into()),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::ExternalService(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_)
            | AppError::Persistence(_)
            | AppError::Storage(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message rendered into the response body
    fn public_message(&self) -> String {
        let generic = |detail: String| {
            if expose_details() {
                format!("Internal server error: {}", detail)
            } else {
                "Internal server error".to_string()
            }
        };

        match self {
            AppError::Validation(msg)
            | AppError::BadRequest(msg)
            | AppError::PayloadTooLarge(msg)
            | AppError::Persistence(msg) => msg.clone(),
            AppError::NotFound { message, detail } => match detail {
                Some(detail) if expose_details() => format!("{}: {}", message, detail),
                _ => message.clone(),
            },
            AppError::ExternalService(msg) => msg.clone(),
            AppError::Database(e) => generic(e.to_string()),
            AppError::Storage(msg) | AppError::Internal(msg) => generic(msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Database(e) => tracing::error!("Database error: {:?}", e),
            AppError::Storage(msg) => tracing::error!("Storage error: {}", msg),
            AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
            AppError::ExternalService(msg) => tracing::error!("External service error: {}", msg),
            _ => {}
        }

        let status = self.status_code();
        let body = Json(SubmissionResponse::failure(self.public_message()));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
