//! Error handling for the Cold Storage Inventory backend
//!
//! Errors render as the legacy JSON envelope `{ resCode, message, error }`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::external::StorageError;

/// Response code for success
pub const RES_CODE_OK: &str = "00";
/// Response code for client-side errors
pub const RES_CODE_CLIENT: &str = "01";
/// Response code for server-side failures
pub const RES_CODE_FAILED: &str = "99";

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // Validation errors
    #[error("Validation error: {0}")]
    ValidationError(String),

    // Snapshot pipeline errors
    #[error("A snapshot run for {0} is already in progress")]
    RunInProgress(String),

    #[error("Snapshot archive failed: {0}")]
    Archive(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(rename = "resCode")]
    pub res_code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorResponse {
    pub fn new(res_code: &'static str, message: impl Into<String>) -> Self {
        Self {
            res_code,
            message: message.into(),
            error: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

impl AppError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::RunInProgress(_) => StatusCode::CONFLICT,
            AppError::Storage(_) => StatusCode::BAD_GATEWAY,
            AppError::Archive(_)
            | AppError::DatabaseError(_)
            | AppError::Internal(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn response_body(&self) -> ErrorResponse {
        match self {
            AppError::Unauthorized(msg) => ErrorResponse::new(RES_CODE_FAILED, msg.clone()),
            AppError::ValidationError(msg) => ErrorResponse::new(RES_CODE_CLIENT, msg.clone()),
            AppError::RunInProgress(date) => ErrorResponse::new(
                RES_CODE_FAILED,
                format!("Proses laporan tanggal {} sedang berjalan", date),
            )
            .with_error(self.to_string()),
            AppError::Archive(_) | AppError::Storage(_) => {
                ErrorResponse::new(RES_CODE_FAILED, "Gagal membuat laporan")
                    .with_error(self.to_string())
            }
            AppError::DatabaseError(_) => {
                ErrorResponse::new(RES_CODE_FAILED, "Terjadi kesalahan pada database")
                    .with_error(self.to_string())
            }
            AppError::Internal(_) | AppError::InternalError(_) => {
                ErrorResponse::new(RES_CODE_FAILED, "Terjadi kesalahan")
                    .with_error(self.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = self.response_body();

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
