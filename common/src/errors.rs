//! Application error types.
//!
//! Every service handler returns `AppResult<T>`; the error half is turned into
//! an HTTP status plus the standard error envelope.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::response::ApiResponse;

/// Result alias used across the services.
pub type AppResult<T> = Result<T, AppError>;

/// Errors surfaced by the directory services.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed field in a request.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An equivalent connection record already exists.
    #[error("connection already exists: {0}")]
    Conflict(String),

    /// No connection record with the given id.
    #[error("connection not found: {0}")]
    ConnectionNotFound(String),

    /// Failure talking to the metadata store.
    #[error("database error: {0}")]
    DatabaseQuery(String),

    /// An upstream service could not be reached or answered badly.
    #[error("external service error: {0}")]
    ExternalService(String),

    /// Anything else.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ConnectionNotFound(_) => StatusCode::NOT_FOUND,
            AppError::ExternalService(_) => StatusCode::BAD_GATEWAY,
            AppError::DatabaseQuery(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Machine-readable error code placed in the envelope.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Conflict(_) => "CONFLICT",
            AppError::ConnectionNotFound(_) => "NOT_FOUND",
            AppError::DatabaseQuery(_) => "DATABASE_ERROR",
            AppError::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => format!("{}: {}", field, msg),
                    None => format!("{}: {}", field, e.code),
                })
            })
            .collect();
        messages.sort();
        AppError::Validation(messages.join("; "))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "请求失败");
        } else {
            tracing::warn!(code = self.code(), error = %self, "请求被拒绝");
        }

        (status, Json(ApiResponse::err(self.code(), self.to_string()))).into_response()
    }
}
