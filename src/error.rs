use axum::response::IntoResponse;
use axum::{http::StatusCode, Json};
use serde::Serialize;
use tracing::error;

/// Application errors that can be automatically turned into an appropriate HTTP
/// response. Every service method in this crate returns `Result<T, AppError>`;
/// the façade never constructs a status code itself.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("account locked: {0}")]
    Locked(String),

    #[error("not authorized")]
    Authorization,

    #[error("operation timed out")]
    Timeout,

    #[error("database error")]
    Database(#[from] rusqlite::Error),

    #[error("database pool error")]
    Pool(#[from] r2d2::Error),

    #[error("json error")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::NotFound => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::Authentication(_) => "authentication",
            AppError::Locked(_) => "locked",
            AppError::Authorization => "authorization",
            AppError::Timeout => "timeout",
            AppError::Database(_) | AppError::Pool(_) => "database",
            AppError::Json(_) => "internal",
            AppError::Internal(_) => "internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Locked(_) => StatusCode::LOCKED,
            AppError::Authorization => StatusCode::FORBIDDEN,
            AppError::Timeout => StatusCode::REQUEST_TIMEOUT,
            AppError::Database(rusqlite::Error::QueryReturnedNoRows) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Pool(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: bool,
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();

        if status.is_server_error() {
            error!(status = %status, error = %self, "request failed");
        }

        let body = ErrorBody {
            error: true,
            code: self.code(),
            message: self.to_string(),
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
