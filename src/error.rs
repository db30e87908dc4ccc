// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::{
    grading::engine::GradeError, models::progress::TransitionError,
    services::content::ContentError,
};

/// Error returned by every handler.
///
/// Each variant carries the client-facing message; `InternalServerError`
/// messages are logged and replaced by a generic body.
#[derive(Debug)]
pub enum AppError {
    InternalServerError(String),
    BadRequest(String),
    /// Missing, invalid or expired credentials.
    AuthError(String),
    Forbidden(String),
    NotFound(String),
    /// Duplicate username or a lost compare-and-set race.
    Conflict(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    fn message(&self) -> &str {
        match self {
            AppError::InternalServerError(msg)
            | AppError::BadRequest(msg)
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => msg,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status_code().as_u16(), self.message())
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if let AppError::InternalServerError(detail) = &self {
            tracing::error!("Internal error: {}", detail);
            "Internal Server Error"
        } else {
            self.message()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

/// `InvalidState` is reported as 400.
impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// `NoQuestions` means broken module content and is reported as 500.
impl From<GradeError> for AppError {
    fn from(err: GradeError) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<ContentError> for AppError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::InvalidModuleId(id) => {
                AppError::NotFound(format!("Module '{}' not found", id))
            }
            other => AppError::InternalServerError(other.to_string()),
        }
    }
}
