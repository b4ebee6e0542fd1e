use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

use crate::handlers::shared::ApiResponse;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Internal server error{}", .0.as_ref().map_or("".to_string(), |s| format!(": {}", s)))]
    InternalServerError(Option<String>),
}

impl AppError {
    pub fn internal_server_error_message(message: impl Into<String>) -> Self {
        AppError::InternalServerError(Some(message.into()))
    }

    /// A UNIQUE constraint hit becomes a client error; anything else stays a database error.
    pub fn unique_violation(error: sqlx::Error, message: &str) -> Self {
        match &error {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                log::warn!("Unique constraint violated: {}", db);
                AppError::BadRequest(message.to_string())
            }
            _ => error.into(),
        }
    }

    /// Opaque error code placed in the response envelope.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::DatabaseError(_) => "DatabaseError",
            AppError::NotFound(_) => "NotFound",
            AppError::Forbidden(_) => "Forbidden",
            AppError::BadRequest(_) => "BadRequest",
            AppError::InvalidState(_) => "InvalidState",
            AppError::Unauthorized => "Unauthorized",
            AppError::InternalServerError(_) => "InternalServerError",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidState(_) => StatusCode::CONFLICT,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();

        let message = if status_code.is_server_error() {
            log::error!("Request failed with status {}: {}", status_code, self);
            "Internal server error".to_string()
        } else {
            log::warn!("Request failed with status {}: {}", status_code, self);
            self.to_string()
        };

        HttpResponse::build(status_code).json(ApiResponse::<()>::error(
            status_code,
            self.code(),
            &message,
        ))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        log::error!("Database error: {}", error);
        AppError::DatabaseError(error)
    }
}
