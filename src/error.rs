//! Error type shared by domain operations and web handlers.

use crate::email::EmailError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::DbErr;
use serde_json::json;
use validator::{ValidationError, ValidationErrors};

pub type BoardResult<T> = Result<T, BoardError>;

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("Invalid form data")]
    Validation(#[from] ValidationErrors),
    #[error("Login required")]
    Unauthorized,
    #[error("Invalid email or password")]
    BadCredentials,
    #[error("{0}")]
    PermissionDenied(&'static str),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(&'static str),
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    #[error("{0}")]
    Email(#[from] EmailError),
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
    #[error("Session error: {0}")]
    Session(String),
}

impl BoardError {
    /// Single-field validation failure with a human readable message.
    pub fn field(field: &'static str, code: &'static str, message: &'static str) -> Self {
        let mut error = ValidationError::new(code);
        error.message = Some(message.into());
        let mut errors = ValidationErrors::new();
        errors.add(field, error);
        BoardError::Validation(errors)
    }
}

impl ResponseError for BoardError {
    fn status_code(&self) -> StatusCode {
        match self {
            BoardError::Validation(_) => StatusCode::BAD_REQUEST,
            BoardError::Unauthorized | BoardError::BadCredentials => StatusCode::UNAUTHORIZED,
            BoardError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            BoardError::NotFound(_) => StatusCode::NOT_FOUND,
            BoardError::Conflict(_) => StatusCode::CONFLICT,
            BoardError::Database(_)
            | BoardError::Email(_)
            | BoardError::PasswordHash(_)
            | BoardError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = match self {
            BoardError::Validation(errors) => json!({
                "error": self.to_string(),
                "fields": errors,
            }),
            _ if status.is_server_error() => {
                log::error!("{}", self);
                json!({ "error": "Internal server error" })
            }
            _ => json!({ "error": self.to_string() }),
        };

        HttpResponse::build(status).json(body)
    }
}
