//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! It is the single boundary where service-level failures are translated into HTTP
//! responses, so the core logic never depends on the web framework's rendering pipeline.
//!
//! `AppError` implements `actix_web::error::ResponseError` to convert application
//! errors into JSON responses of the shape `{"error": msg}`. `From` implementations
//! for `sqlx::Error`, `validator::ValidationErrors` and `bcrypt::BcryptError` allow
//! conversion with the `?` operator.

use actix_web::{error::ResponseError, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Missing, invalid, expired or blacklisted credentials (HTTP 401).
    /// Token verification failures all collapse into this variant so the
    /// client cannot distinguish an expired token from a forged one.
    Unauthorized(String),
    /// Authenticated, but not the owner of the requested resource (HTTP 403).
    Forbidden(String),
    /// Malformed or invalid request (HTTP 400).
    BadRequest(String),
    /// Requested resource does not exist (HTTP 404).
    NotFound(String),
    /// Unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// Error originating from database operations (HTTP 500).
    DatabaseError(String),
    /// Failed input validation (HTTP 422). Field-level failures carry the
    /// field name in the message, e.g. `current_password: ...`.
    ValidationError(String),
}

impl AppError {
    /// Builds a validation error attached to a specific input field.
    pub fn field_validation(field: &str, message: &str) -> Self {
        AppError::ValidationError(format!("{}: {}", field, message))
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Unauthorized(msg) => HttpResponse::Unauthorized().json(json!({
                "error": msg
            })),
            AppError::Forbidden(msg) => HttpResponse::Forbidden().json(json!({
                "error": msg
            })),
            AppError::BadRequest(msg) => HttpResponse::BadRequest().json(json!({
                "error": msg
            })),
            AppError::NotFound(msg) => HttpResponse::NotFound().json(json!({
                "error": msg
            })),
            AppError::InternalServerError(msg) => HttpResponse::InternalServerError().json(json!({
                "error": msg
            })),
            // Database errors are also presented as generic internal server errors.
            AppError::DatabaseError(msg) => HttpResponse::InternalServerError().json(json!({
                "error": msg
            })),
            AppError::ValidationError(msg) => HttpResponse::UnprocessableEntity().json(json!({
                "error": msg
            })),
        }
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `sqlx::Error::RowNotFound` maps to `AppError::NotFound`; everything else
/// becomes `AppError::DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`,
/// preserving the per-field messages.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}
