// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for entire application

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;

/// Application-specific error types
/// DOCUMENTATION: Comprehensive error enum for all possible failures
/// Each variant maps to an HTTP status code; the JSON envelope repeats it in `code`
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("Content contains sensitive words")]
    SensitiveContent,

    #[error("Method not allowed (only {0})")]
    MethodNotAllowed(&'static str),

    /// Detail is logged, never sent to the client
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Detail is logged, never sent to the client
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Server configuration error: {0}")]
    ConfigError(String),

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

impl AppError {
    /// Message safe to show to clients
    pub fn public_message(&self) -> String {
        match self {
            AppError::DatabaseError(_) => {
                "Database operation failed. Please try again later.".to_string()
            }
            AppError::StorageError(_) => {
                "File storage operation failed. Please try again later.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        log::error!("Database error: {}", e);
        AppError::DatabaseError(e.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        log::error!("File storage error: {}", e);
        AppError::StorageError(e.to_string())
    }
}

/// Convert AppError to HTTP response
/// DOCUMENTATION: Maps error types to HTTP status codes and JSON envelopes
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        let body = json!({
            "code": status.as_u16(),
            "data": null,
            "message": self.public_message(),
        });

        HttpResponse::build(status).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::SensitiveContent => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ExternalApiError(_) => StatusCode::BAD_GATEWAY,
            AppError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::SensitiveContent.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::MethodNotAllowed("POST").status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            AppError::ExternalApiError("down".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(AppError::RateLimitExceeded.status_code(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_database_error_hides_details() {
        let err = AppError::DatabaseError("unable to open /invalid/path/to/database.db".into());
        let message = err.public_message().to_lowercase();
        assert!(!message.contains("invalid"));
        assert!(!message.contains("path"));
    }

    #[actix_web::test]
    async fn test_error_envelope() {
        let resp = AppError::ValidationError("Content cannot be empty".into()).error_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["code"], 400);
        assert!(value["data"].is_null());
        assert_eq!(value["message"], "Content cannot be empty");
    }
}
