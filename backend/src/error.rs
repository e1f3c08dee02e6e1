use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use tour_platform_shared::{ERROR_GATEWAY_UNAVAILABLE, ERROR_ROOMS_UNAVAILABLE};

/// A single offending form field, with a human-readable label for it.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub label: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Payment gateway error: {0}")]
    Gateway(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(crate::utils::validation::to_field_errors(&errors))
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Validation(fields) => HttpResponse::BadRequest().json(ValidationErrorResponse {
                error: "validation_error",
                message: "One or more fields are invalid".to_string(),
                fields: fields.clone(),
            }),
            AppError::Gateway(msg) => {
                tracing::warn!("Payment gateway failure: {}", msg);
                HttpResponse::BadGateway().json(ErrorResponse {
                    error: "gateway_error",
                    message: ERROR_GATEWAY_UNAVAILABLE.to_string(),
                })
            }
            AppError::NotFound(msg) => HttpResponse::NotFound().json(ErrorResponse {
                error: "not_found",
                message: msg.clone(),
            }),
            AppError::Conflict(_) => HttpResponse::Conflict().json(ErrorResponse {
                error: "conflict",
                message: ERROR_ROOMS_UNAVAILABLE.to_string(),
            }),
            // Internal detail goes to the log, never to the caller
            other => {
                tracing::error!("Internal error: {}", other);
                HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "internal_server_error",
                    message: "An internal server error occurred".to_string(),
                })
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

#[derive(Serialize)]
struct ValidationErrorResponse {
    error: &'static str,
    message: String,
    fields: Vec<FieldError>,
}
