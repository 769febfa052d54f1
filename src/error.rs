use axum::http::StatusCode;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::response::ApiResponse;

/// Standard error type for the Sumi backend.
#[derive(Debug, Error)]
pub enum SumiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation errors")]
    ValidationErrors(Vec<FieldError>),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl SumiError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            SumiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            SumiError::Conflict(_) => StatusCode::CONFLICT,
            SumiError::Validation(_) => StatusCode::BAD_REQUEST,
            SumiError::ValidationErrors(_) => StatusCode::BAD_REQUEST,
            SumiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SumiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code string for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            SumiError::Unauthorized(_) => "UNAUTHORIZED",
            SumiError::Conflict(_) => "CONFLICT",
            SumiError::Validation(_) => "VALIDATION_ERROR",
            SumiError::ValidationErrors(_) => "VALIDATION_ERROR",
            SumiError::Internal(_) => "INTERNAL_ERROR",
            SumiError::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Create a validation error with field-level details.
    pub fn validation_fields(errors: Vec<FieldError>) -> Self {
        SumiError::ValidationErrors(errors)
    }
}

/// Error detail for API responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldError>>,
}

/// Field-level validation error.
///
/// ```json
/// {
///   "field": "email",
///   "message": "must be a valid email address"
/// }
/// ```
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    /// Create a new field error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        FieldError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl axum::response::IntoResponse for SumiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let fields = match &self {
            SumiError::ValidationErrors(errs) => Some(errs.clone()),
            _ => None,
        };
        // Internal detail (config problems, store failures) is logged at the
        // boundary and never returned to the caller.
        let message = match &self {
            SumiError::ValidationErrors(errs) => errs
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect::<Vec<_>>()
                .join("; "),
            SumiError::Internal(detail) => {
                tracing::error!("internal error: {}", detail);
                "Internal server error".to_string()
            }
            SumiError::Database(err) => {
                tracing::error!("database error: {}", err);
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };
        let body: ApiResponse<()> = ApiResponse {
            success: false,
            data: None,
            error: Some(ErrorDetail {
                code: self.error_code().to_string(),
                message,
                fields,
            }),
        };

        (status, axum::Json(body)).into_response()
    }
}
