//! Error handling for the back-office server
//!
//! Service failures map onto HTTP responses here: validation and business
//! rule failures become 400, missing rows 404, unique violations 409 and
//! storage failures 500.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::workflow::WorkflowError;
use shared::OrderNumberError;
use thiserror::Error;

/// PostgreSQL SQLSTATE codes surfaced as client errors
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("{0}")]
    NotFound(String),

    // Business rule errors
    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    #[error("Conflict: {message}")]
    Conflict { resource: String, message: String },

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        AppError::NotFound(format!("{} with ID {} not found", resource, id))
    }

    pub fn conflict(resource: &str, message: impl Into<String>) -> Self {
        AppError::Conflict {
            resource: resource.to_string(),
            message: message.into(),
        }
    }

    /// HTTP status and machine readable code for this error
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation { .. } | AppError::ValidationError(_) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::InsufficientStock(_) => (StatusCode::BAD_REQUEST, "INSUFFICIENT_STOCK"),
            AppError::Conflict { .. } => (StatusCode::BAD_REQUEST, "CONFLICT"),
            AppError::DuplicateEntry(_) => (StatusCode::CONFLICT, "DUPLICATE_ENTRY"),
            AppError::DatabaseError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            AppError::Configuration(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR")
            }
            AppError::Internal(_) | AppError::InternalError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }

    /// Message safe to show to the client
    pub fn client_message(&self) -> String {
        match self {
            AppError::Validation { message, .. } => message.clone(),
            AppError::ValidationError(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::InsufficientStock(msg) => msg.clone(),
            AppError::Conflict { message, .. } => message.clone(),
            AppError::DuplicateEntry(field) => {
                format!("A record with this {} already exists", field)
            }
            AppError::DatabaseError(_) => "A database error occurred".to_string(),
            AppError::Configuration(msg) => format!("Configuration error: {}", msg),
            AppError::Internal(msg) => msg.clone(),
            AppError::InternalError(_) => "An internal server error occurred".to_string(),
        }
    }

    fn field(&self) -> Option<String> {
        match self {
            AppError::Validation { field, .. } => Some(field.clone()),
            AppError::Conflict { resource, .. } => Some(resource.clone()),
            AppError::DuplicateEntry(field) => Some(field.clone()),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        let (code, constraint) = match err.as_database_error() {
            Some(db_err) => (
                db_err.code().map(|c| c.into_owned()),
                db_err.constraint().map(str::to_string),
            ),
            None => (None, None),
        };

        match code.as_deref() {
            Some(UNIQUE_VIOLATION) => AppError::DuplicateEntry(
                constraint
                    .map(|c| unique_field(&c).to_string())
                    .unwrap_or_else(|| "value".to_string()),
            ),
            Some(FOREIGN_KEY_VIOLATION) => AppError::Conflict {
                resource: constraint.unwrap_or_else(|| "reference".to_string()),
                message: "The record is still referenced by other records".to_string(),
            },
            Some(CHECK_VIOLATION) => AppError::Conflict {
                resource: constraint.unwrap_or_else(|| "check".to_string()),
                message: "The change violates a data constraint".to_string(),
            },
            Some(NUMERIC_VALUE_OUT_OF_RANGE) => {
                AppError::ValidationError("A numeric value is out of range".to_string())
            }
            _ => AppError::DatabaseError(err),
        }
    }
}

/// Field name reported for a unique index
fn unique_field(constraint: &str) -> &str {
    match constraint {
        "idx_orders_order_number" => "order_number",
        other => other,
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Validation(msg) => AppError::ValidationError(msg),
            WorkflowError::ItemNotFound(id) => AppError::not_found("Item", id),
            err @ WorkflowError::InsufficientStock { .. } => {
                AppError::InsufficientStock(err.to_string())
            }
            WorkflowError::Conflict(msg) => AppError::conflict("order", msg),
        }
    }
}

impl From<OrderNumberError> for AppError {
    fn from(err: OrderNumberError) -> Self {
        match err {
            OrderNumberError::SequenceExhausted(_) => AppError::conflict("order_number", err.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by_key(|(field, _)| *field);

        match fields.first() {
            Some((field, field_errors)) => {
                let message = field_errors
                    .iter()
                    .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| format!("Invalid value for {}", field));
                AppError::Validation {
                    field: field.to_string(),
                    message,
                }
            }
            None => AppError::ValidationError(errors.to_string()),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!("Request failed: {}", self);
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.client_message(),
                field: self.field(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_workflow_errors_map_to_client_errors() {
        let id = Uuid::new_v4();

        let err: AppError = WorkflowError::ItemNotFound(id).into();
        assert_eq!(err.status_and_code().0, StatusCode::NOT_FOUND);

        let err: AppError = WorkflowError::InsufficientStock {
            item_id: id,
            item_name: "Widget".to_string(),
            available: 7,
            requested: 8,
        }
        .into();
        assert_eq!(err.status_and_code(), (StatusCode::BAD_REQUEST, "INSUFFICIENT_STOCK"));
        assert!(err.client_message().contains("Available: 7"));

        let err: AppError = WorkflowError::Conflict("Cannot edit a cancelled order".into()).into();
        assert_eq!(err.status_and_code(), (StatusCode::BAD_REQUEST, "CONFLICT"));

        let err: AppError = WorkflowError::Validation("Order must have at least one item".into()).into();
        assert_eq!(err.status_and_code(), (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"));
    }

    #[test]
    fn test_sequence_exhaustion_is_a_conflict() {
        let err: AppError = OrderNumberError::SequenceExhausted("ORD20260101".into()).into();
        assert_eq!(err.status_and_code().1, "CONFLICT");
    }

    #[test]
    fn test_not_found_message() {
        let err = AppError::not_found("Order", "abc");
        assert_eq!(err.client_message(), "Order with ID abc not found");
    }

    #[test]
    fn test_unmapped_sqlx_error_is_internal() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert_eq!(err.status_and_code().0, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_errors_report_first_field() {
        use validator::Validate;

        let input = shared::CreateCategoryInput {
            name: "x".repeat(150),
            description: None,
        };
        let err: AppError = input.validate().unwrap_err().into();
        match err {
            AppError::Validation { field, message } => {
                assert_eq!(field, "name");
                assert_eq!(message, "Name must be at most 100 characters");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
