//! # API Error Type
//!
//! Unified error type for admin commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Counterbook                            │
//! │                                                                         │
//! │  Admin panel                 Rust Backend                               │
//! │  ───────────                 ────────────                               │
//! │                                                                         │
//! │  submit_invoice()                                                       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Form invalid? ──── CoreError::InvalidForm ───────┐             │  │
//! │  │         │                                          │             │  │
//! │  │         ▼                                          ▼             │  │
//! │  │  Database Error? ── DbError::QueryFailed ──────── ApiError ─────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ───────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  e.code = "VALIDATION_ERROR"                                            │
//! │  e.fieldErrors = [{ field: "items.0.quantity",                          │
//! │                     message: "quantity must be greater than 0" }]       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use counterbook_core::{CoreError, FieldError};
use counterbook_db::DbError;
use serde::Serialize;

/// API error returned from admin commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Item not found: 3f2c..."
/// }
/// ```
/// `fieldErrors` is present only for form validation failures.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Per-field failures, keyed by form path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<Vec<FieldError>>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Database operation failed (500)
    DatabaseError,

    /// Request conflicts with work already in progress (409)
    Conflict,

    /// No session, or the session expired (401)
    Unauthorized,

    /// Invoice draft operation failed
    InvoiceError,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            field_errors: None,
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a validation error carrying per-field failures.
    pub fn form(message: impl Into<String>, errors: Vec<FieldError>) -> Self {
        ApiError {
            field_errors: Some(errors),
            ..ApiError::validation(message)
        }
    }

    /// Creates a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Conflict, message)
    }

    /// Creates an invoice draft error.
    pub fn invoice(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::InvoiceError, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::form(
                format!("{} '{}' already exists", field, value),
                vec![FieldError::new(field.clone(), format!("{} already exists", field))],
            ),
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ItemNotFound(id) => ApiError::not_found("Item", &id),
            e @ (CoreError::LineNotFound { .. } | CoreError::TooManyLines { .. }) => {
                ApiError::invoice(e.to_string())
            }
            e @ CoreError::DuplicateConversion { .. } => ApiError::form(
                e.to_string(),
                vec![FieldError::new("toUnit", e.to_string())],
            ),
            e @ (CoreError::Unauthenticated | CoreError::SessionExpired) => {
                ApiError::new(ErrorCode::Unauthorized, e.to_string())
            }
            CoreError::InvalidForm { errors } => ApiError::form(
                format!("Form has {} invalid field(s)", errors.len()),
                errors,
            ),
            CoreError::Validation(e) => {
                let message = e.to_string();
                ApiError::form(message, vec![FieldError::from(e)])
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use counterbook_core::ValidationError;
    use serde_json::json;

    #[test]
    fn test_not_found_serializes_without_field_errors() {
        let err = ApiError::not_found("Item", "abc");
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({ "code": "NOT_FOUND", "message": "Item not found: abc" })
        );
    }

    #[test]
    fn test_invalid_form_keeps_every_field() {
        let err = ApiError::from(CoreError::InvalidForm {
            errors: vec![
                FieldError::new("customerName", "customerName is required"),
                FieldError::new("items.0.quantity", "quantity must be greater than 0"),
            ],
        });

        assert_eq!(err.code, ErrorCode::ValidationError);
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["fieldErrors"][1]["field"], "items.0.quantity");
        assert_eq!(value["message"], "Form has 2 invalid field(s)");
    }

    #[test]
    fn test_single_validation_error_becomes_field_error() {
        let err = ApiError::from(CoreError::Validation(ValidationError::Required {
            field: "code".to_string(),
        }));
        let fields = err.field_errors.unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].field, "code");
    }

    #[test]
    fn test_session_errors_are_unauthorized() {
        assert_eq!(ApiError::from(CoreError::Unauthenticated).code, ErrorCode::Unauthorized);
        assert_eq!(ApiError::from(CoreError::SessionExpired).code, ErrorCode::Unauthorized);
    }

    #[test]
    fn test_duplicate_conversion_message() {
        let err = ApiError::from(CoreError::DuplicateConversion {
            from: "BOX".to_string(),
            to: "PCS".to_string(),
        });
        assert_eq!(err.message, "This unit conversion already exists");
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_db_errors_hide_details() {
        let err = ApiError::from(DbError::QueryFailed("near \"SELEC\": syntax error".into()));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.message, "Database operation failed");

        let dup = ApiError::from(DbError::duplicate("code", "ITEM001"));
        assert_eq!(dup.message, "code 'ITEM001' already exists");
        assert_eq!(dup.field_errors.unwrap()[0].field, "code");
    }
}
