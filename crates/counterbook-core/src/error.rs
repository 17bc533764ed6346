//! # Error Types
//!
//! Domain-specific error types for counterbook-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  counterbook-core errors (this file)                                    │
//! │  ├── CoreError        - General domain errors                           │
//! │  ├── ValidationError  - A single field rule failure                     │
//! │  └── FieldError       - Serializable entry of a form report             │
//! │                                                                         │
//! │  counterbook-db errors (separate crate)                                 │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  Command errors (in app)                                                │
//! │  └── ApiError         - What the admin panel sees (serialized)          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Admin panel   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The invoice calculator itself never returns an error.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Catalog item cannot be found (unknown id or soft-deleted).
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// An invoice line index is outside the current line list.
    #[error("Line {index} does not exist (invoice has {len} lines)")]
    LineNotFound { index: usize, len: usize },

    /// Invoice has reached the maximum number of lines.
    #[error("Invoice cannot have more than {max} lines")]
    TooManyLines { max: usize },

    /// The same from/to unit pair is already defined for the item.
    #[error("This unit conversion already exists")]
    DuplicateConversion { from: String, to: String },

    /// No user is signed in.
    #[error("Not signed in")]
    Unauthenticated,

    /// The stored access token is past its expiry.
    ///
    /// ## User Workflow
    /// ```text
    /// Submit invoice
    ///      │
    ///      ▼
    /// access_token(now): expires_at <= now
    ///      │
    ///      ▼
    /// SessionExpired ──► admin panel refreshes tokens or shows login
    /// ```
    #[error("Session has expired, please sign in again")]
    SessionExpired,

    /// Whole-form validation failed; carries every field failure.
    #[error("Form has {} invalid field(s)", errors.len())]
    InvalidForm { errors: Vec<FieldError> },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: f64, max: f64 },

    /// Value must be positive.
    #[error("{field} must be greater than 0")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Not a usable number (NaN or infinite).
    #[error("{field} must be a number")]
    NotANumber { field: String },

    /// Invalid format (e.g., invalid UUID, bad item code characters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate item code).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

impl ValidationError {
    /// The field this error is about.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::Negative { field }
            | ValidationError::NotANumber { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::Duplicate { field, .. } => field,
        }
    }
}

// =============================================================================
// Field Error (form report entry)
// =============================================================================

/// One entry of a form validation report.
///
/// `field` is a path into the form, e.g. `customerName` or `items.0.quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        FieldError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<ValidationError> for FieldError {
    fn from(err: ValidationError) -> Self {
        FieldError {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
