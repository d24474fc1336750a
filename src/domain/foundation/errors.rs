//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: i32,
        max: i32,
        actual: i32,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: i32, max: i32, actual: i32) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    UnknownFormType,

    // Schema errors (a form type not enabled in this deployment)
    TableMissing,
    ColumnMissing,

    // State errors
    InvalidStateTransition,
    PendingReview,
    RunInProgress,
    AlreadyPublished,

    // Authorization errors
    Unauthorized,
    Forbidden,

    // Collaborator errors
    IdentityUnresolved,
    NotificationFailed,

    // Infrastructure errors
    DatabaseError,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::UnknownFormType => "UNKNOWN_FORM_TYPE",
            ErrorCode::TableMissing => "TABLE_MISSING",
            ErrorCode::ColumnMissing => "COLUMN_MISSING",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::PendingReview => "PENDING_REVIEW",
            ErrorCode::RunInProgress => "RUN_IN_PROGRESS",
            ErrorCode::AlreadyPublished => "ALREADY_PUBLISHED",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::IdentityUnresolved => "IDENTITY_UNRESOLVED",
            ErrorCode::NotificationFailed => "NOTIFICATION_FAILED",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::ValidationFailed,
            message: message.into(),
            details: HashMap::new(),
        }
        .with_detail("field", field.into())
    }

    /// Creates a database error, keeping the driver message.
    pub fn database(context: &str, err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::DatabaseError, format!("{}: {}", context, err))
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// True for errors that mean "this form type is not enabled here".
    pub fn is_schema_absence(&self) -> bool {
        matches!(self.code, ErrorCode::TableMissing | ErrorCode::ColumnMissing)
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        let field = match &err {
            ValidationError::EmptyField { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field.clone(),
        };
        DomainError::validation(field, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_field_displays_correctly() {
        let err = ValidationError::empty_field("student_id");
        assert_eq!(format!("{}", err), "Field 'student_id' cannot be empty");
    }

    #[test]
    fn validation_error_out_of_range_displays_correctly() {
        let err = ValidationError::out_of_range("month", 1, 12, 13);
        assert_eq!(
            format!("{}", err),
            "Field 'month' must be between 1 and 12, got 13"
        );
    }

    #[test]
    fn domain_error_displays_code_and_message() {
        let err = DomainError::new(ErrorCode::TableMissing, "Table sports_arts_evaluation not found");
        assert_eq!(
            format!("{}", err),
            "[TABLE_MISSING] Table sports_arts_evaluation not found"
        );
    }

    #[test]
    fn domain_error_with_detail_adds_detail() {
        let err = DomainError::new(ErrorCode::ValidationFailed, "Validation failed")
            .with_detail("field", "semester")
            .with_detail("reason", "must be 1 or 2");

        assert_eq!(err.details.get("field"), Some(&"semester".to_string()));
        assert_eq!(err.details.get("reason"), Some(&"must be 1 or 2".to_string()));
    }

    #[test]
    fn schema_absence_covers_missing_table_and_column() {
        assert!(DomainError::new(ErrorCode::TableMissing, "x").is_schema_absence());
        assert!(DomainError::new(ErrorCode::ColumnMissing, "x").is_schema_absence());
        assert!(!DomainError::new(ErrorCode::DatabaseError, "x").is_schema_absence());
    }

    #[test]
    fn validation_error_converts_with_field_detail() {
        let err: DomainError = ValidationError::empty_field("academic_year").into();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.details.get("field"), Some(&"academic_year".to_string()));
    }

    #[test]
    fn error_code_display_formats_correctly() {
        assert_eq!(format!("{}", ErrorCode::RunInProgress), "RUN_IN_PROGRESS");
        assert_eq!(format!("{}", ErrorCode::InternalError), "INTERNAL_ERROR");
    }
}
