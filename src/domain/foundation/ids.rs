//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Internal user identifier (primary key of the `users` table).
///
/// This is the address notifications are delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Creates a UserId, rejecting non-positive values.
    pub fn new(id: i64) -> Result<Self, ValidationError> {
        if id <= 0 {
            return Err(ValidationError::invalid_format(
                "user_id",
                format!("must be positive, got {}", id),
            ));
        }
        Ok(Self(id))
    }

    /// Returns the raw id.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Student number as printed on the student card (学号).
///
/// Evaluation rows are keyed by this; it is resolved to a [`UserId`]
/// before a student can be notified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(String);

impl StudentId {
    /// Creates a new StudentId, returning error if blank.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("student_id"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
