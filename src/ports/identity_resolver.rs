//! Identity resolution port.
//!
//! Evaluation rows know students by student number; notifications are
//! addressed to internal user ids.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, StudentId, UserId};

/// Maps student numbers to internal user ids.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Resolves a student number.
    ///
    /// Returns `Ok(None)` if no user carries this student number; callers
    /// log and skip such rows.
    async fn resolve(&self, student_id: &StudentId) -> Result<Option<UserId>, DomainError>;
}
