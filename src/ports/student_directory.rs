//! Student directory port.
//!
//! Read access to the user roster for the review actions: who a form is
//! published to, and who is told a squad's forms went into publicity.

use async_trait::async_trait;

use crate::domain::evaluation::{RosterScope, SquadScope, StudentProfile};
use crate::domain::foundation::{DomainError, UserId};

/// Lists students by organizational scope.
#[async_trait]
pub trait StudentDirectory: Send + Sync {
    /// Students a new form is created for.
    async fn find_students(&self, scope: &RosterScope) -> Result<Vec<StudentProfile>, DomainError>;

    /// User ids of every student in a squad.
    async fn squad_members(&self, scope: &SquadScope) -> Result<Vec<UserId>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn _accepts_dyn(_: &dyn StudentDirectory) {}
}
