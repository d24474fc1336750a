//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types
//! that form the vocabulary of the evaluation domain.

mod auth;
mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser, Role};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{StudentId, UserId};
pub use state_machine::StateMachine;
pub use timestamp::{Timestamp, TIMESTAMP_FORMAT};
