//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `postgres` - evaluation tables, `users` and `messages`
//! - `memory` - in-memory store, sink and directory used by test suites
//! - `auth` - HS256 token validation
//! - `http` - axum routers
//! - `scheduler` - background review and publicity jobs

pub mod auth;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod scheduler;

pub use memory::{InMemoryEvaluationStore, InMemoryNotificationSink, InMemoryStudentDirectory};
pub use postgres::{PostgresEvaluationStore, PostgresMessageSink, PostgresStudentDirectory};
pub use scheduler::{PeriodicJob, Schedule, ScheduledJob};
