//! PostgreSQL adapters - Database implementations for the ports.
//!
//! - `PostgresEvaluationStore` - Guarded bulk updates over the evaluation tables
//! - `PostgresMessageSink` - Notifications persisted to the `messages` inbox
//! - `PostgresStudentDirectory` - Student lookups against `users`

mod evaluation_store;
mod message_sink;
mod student_directory;

pub use evaluation_store::PostgresEvaluationStore;
pub use message_sink::PostgresMessageSink;
pub use student_directory::PostgresStudentDirectory;
