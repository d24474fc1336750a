//! In-memory adapters.
//!
//! Deterministic stand-ins for the Postgres adapters, used by the unit and
//! integration test suites.

mod evaluation_store;
mod notification_sink;
mod student_directory;

pub use evaluation_store::InMemoryEvaluationStore;
pub use notification_sink::InMemoryNotificationSink;
pub use student_directory::InMemoryStudentDirectory;
