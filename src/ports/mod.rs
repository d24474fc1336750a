//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `EvaluationRecordStore` - Guarded bulk operations over the evaluation tables
//! - `StudentDirectory` - Roster lookups by department, squad, and major
//!
//! ## Collaborator Ports
//!
//! - `NotificationSink` - In-app message delivery
//! - `IdentityResolver` - Student number to user id mapping
//! - `SessionValidator` - Bearer token validation

mod evaluation_store;
mod identity_resolver;
mod notification_sink;
mod session_validator;
mod student_directory;

pub use evaluation_store::{EvaluationRecordStore, PublicityClosure};
pub use identity_resolver::IdentityResolver;
pub use notification_sink::NotificationSink;
pub use session_validator::SessionValidator;
pub use student_directory::StudentDirectory;
