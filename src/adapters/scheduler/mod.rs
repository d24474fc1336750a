//! Background scheduling for the lifecycle jobs.
//!
//! - `Schedule` - fixed interval or daily wall-clock time
//! - `PeriodicJob` - runs a `ScheduledJob` until shutdown

mod periodic_job;
mod schedule;

pub use periodic_job::{PeriodicJob, ScheduledJob};
pub use schedule::Schedule;
