//! Evaluation domain: form types, statuses, scores, and run reports.

mod form_type;
mod notification;
mod record;
mod report;
mod score;
mod status;
mod term;

pub use form_type::{FormType, TableDescriptor, PUBLICITY_END_COLUMN, REVIEW_END_COLUMN};
pub use notification::{Notification, NotificationCategory, SYSTEM_SENDER};
pub use record::{
    ApproveFilter, ClosedRecord, Deadlines, EvaluationPlan, EvaluationRecord, RosterScope,
    SquadScope, StudentProfile,
};
pub use report::{SkipReason, TableOutcome, TableResult, TransitionMode, TransitionReport};
pub use score::ScoreBreakdown;
pub use status::{EvaluationStatus, StatusTransition};
pub use term::{AcademicTerm, AcademicYear, Semester};
