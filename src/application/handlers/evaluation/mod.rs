//! Evaluation lifecycle handlers.
//!
//! - `StatusLifecycleEngine` - declared → reviewed at the review deadline
//! - `PublicityWindowWatcher` - publicized → finalized at the publicity deadline
//! - `BatchApproveHandler` - reviewed → approved by a reviewer
//! - `OpenPublicityHandler` - approved → publicized for a squad
//! - `PublishEvaluationHandler` - creates declared rows for a new form

mod batch_approve;
mod open_publicity;
mod publicity_watcher;
mod publish_evaluation;
mod run_guard;
mod status_lifecycle;

pub use batch_approve::{BatchApproveCommand, BatchApproveHandler, BatchApproveResult};
pub use open_publicity::{OpenPublicityCommand, OpenPublicityHandler, OpenPublicityResult};
pub use publicity_watcher::PublicityWindowWatcher;
pub use publish_evaluation::{
    PublishEvaluationCommand, PublishEvaluationHandler, PublishEvaluationResult,
};
pub use run_guard::{RunGuard, RunPermit};
pub use status_lifecycle::StatusLifecycleEngine;

#[cfg(test)]
pub(crate) mod testing {
    //! Row builders shared by the handler tests.

    use rust_decimal::Decimal;

    use crate::domain::evaluation::{
        AcademicTerm, AcademicYear, Deadlines, EvaluationRecord, EvaluationStatus, FormType,
        ScoreBreakdown, Semester, StatusTransition, StudentProfile,
    };
    use crate::domain::foundation::{StudentId, Timestamp};

    pub fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    pub fn profile(student_id: &str) -> StudentProfile {
        StudentProfile {
            student_id: StudentId::new(student_id).unwrap(),
            name: format!("学生{}", student_id),
            department: "计算机学院".into(),
            major: "软件工程".into(),
            squad: "一中队".into(),
            class_id: Some("2101".into()),
        }
    }

    fn record(form: FormType, student_id: &str) -> EvaluationRecord {
        let term = AcademicTerm::for_form(
            form,
            AcademicYear::parse("2023-2024").unwrap(),
            Semester::First,
            form.has_month().then_some(10),
        )
        .unwrap();
        EvaluationRecord {
            id: 0,
            form,
            student: profile(student_id),
            term,
            score: ScoreBreakdown::new(Decimal::new(80, 0))
                .with_bonus(Decimal::new(5, 0))
                .with_penalty(Decimal::new(2, 0)),
            raw_score: None,
            status: EvaluationStatus::Declared,
            deadlines: Deadlines::default(),
            description: None,
            remark: None,
        }
    }

    /// Declared row scoring 80 + 5 - 2 with the given review deadline.
    pub fn declared(form: FormType, student_id: &str, review_end: &str) -> EvaluationRecord {
        let mut r = record(form, student_id);
        r.deadlines.review_end = Some(ts(review_end));
        r
    }

    /// Publicized row with the given publicity deadline.
    pub fn publicized(form: FormType, student_id: &str, publicity_end: Option<&str>) -> EvaluationRecord {
        let mut r = record(form, student_id);
        r.advance(StatusTransition::review().unwrap());
        r.status = EvaluationStatus::Publicized;
        r.deadlines.publicity_end = publicity_end.map(ts);
        r
    }
}
