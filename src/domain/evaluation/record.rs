//! Evaluation rows and the values used to create and filter them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AcademicTerm, EvaluationStatus, FormType, ScoreBreakdown, StatusTransition};
use crate::domain::foundation::{StudentId, Timestamp, ValidationError};

/// Organizational attributes of the student a row belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub student_id: StudentId,
    pub name: String,
    pub department: String,
    pub major: String,
    pub squad: String,
    pub class_id: Option<String>,
}

/// The five phase deadlines of a form. All are optional on the row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deadlines {
    pub declare_start: Option<Timestamp>,
    pub declare_end: Option<Timestamp>,
    pub review_end: Option<Timestamp>,
    pub publicity_start: Option<Timestamp>,
    pub publicity_end: Option<Timestamp>,
}

impl Deadlines {
    /// Checks the deadlines a newly published form of `form` must carry.
    ///
    /// Present deadlines must be non-decreasing in phase order. Reviewable
    /// forms need a review deadline; every form needs a publicity end so the
    /// publicity watcher can close it.
    pub fn validate_for(&self, form: FormType) -> Result<(), ValidationError> {
        if form.is_reviewable() && self.review_end.is_none() {
            return Err(ValidationError::empty_field("review_end_time"));
        }
        if self.publicity_end.is_none() {
            return Err(ValidationError::empty_field("publicity_end_time"));
        }

        let ordered = [
            ("declare_start_time", self.declare_start),
            ("declare_end_time", self.declare_end),
            ("review_end_time", self.review_end),
            ("publicity_start_time", self.publicity_start),
            ("publicity_end_time", self.publicity_end),
        ];
        let mut previous: Option<(&str, Timestamp)> = None;
        for (field, value) in ordered {
            let Some(value) = value else { continue };
            if let Some((prev_field, prev)) = previous {
                if value.is_before(&prev) {
                    return Err(ValidationError::invalid_format(
                        field,
                        format!("must not be earlier than {} ({})", prev_field, prev),
                    ));
                }
            }
            previous = Some((field, value));
        }
        Ok(())
    }
}

/// One row of one evaluation table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub id: i64,
    pub form: FormType,
    pub student: StudentProfile,
    pub term: AcademicTerm,
    pub score: ScoreBreakdown,
    pub raw_score: Option<Decimal>,
    pub status: EvaluationStatus,
    pub deadlines: Deadlines,
    pub description: Option<String>,
    pub remark: Option<String>,
}

impl EvaluationRecord {
    /// True when a deadline-mode review run would pick this row up at `now`.
    pub fn is_review_due(&self, now: &Timestamp) -> bool {
        self.status == EvaluationStatus::Declared
            && self
                .deadlines
                .review_end
                .map_or(false, |end| !end.is_after(now))
    }

    /// True when the publicity watcher would finalize this row at `now`.
    pub fn is_publicity_over(&self, now: &Timestamp) -> bool {
        self.status == EvaluationStatus::Publicized
            && self
                .deadlines
                .publicity_end
                .map_or(false, |end| !end.is_after(now))
    }

    /// Applies `transition` if the row is in its prior state. Entering
    /// review stores the computed raw score. Returns true when moved.
    pub fn advance(&mut self, transition: StatusTransition) -> bool {
        if !transition.apply(&mut self.status) {
            return false;
        }
        if transition.next() == EvaluationStatus::Reviewed {
            self.raw_score = Some(self.score.raw_score());
        }
        true
    }
}

/// A row the publicity watcher finalized, kept for notification addressing.
///
/// `student_id` is the column value as stored. The row is already final when
/// this is read, so a malformed id only costs that row its notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedRecord {
    pub student_id: String,
    pub publicity_end: Timestamp,
}

/// Optional narrowing of a batch approval.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveFilter {
    pub major: Option<String>,
    pub class_id: Option<String>,
}

impl ApproveFilter {
    pub fn matches(&self, student: &StudentProfile) -> bool {
        self.major.as_ref().map_or(true, |m| &student.major == m)
            && self
                .class_id
                .as_ref()
                .map_or(true, |c| student.class_id.as_ref() == Some(c))
    }
}

/// A department's squad, the unit publicity is opened for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquadScope {
    pub department: String,
    pub squad: String,
}

impl SquadScope {
    pub fn contains(&self, student: &StudentProfile) -> bool {
        student.department == self.department && student.squad == self.squad
    }
}

/// Which students a newly published form is created for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterScope {
    pub department: String,
    pub squad: Option<String>,
    pub major: Option<String>,
}

impl RosterScope {
    pub fn contains(&self, student: &StudentProfile) -> bool {
        student.department == self.department
            && self.squad.as_ref().map_or(true, |s| &student.squad == s)
            && self.major.as_ref().map_or(true, |m| &student.major == m)
    }
}

/// Everything needed to create the draft rows of one form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationPlan {
    pub form: FormType,
    pub term: AcademicTerm,
    pub description: Option<String>,
    pub base_score: Decimal,
    pub deadlines: Deadlines,
}

impl EvaluationPlan {
    /// Builds the draft row this plan creates for `student`.
    pub fn draft_for(&self, id: i64, student: StudentProfile) -> EvaluationRecord {
        let score = if self.form.has_score_columns() {
            ScoreBreakdown::new(self.base_score)
                .with_bonus(Decimal::ZERO)
                .with_penalty(Decimal::ZERO)
        } else {
            ScoreBreakdown::default()
        };
        let mut deadlines = self.deadlines.clone();
        if !self.form.is_reviewable() {
            deadlines.declare_start = None;
            deadlines.declare_end = None;
            deadlines.review_end = None;
        }
        EvaluationRecord {
            id,
            form: self.form,
            student,
            term: self.term.clone(),
            score,
            raw_score: None,
            status: EvaluationStatus::Declared,
            deadlines,
            description: self.description.clone(),
            remark: None,
        }
    }
}
