//! PublishEvaluationHandler - creates the draft rows of a new form.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

use crate::domain::evaluation::{
    AcademicTerm, AcademicYear, Deadlines, EvaluationPlan, FormType, RosterScope, Semester,
};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{EvaluationRecordStore, StudentDirectory};

/// Command to publish one form to a roster of students.
#[derive(Debug, Clone)]
pub struct PublishEvaluationCommand {
    pub form: FormType,
    pub academic_year: String,
    pub semester: i16,
    pub month: Option<u8>,
    pub description: Option<String>,
    pub base_score: Decimal,
    pub deadlines: Deadlines,
    pub roster: RosterScope,
}

/// Result of publishing a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishEvaluationResult {
    pub form: FormType,
    pub created: u64,
}

/// Handler that bulk-inserts one declared row per eligible student.
pub struct PublishEvaluationHandler {
    store: Arc<dyn EvaluationRecordStore>,
    directory: Arc<dyn StudentDirectory>,
}

impl PublishEvaluationHandler {
    pub fn new(store: Arc<dyn EvaluationRecordStore>, directory: Arc<dyn StudentDirectory>) -> Self {
        Self { store, directory }
    }

    pub async fn handle(
        &self,
        cmd: PublishEvaluationCommand,
    ) -> Result<PublishEvaluationResult, DomainError> {
        // 1. Validate the plan
        let plan = Self::plan(&cmd)?;

        if !self.store.table_exists(cmd.form).await? {
            return Err(DomainError::new(
                ErrorCode::TableMissing,
                format!("{}未启用", cmd.form.display_name()),
            )
            .with_detail("table", cmd.form.table_name()));
        }

        // 2. One form per term and roster
        if self.store.term_exists(cmd.form, &plan.term, &cmd.roster).await? {
            return Err(DomainError::new(
                ErrorCode::AlreadyPublished,
                format!("该{}已存在，请勿重复发布", cmd.form.display_name()),
            ));
        }

        // 3. Resolve the roster
        let students = self.directory.find_students(&cmd.roster).await?;
        if students.is_empty() {
            return Err(DomainError::validation("roster", "未找到符合条件的学生信息"));
        }

        // 4. Insert drafts
        let created = self.store.insert_drafts(&plan, &students).await?;
        info!(
            table = cmd.form.table_name(),
            created,
            academic_year = %plan.term.academic_year,
            semester = plan.term.semester.number(),
            "Evaluation published"
        );

        Ok(PublishEvaluationResult {
            form: cmd.form,
            created,
        })
    }

    fn plan(cmd: &PublishEvaluationCommand) -> Result<EvaluationPlan, DomainError> {
        let academic_year = AcademicYear::parse(&cmd.academic_year)?;
        let semester = Semester::try_from(cmd.semester)?;
        let term = AcademicTerm::for_form(cmd.form, academic_year, semester, cmd.month)?;

        if cmd.form.has_score_columns() && cmd.base_score.is_sign_negative() {
            return Err(DomainError::validation("base_score", "base score must not be negative"));
        }
        cmd.deadlines.validate_for(cmd.form)?;

        Ok(EvaluationPlan {
            form: cmd.form,
            term,
            description: cmd.description.clone(),
            base_score: cmd.base_score,
            deadlines: cmd.deadlines.clone(),
        })
    }
}
