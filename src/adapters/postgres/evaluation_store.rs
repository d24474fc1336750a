//! PostgreSQL implementation of EvaluationRecordStore.
//!
//! Table and column names are spliced into statements from [`FormType`]
//! only; every value is a bound parameter. Each guarded update takes its
//! `WHERE status` and `SET status` codes from one [`StatusTransition`].

use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::domain::evaluation::{
    AcademicTerm, ApproveFilter, ClosedRecord, EvaluationPlan, EvaluationStatus, FormType,
    RosterScope, SquadScope, StatusTransition, StudentProfile, TransitionMode,
    PUBLICITY_END_COLUMN, REVIEW_END_COLUMN,
};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};
use crate::ports::{EvaluationRecordStore, PublicityClosure};

/// PostgreSQL implementation of the EvaluationRecordStore port.
pub struct PostgresEvaluationStore {
    pool: PgPool,
}

impl PostgresEvaluationStore {
    /// Creates a new PostgresEvaluationStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Row selected when a publicity window closes.
#[derive(Debug, sqlx::FromRow)]
struct ExpiredRow {
    student_id: String,
    publicity_end_time: NaiveDateTime,
}

impl From<ExpiredRow> for ClosedRecord {
    fn from(row: ExpiredRow) -> Self {
        ClosedRecord {
            student_id: row.student_id,
            publicity_end: Timestamp::from_naive(row.publicity_end_time),
        }
    }
}

/// Maps driver errors, recognizing undefined tables and columns.
fn map_db_error(context: &str, form: FormType, e: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &e {
        match db_err.code().as_deref() {
            Some("42P01") => {
                return DomainError::new(
                    ErrorCode::TableMissing,
                    format!("Table {} does not exist", form.table_name()),
                )
                .with_detail("table", form.table_name())
            }
            Some("42703") => {
                return DomainError::new(ErrorCode::ColumnMissing, db_err.message().to_string())
                    .with_detail("table", form.table_name())
            }
            _ => {}
        }
    }
    DomainError::database(context, e).with_detail("table", form.table_name())
}

mod sql {
    //! Statement text per form type.

    use super::*;

    const RAW_SCORE: &str = "base_score + COALESCE(total_bonus, 0) - COALESCE(total_penalty, 0)";

    pub fn has_rows(form: FormType) -> String {
        format!("SELECT EXISTS (SELECT 1 FROM {})", form.table_name())
    }

    /// `$1` is "now" in deadline mode; force mode binds nothing.
    pub fn review_transition(form: FormType, mode: TransitionMode, review: StatusTransition) -> String {
        let mut sql = format!(
            "UPDATE {} SET status = {}, raw_score = {} WHERE status = {}",
            form.table_name(),
            review.next().code(),
            RAW_SCORE,
            review.prior().code(),
        );
        if mode == TransitionMode::Deadline {
            sql.push_str(&format!(" AND {} <= $1", REVIEW_END_COLUMN));
        }
        sql
    }

    fn expired_predicate(finalize: StatusTransition) -> String {
        format!(
            "status = {} AND {col} IS NOT NULL AND {col} <= $1",
            finalize.prior().code(),
            col = PUBLICITY_END_COLUMN,
        )
    }

    pub fn select_expired(form: FormType, finalize: StatusTransition) -> String {
        format!(
            "SELECT student_id, {} FROM {} WHERE {} ORDER BY id FOR UPDATE",
            PUBLICITY_END_COLUMN,
            form.table_name(),
            expired_predicate(finalize),
        )
    }

    pub fn finalize_expired(form: FormType, finalize: StatusTransition) -> String {
        format!(
            "UPDATE {} SET status = {} WHERE {}",
            form.table_name(),
            finalize.next().code(),
            expired_predicate(finalize),
        )
    }

    /// `$1` major, `$2` class id; either may be NULL.
    pub fn batch_approve(form: FormType, approve: StatusTransition) -> String {
        format!(
            "UPDATE {} SET status = {} WHERE status = {} \
             AND ($1::text IS NULL OR major = $1) \
             AND ($2::text IS NULL OR class_id = $2)",
            form.table_name(),
            approve.next().code(),
            approve.prior().code(),
        )
    }

    pub fn count_pending_review(form: FormType) -> String {
        format!(
            "SELECT COUNT(*) FROM {} WHERE department = $1 AND squad = $2 AND status IN ({}, {})",
            form.table_name(),
            EvaluationStatus::Declared.code(),
            EvaluationStatus::Reviewed.code(),
        )
    }

    pub fn open_publicity(form: FormType, open: StatusTransition) -> String {
        format!(
            "UPDATE {} SET status = {}, remark = NULL \
             WHERE department = $1 AND squad = $2 AND status = {}",
            form.table_name(),
            open.next().code(),
            open.prior().code(),
        )
    }

    /// `$1` year, `$2` semester, `$3` department, `$4` squad, `$5` major,
    /// and `$6` month on monthly tables.
    pub fn term_exists(form: FormType) -> String {
        let mut sql = format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE academic_year = $1 AND semester = $2 \
             AND department = $3 AND ($4::text IS NULL OR squad = $4) \
             AND ($5::text IS NULL OR major = $5)",
            form.table_name()
        );
        if form.has_month() {
            sql.push_str(" AND month = $6");
        }
        sql.push(')');
        sql
    }

    /// Columns written when a draft row is created, in bind order.
    pub fn draft_columns(form: FormType) -> Vec<&'static str> {
        let mut columns = vec![
            "academic_year",
            "semester",
            "description",
            "student_id",
            "name",
            "squad",
            "department",
            "major",
            "class_id",
            "publicity_start_time",
            PUBLICITY_END_COLUMN,
            "status",
        ];
        if form.has_score_columns() {
            columns.extend(["base_score", "total_bonus", "total_penalty"]);
        }
        if form.is_reviewable() {
            columns.extend(["declare_start_time", "declare_end_time", REVIEW_END_COLUMN]);
        }
        if form.has_month() {
            columns.push("month");
        }
        columns
    }
}

#[async_trait]
impl EvaluationRecordStore for PostgresEvaluationStore {
    async fn table_exists(&self, form: FormType) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = current_schema() AND table_name = $1
            )
            "#,
        )
        .bind(form.table_name())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to inspect tables", form, e))
    }

    async fn column_exists(&self, form: FormType, column: &'static str) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.columns
                WHERE table_schema = current_schema() AND table_name = $1 AND column_name = $2
            )
            "#,
        )
        .bind(form.table_name())
        .bind(column)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to inspect columns", form, e))
    }

    async fn has_rows(&self, form: FormType) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>(&sql::has_rows(form))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to check for rows", form, e))
    }

    async fn apply_review_transition(
        &self,
        form: FormType,
        mode: TransitionMode,
        now: &Timestamp,
    ) -> Result<u64, DomainError> {
        if !form.is_reviewable() {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("{} has no review phase", form.table_name()),
            ));
        }

        let statement = sql::review_transition(form, mode, StatusTransition::review()?);
        let mut query = sqlx::query(&statement);
        if mode == TransitionMode::Deadline {
            query = query.bind(*now.as_naive());
        }
        let result = query
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to apply review transition", form, e))?;
        Ok(result.rows_affected())
    }

    async fn close_publicity(
        &self,
        form: FormType,
        now: &Timestamp,
    ) -> Result<PublicityClosure, DomainError> {
        let finalize = StatusTransition::finalize()?;
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error("Failed to begin transaction", form, e))?;

        let rows: Vec<ExpiredRow> = sqlx::query_as(&sql::select_expired(form, finalize))
            .bind(*now.as_naive())
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| map_db_error("Failed to select expired rows", form, e))?;

        if rows.is_empty() {
            tx.rollback()
                .await
                .map_err(|e| map_db_error("Failed to end transaction", form, e))?;
            return Ok(PublicityClosure::default());
        }

        let result = sqlx::query(&sql::finalize_expired(form, finalize))
            .bind(*now.as_naive())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_error("Failed to finalize expired rows", form, e))?;

        tx.commit()
            .await
            .map_err(|e| map_db_error("Failed to commit transaction", form, e))?;

        Ok(PublicityClosure {
            closed: rows.into_iter().map(ClosedRecord::from).collect(),
            affected: result.rows_affected(),
        })
    }

    async fn batch_approve(&self, form: FormType, filter: &ApproveFilter) -> Result<u64, DomainError> {
        let result = sqlx::query(&sql::batch_approve(form, StatusTransition::approve()?))
            .bind(filter.major.as_deref())
            .bind(filter.class_id.as_deref())
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to approve rows", form, e))?;
        Ok(result.rows_affected())
    }

    async fn count_pending_review(&self, form: FormType, scope: &SquadScope) -> Result<u64, DomainError> {
        let count: i64 = sqlx::query_scalar(&sql::count_pending_review(form))
            .bind(&scope.department)
            .bind(&scope.squad)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to count pending rows", form, e))?;
        Ok(count.max(0) as u64)
    }

    async fn open_publicity(&self, form: FormType, scope: &SquadScope) -> Result<u64, DomainError> {
        let result = sqlx::query(&sql::open_publicity(form, StatusTransition::open_publicity()?))
            .bind(&scope.department)
            .bind(&scope.squad)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to open publicity", form, e))?;
        Ok(result.rows_affected())
    }

    async fn term_exists(
        &self,
        form: FormType,
        term: &AcademicTerm,
        roster: &RosterScope,
    ) -> Result<bool, DomainError> {
        let statement = sql::term_exists(form);
        let mut query = sqlx::query_scalar::<_, bool>(&statement)
            .bind(term.academic_year.to_string())
            .bind(term.semester.number())
            .bind(&roster.department)
            .bind(roster.squad.as_deref())
            .bind(roster.major.as_deref());
        if form.has_month() {
            query = query.bind(term.month.map(i16::from));
        }
        query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to check existing term", form, e))
    }

    async fn insert_drafts(
        &self,
        plan: &EvaluationPlan,
        students: &[StudentProfile],
    ) -> Result<u64, DomainError> {
        let form = plan.form;
        if students.is_empty() {
            return Ok(0);
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "INSERT INTO {} ({}) ",
            form.table_name(),
            sql::draft_columns(form).join(", ")
        ));
        let deadlines = &plan.deadlines;
        let naive = |t: Option<Timestamp>| t.map(|t| *t.as_naive());

        builder.push_values(students, |mut row, student| {
            row.push_bind(plan.term.academic_year.to_string())
                .push_bind(plan.term.semester.number())
                .push_bind(plan.description.clone())
                .push_bind(student.student_id.as_str().to_string())
                .push_bind(student.name.clone())
                .push_bind(student.squad.clone())
                .push_bind(student.department.clone())
                .push_bind(student.major.clone())
                .push_bind(student.class_id.clone())
                .push_bind(naive(deadlines.publicity_start))
                .push_bind(naive(deadlines.publicity_end))
                .push_bind(EvaluationStatus::Declared.code());
            if form.has_score_columns() {
                row.push_bind(plan.base_score)
                    .push_bind(Decimal::ZERO)
                    .push_bind(Decimal::ZERO);
            }
            if form.is_reviewable() {
                row.push_bind(naive(deadlines.declare_start))
                    .push_bind(naive(deadlines.declare_end))
                    .push_bind(naive(deadlines.review_end));
            }
            if form.has_month() {
                row.push_bind(plan.term.month.map(i16::from));
            }
        });

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error("Failed to begin transaction", form, e))?;
        let result = builder
            .build()
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_error("Failed to insert draft rows", form, e))?;
        tx.commit()
            .await
            .map_err(|e| map_db_error("Failed to commit transaction", form, e))?;

        Ok(result.rows_affected())
    }
}
