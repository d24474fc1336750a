//! In-memory evaluation store.
//!
//! Mirrors the guarded bulk-update semantics of the Postgres store over
//! plain vectors. Tables can be dropped, columns removed, and failures
//! injected per form type.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::evaluation::{
    AcademicTerm, ApproveFilter, ClosedRecord, EvaluationPlan, EvaluationRecord,
    EvaluationStatus, FormType, RosterScope, SquadScope, StatusTransition, StudentProfile,
    TransitionMode,
};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};
use crate::ports::{EvaluationRecordStore, PublicityClosure};

#[derive(Default)]
struct Table {
    rows: Vec<EvaluationRecord>,
    missing_columns: HashSet<&'static str>,
}

struct State {
    tables: HashMap<FormType, Table>,
    failing: HashSet<FormType>,
    next_id: i64,
}

/// Evaluation store backed by process memory.
pub struct InMemoryEvaluationStore {
    state: RwLock<State>,
}

impl InMemoryEvaluationStore {
    /// Creates a store with all five tables present and empty.
    pub fn new() -> Self {
        let tables = FormType::ALL
            .iter()
            .map(|form| (*form, Table::default()))
            .collect();
        Self {
            state: RwLock::new(State {
                tables,
                failing: HashSet::new(),
                next_id: 1,
            }),
        }
    }

    /// Drops a table, as if the form type were not deployed.
    pub fn without_table(mut self, form: FormType) -> Self {
        self.state.get_mut().tables.remove(&form);
        self
    }

    /// Removes a column from a table's schema.
    pub fn without_column(mut self, form: FormType, column: &'static str) -> Self {
        if let Some(table) = self.state.get_mut().tables.get_mut(&form) {
            table.missing_columns.insert(column);
        }
        self
    }

    /// Makes every operation on `form` fail with a database error.
    pub fn failing_on(mut self, form: FormType) -> Self {
        self.state.get_mut().failing.insert(form);
        self
    }

    /// Adds a row, assigning it an id. Returns the id.
    pub async fn insert(&self, mut record: EvaluationRecord) -> Result<i64, DomainError> {
        let mut state = self.state.write().await;
        let id = state.next_id;
        state.next_id += 1;
        record.id = id;
        table_mut(&mut state, record.form)?.rows.push(record);
        Ok(id)
    }

    /// Snapshot of a table's rows.
    pub async fn records(&self, form: FormType) -> Vec<EvaluationRecord> {
        self.state
            .read()
            .await
            .tables
            .get(&form)
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    /// Looks up one row by id.
    pub async fn record(&self, form: FormType, id: i64) -> Option<EvaluationRecord> {
        self.records(form).await.into_iter().find(|r| r.id == id)
    }
}

impl Default for InMemoryEvaluationStore {
    fn default() -> Self {
        Self::new()
    }
}

fn check_failing(state: &State, form: FormType) -> Result<(), DomainError> {
    if state.failing.contains(&form) {
        return Err(DomainError::database(
            &format!("Failed to access {}", form.table_name()),
            "injected failure",
        ));
    }
    Ok(())
}

fn table(state: &State, form: FormType) -> Result<&Table, DomainError> {
    check_failing(state, form)?;
    state.tables.get(&form).ok_or_else(|| missing(form))
}

fn table_mut(state: &mut State, form: FormType) -> Result<&mut Table, DomainError> {
    check_failing(state, form)?;
    state.tables.get_mut(&form).ok_or_else(|| missing(form))
}

fn missing(form: FormType) -> DomainError {
    DomainError::new(
        ErrorCode::TableMissing,
        format!("Table {} does not exist", form.table_name()),
    )
    .with_detail("table", form.table_name())
}

fn same_term(record: &EvaluationRecord, term: &AcademicTerm) -> bool {
    record.term.academic_year == term.academic_year
        && record.term.semester == term.semester
        && record.term.month == term.month
}

#[async_trait]
impl EvaluationRecordStore for InMemoryEvaluationStore {
    async fn table_exists(&self, form: FormType) -> Result<bool, DomainError> {
        let state = self.state.read().await;
        check_failing(&state, form)?;
        Ok(state.tables.contains_key(&form))
    }

    async fn column_exists(&self, form: FormType, column: &'static str) -> Result<bool, DomainError> {
        let state = self.state.read().await;
        check_failing(&state, form)?;
        let Some(table) = state.tables.get(&form) else {
            return Ok(false);
        };
        let defined = column == form.publicity_deadline_column()
            || form.review_deadline_column() == Some(column);
        Ok(defined && !table.missing_columns.contains(column))
    }

    async fn has_rows(&self, form: FormType) -> Result<bool, DomainError> {
        let state = self.state.read().await;
        Ok(!table(&state, form)?.rows.is_empty())
    }

    async fn apply_review_transition(
        &self,
        form: FormType,
        mode: TransitionMode,
        now: &Timestamp,
    ) -> Result<u64, DomainError> {
        let review = StatusTransition::review()?;
        let mut state = self.state.write().await;
        let table = table_mut(&mut state, form)?;
        let mut affected = 0;
        for row in table.rows.iter_mut() {
            let due = match mode {
                TransitionMode::Force => true,
                TransitionMode::Deadline => row.is_review_due(now),
            };
            if due && row.advance(review) {
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn close_publicity(
        &self,
        form: FormType,
        now: &Timestamp,
    ) -> Result<PublicityClosure, DomainError> {
        let finalize = StatusTransition::finalize()?;
        let mut state = self.state.write().await;
        let table = table_mut(&mut state, form)?;
        let mut closure = PublicityClosure::default();
        for row in table.rows.iter_mut().filter(|r| r.is_publicity_over(now)) {
            if !row.advance(finalize) {
                continue;
            }
            if let Some(publicity_end) = row.deadlines.publicity_end {
                closure.closed.push(ClosedRecord {
                    student_id: row.student.student_id.to_string(),
                    publicity_end,
                });
            }
            closure.affected += 1;
        }
        Ok(closure)
    }

    async fn batch_approve(&self, form: FormType, filter: &ApproveFilter) -> Result<u64, DomainError> {
        let approve = StatusTransition::approve()?;
        let mut state = self.state.write().await;
        let table = table_mut(&mut state, form)?;
        let mut affected = 0;
        for row in table.rows.iter_mut().filter(|r| filter.matches(&r.student)) {
            if row.advance(approve) {
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn count_pending_review(&self, form: FormType, scope: &SquadScope) -> Result<u64, DomainError> {
        let state = self.state.read().await;
        let count = table(&state, form)?
            .rows
            .iter()
            .filter(|r| {
                scope.contains(&r.student)
                    && matches!(r.status, EvaluationStatus::Declared | EvaluationStatus::Reviewed)
            })
            .count();
        Ok(count as u64)
    }

    async fn open_publicity(&self, form: FormType, scope: &SquadScope) -> Result<u64, DomainError> {
        let open = StatusTransition::open_publicity()?;
        let mut state = self.state.write().await;
        let table = table_mut(&mut state, form)?;
        let mut affected = 0;
        for row in table.rows.iter_mut().filter(|r| scope.contains(&r.student)) {
            if row.advance(open) {
                row.remark = None;
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn term_exists(
        &self,
        form: FormType,
        term: &AcademicTerm,
        roster: &RosterScope,
    ) -> Result<bool, DomainError> {
        let state = self.state.read().await;
        Ok(table(&state, form)?
            .rows
            .iter()
            .any(|r| same_term(r, term) && roster.contains(&r.student)))
    }

    async fn insert_drafts(
        &self,
        plan: &EvaluationPlan,
        students: &[StudentProfile],
    ) -> Result<u64, DomainError> {
        let mut state = self.state.write().await;
        let first_id = state.next_id;
        let table = table_mut(&mut state, plan.form)?;
        for (offset, student) in students.iter().enumerate() {
            table
                .rows
                .push(plan.draft_for(first_id + offset as i64, student.clone()));
        }
        state.next_id = first_id + students.len() as i64;
        Ok(students.len() as u64)
    }
}
