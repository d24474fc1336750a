//! StatusLifecycleEngine - moves declared rows to reviewed at their deadline.
//!
//! Runs over the reviewable tables one at a time. Each table is checked
//! before it is touched:
//!
//! 1. the table exists (form types are enabled per deployment)
//! 2. the table has rows
//! 3. the review deadline column exists (deadline mode only)
//!
//! and then receives a single guarded bulk update that sets the status to
//! reviewed and computes the raw score. A failure on one table is logged and
//! recorded in the report; the remaining tables are still processed.

use std::sync::Arc;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::RunGuard;
use crate::domain::evaluation::{
    SkipReason, TableDescriptor, TableOutcome, TransitionMode, TransitionReport, REVIEW_END_COLUMN,
};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};
use crate::ports::EvaluationRecordStore;

/// Drives the declared → reviewed transition.
pub struct StatusLifecycleEngine {
    store: Arc<dyn EvaluationRecordStore>,
    tables: Vec<TableDescriptor>,
    guard: RunGuard,
}

impl StatusLifecycleEngine {
    /// Creates an engine over the three reviewable tables.
    pub fn new(store: Arc<dyn EvaluationRecordStore>) -> Self {
        Self::with_tables(store, TableDescriptor::reviewable())
    }

    /// Creates an engine over an explicit table list.
    ///
    /// Descriptors without a review deadline are ignored.
    pub fn with_tables(store: Arc<dyn EvaluationRecordStore>, tables: Vec<TableDescriptor>) -> Self {
        let tables = tables
            .into_iter()
            .filter(TableDescriptor::has_review_deadline)
            .collect();
        Self {
            store,
            tables,
            guard: RunGuard::new(),
        }
    }

    pub fn tables(&self) -> &[TableDescriptor] {
        &self.tables
    }

    /// Scheduled entry point. Outcomes are only logged.
    pub async fn run_scheduled_transition(&self) {
        match self.run_at(TransitionMode::Deadline, Timestamp::now()).await {
            Ok(_) => {}
            Err(e) if e.code == ErrorCode::RunInProgress => {
                warn!("Skipping scheduled review transition: previous run still active");
            }
            Err(e) => error!(error = %e, "Scheduled review transition failed"),
        }
    }

    /// Operator entry point honoring review deadlines.
    ///
    /// # Errors
    ///
    /// - `RunInProgress` if another run holds the guard
    pub async fn run_manual_transition(&self) -> Result<TransitionReport, DomainError> {
        self.run_at(TransitionMode::Deadline, Timestamp::now()).await
    }

    /// Operator override: every declared row is reviewed, deadline or not.
    ///
    /// # Errors
    ///
    /// - `RunInProgress` if another run holds the guard
    pub async fn run_force_transition(&self) -> Result<TransitionReport, DomainError> {
        self.run_at(TransitionMode::Force, Timestamp::now()).await
    }

    /// Runs one guarded pass over all tables as of `now`.
    pub async fn run_at(
        &self,
        mode: TransitionMode,
        now: Timestamp,
    ) -> Result<TransitionReport, DomainError> {
        let _permit = self.guard.try_acquire().ok_or_else(|| {
            DomainError::new(ErrorCode::RunInProgress, "a run is already in progress")
        })?;

        let run_id = Uuid::new_v4();
        info!(%run_id, mode = mode.as_str(), now = %now, "Review transition started");

        let mut report = TransitionReport::default();
        for descriptor in &self.tables {
            report.push(self.transition_table(descriptor, mode, &now).await);
        }

        info!(
            %run_id,
            mode = mode.as_str(),
            affected = report.total_affected(),
            failed = report.failures().count(),
            "Review transition finished"
        );
        Ok(report)
    }

    async fn transition_table(
        &self,
        descriptor: &TableDescriptor,
        mode: TransitionMode,
        now: &Timestamp,
    ) -> TableOutcome {
        let table = descriptor.table_name();
        match self.try_transition_table(descriptor, mode, now).await {
            Ok(outcome) => outcome,
            Err(e) if e.is_schema_absence() => {
                warn!(table, error = %e, "Table disappeared during review transition");
                TableOutcome::skipped(descriptor, SkipReason::TableMissing)
            }
            Err(e) => {
                error!(table, error = %e, "Review transition failed");
                TableOutcome::failed(descriptor, e.message)
            }
        }
    }

    async fn try_transition_table(
        &self,
        descriptor: &TableDescriptor,
        mode: TransitionMode,
        now: &Timestamp,
    ) -> Result<TableOutcome, DomainError> {
        let form = descriptor.form;
        let table = descriptor.table_name();

        if !self.store.table_exists(form).await? {
            warn!(table, "Table does not exist, skipping");
            return Ok(TableOutcome::skipped(descriptor, SkipReason::TableMissing));
        }

        if !self.store.has_rows(form).await? {
            debug!(table, "Table is empty, skipping");
            return Ok(TableOutcome::skipped(descriptor, SkipReason::EmptyTable));
        }

        if mode == TransitionMode::Deadline {
            let column = form.review_deadline_column().unwrap_or(REVIEW_END_COLUMN);
            if !self.store.column_exists(form, column).await? {
                warn!(table, column, "Review deadline column does not exist, skipping");
                return Ok(TableOutcome::skipped(descriptor, SkipReason::ColumnMissing(column)));
            }
        }

        let affected = self.store.apply_review_transition(form, mode, now).await?;
        info!(table, affected, mode = mode.as_str(), "Review transition applied");
        Ok(TableOutcome::transitioned(descriptor, affected))
    }
}
