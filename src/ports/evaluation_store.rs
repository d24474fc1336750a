//! Evaluation record store port.
//!
//! Persistence contract over the five evaluation tables. Every method takes a
//! [`FormType`], so implementations pick table and column identifiers from a
//! closed set and bind only values.
//!
//! # Transactions
//!
//! Each mutating call is one unit of work against one table. A failure in
//! one call never rolls back what another call already committed; the
//! lifecycle relies on this for per-table fault isolation.
//!
//! # Idempotence
//!
//! Every bulk update names the exact prior status in its predicate, so
//! re-running a transition over already-transitioned rows affects nothing.

use async_trait::async_trait;

use crate::domain::evaluation::{
    AcademicTerm, ApproveFilter, ClosedRecord, EvaluationPlan, FormType, RosterScope,
    SquadScope, StudentProfile, TransitionMode,
};
use crate::domain::foundation::{DomainError, Timestamp};

/// Result of closing the publicity window on one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublicityClosure {
    /// Rows matched by the selection, in the order read. This is the
    /// authoritative notification list.
    pub closed: Vec<ClosedRecord>,

    /// Rows reported affected by the update.
    pub affected: u64,
}

impl PublicityClosure {
    pub fn is_empty(&self) -> bool {
        self.closed.is_empty() && self.affected == 0
    }
}

/// Store for evaluation rows across all form types.
#[async_trait]
pub trait EvaluationRecordStore: Send + Sync {
    // ─── Schema inspection ─────────────────────────────────────────────

    /// True if the form type's table exists in this deployment.
    async fn table_exists(&self, form: FormType) -> Result<bool, DomainError>;

    /// True if `column` exists on the form type's table.
    async fn column_exists(&self, form: FormType, column: &'static str) -> Result<bool, DomainError>;

    /// True if the form type's table holds at least one row.
    async fn has_rows(&self, form: FormType) -> Result<bool, DomainError>;

    // ─── Lifecycle transitions ─────────────────────────────────────────

    /// Moves declared rows to reviewed and stores their raw score.
    ///
    /// In [`TransitionMode::Deadline`] only rows whose review deadline is at
    /// or before `now` are moved; in [`TransitionMode::Force`] every declared
    /// row is. Returns the number of affected rows.
    async fn apply_review_transition(
        &self,
        form: FormType,
        mode: TransitionMode,
        now: &Timestamp,
    ) -> Result<u64, DomainError>;

    /// Finalizes publicized rows whose publicity deadline is at or before `now`.
    ///
    /// Selection and update run in one transaction. When nothing matches, no
    /// update is issued and an empty closure is returned.
    async fn close_publicity(&self, form: FormType, now: &Timestamp)
        -> Result<PublicityClosure, DomainError>;

    // ─── Review actions ────────────────────────────────────────────────

    /// Moves reviewed rows matching `filter` to approved.
    async fn batch_approve(&self, form: FormType, filter: &ApproveFilter) -> Result<u64, DomainError>;

    /// Counts rows of a squad still declared or reviewed.
    async fn count_pending_review(&self, form: FormType, scope: &SquadScope) -> Result<u64, DomainError>;

    /// Moves a squad's approved rows to publicized, clearing their remark.
    async fn open_publicity(&self, form: FormType, scope: &SquadScope) -> Result<u64, DomainError>;

    // ─── Publishing ────────────────────────────────────────────────────

    /// True if students in `roster` already have rows for `term`.
    async fn term_exists(
        &self,
        form: FormType,
        term: &AcademicTerm,
        roster: &RosterScope,
    ) -> Result<bool, DomainError>;

    /// Inserts one draft row per student in a single transaction.
    async fn insert_drafts(
        &self,
        plan: &EvaluationPlan,
        students: &[StudentProfile],
    ) -> Result<u64, DomainError>;
}
