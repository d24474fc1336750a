//! Per-table results of a lifecycle run.

use serde::Serialize;

use super::TableDescriptor;

/// Whether a review run honors the review deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionMode {
    /// Only rows whose review deadline has passed.
    Deadline,
    /// Every declared row, deadline ignored.
    Force,
}

impl TransitionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionMode::Deadline => "deadline",
            TransitionMode::Force => "force",
        }
    }
}

/// Why a table was left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    TableMissing,
    EmptyTable,
    ColumnMissing(&'static str),
    NothingDue,
}

impl SkipReason {
    pub fn describe(&self) -> String {
        match self {
            SkipReason::TableMissing => "table does not exist".to_string(),
            SkipReason::EmptyTable => "table is empty".to_string(),
            SkipReason::ColumnMissing(column) => format!("column {} does not exist", column),
            SkipReason::NothingDue => "no rows past deadline".to_string(),
        }
    }
}

/// What happened to one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableResult {
    Transitioned { affected: u64, notified: u64 },
    Skipped(SkipReason),
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOutcome {
    pub table: &'static str,
    pub display_name: String,
    pub result: TableResult,
}

impl TableOutcome {
    pub fn transitioned(descriptor: &TableDescriptor, affected: u64) -> Self {
        Self::new(descriptor, TableResult::Transitioned { affected, notified: 0 })
    }

    pub fn skipped(descriptor: &TableDescriptor, reason: SkipReason) -> Self {
        Self::new(descriptor, TableResult::Skipped(reason))
    }

    pub fn failed(descriptor: &TableDescriptor, message: impl Into<String>) -> Self {
        Self::new(
            descriptor,
            TableResult::Failed {
                message: message.into(),
            },
        )
    }

    /// Sets the number of notifications sent for a transitioned table.
    pub fn with_notified(mut self, count: u64) -> Self {
        if let TableResult::Transitioned { notified, .. } = &mut self.result {
            *notified = count;
        }
        self
    }

    fn new(descriptor: &TableDescriptor, result: TableResult) -> Self {
        Self {
            table: descriptor.table_name(),
            display_name: descriptor.display_name.clone(),
            result,
        }
    }

    pub fn affected(&self) -> u64 {
        match self.result {
            TableResult::Transitioned { affected, .. } => affected,
            _ => 0,
        }
    }

    pub fn notified(&self) -> u64 {
        match self.result {
            TableResult::Transitioned { notified, .. } => notified,
            _ => 0,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.result, TableResult::Failed { .. })
    }
}

/// Outcome of one run across its tables, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionReport {
    pub outcomes: Vec<TableOutcome>,
}

impl TransitionReport {
    pub fn push(&mut self, outcome: TableOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn total_affected(&self) -> u64 {
        self.outcomes.iter().map(TableOutcome::affected).sum()
    }

    pub fn total_notified(&self) -> u64 {
        self.outcomes.iter().map(TableOutcome::notified).sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &TableOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    /// A run succeeds when no table failed; skipped tables are fine.
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn outcome_for(&self, table: &str) -> Option<&TableOutcome> {
        self.outcomes.iter().find(|o| o.table == table)
    }
}
