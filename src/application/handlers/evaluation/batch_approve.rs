//! BatchApproveHandler - reviewer approval of reviewed rows.

use std::sync::Arc;

use tracing::info;

use crate::domain::evaluation::{ApproveFilter, FormType};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::EvaluationRecordStore;

/// Command to approve every reviewed row of one form type.
#[derive(Debug, Clone)]
pub struct BatchApproveCommand {
    pub form: FormType,
    pub filter: ApproveFilter,
}

/// Result of a batch approval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchApproveResult {
    pub form: FormType,
    pub approved: u64,
}

/// Handler for moving reviewed rows to approved.
pub struct BatchApproveHandler {
    store: Arc<dyn EvaluationRecordStore>,
}

impl BatchApproveHandler {
    pub fn new(store: Arc<dyn EvaluationRecordStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, cmd: BatchApproveCommand) -> Result<BatchApproveResult, DomainError> {
        if !self.store.table_exists(cmd.form).await? {
            return Err(DomainError::new(
                ErrorCode::TableMissing,
                format!("{}未启用", cmd.form.display_name()),
            )
            .with_detail("table", cmd.form.table_name()));
        }

        let approved = self.store.batch_approve(cmd.form, &cmd.filter).await?;
        info!(
            table = cmd.form.table_name(),
            affected = approved,
            major = cmd.filter.major.as_deref().unwrap_or("*"),
            class_id = cmd.filter.class_id.as_deref().unwrap_or("*"),
            "Batch approval applied"
        );

        Ok(BatchApproveResult {
            form: cmd.form,
            approved,
        })
    }
}
