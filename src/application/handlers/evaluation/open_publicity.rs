//! OpenPublicityHandler - squad leader puts approved rows into publicity.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::domain::evaluation::{FormType, Notification, SquadScope};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{EvaluationRecordStore, NotificationSink, StudentDirectory};

/// Command to open publicity for one squad.
#[derive(Debug, Clone)]
pub struct OpenPublicityCommand {
    pub scope: SquadScope,
    /// Display name of the operator, shown as the notification sender.
    pub sender: String,
}

/// Result of opening publicity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenPublicityResult {
    pub opened: u64,
    pub notified: u64,
}

/// Handler for the approved → publicized transition.
///
/// Refuses while any row of the squad is still waiting for review, so a
/// squad's forms go into publicity together.
pub struct OpenPublicityHandler {
    store: Arc<dyn EvaluationRecordStore>,
    directory: Arc<dyn StudentDirectory>,
    sink: Arc<dyn NotificationSink>,
}

impl OpenPublicityHandler {
    pub fn new(
        store: Arc<dyn EvaluationRecordStore>,
        directory: Arc<dyn StudentDirectory>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            store,
            directory,
            sink,
        }
    }

    pub async fn handle(&self, cmd: OpenPublicityCommand) -> Result<OpenPublicityResult, DomainError> {
        // 1. Only tables deployed here take part
        let mut forms = Vec::with_capacity(FormType::REVIEWABLE.len());
        for form in FormType::REVIEWABLE {
            if self.store.table_exists(form).await? {
                forms.push(form);
            }
        }

        // 2. Nothing may still be waiting for review
        for form in &forms {
            let pending = self.store.count_pending_review(*form, &cmd.scope).await?;
            if pending > 0 {
                return Err(DomainError::new(
                    ErrorCode::PendingReview,
                    format!(
                        "还有{}条{}记录未完成审核，请先完成审核",
                        pending,
                        form.display_name()
                    ),
                )
                .with_detail("table", form.table_name())
                .with_detail("pending", pending.to_string()));
            }
        }

        // 3. Open publicity table by table
        let mut opened = 0;
        for form in &forms {
            let affected = self.store.open_publicity(*form, &cmd.scope).await?;
            info!(
                table = form.table_name(),
                affected,
                department = %cmd.scope.department,
                squad = %cmd.scope.squad,
                "Publicity opened"
            );
            opened += affected;
        }

        // 4. Tell the squad
        let notified = if opened > 0 {
            self.notify_squad(&cmd).await
        } else {
            0
        };

        Ok(OpenPublicityResult { opened, notified })
    }

    async fn notify_squad(&self, cmd: &OpenPublicityCommand) -> u64 {
        let members = match self.directory.squad_members(&cmd.scope).await {
            Ok(members) => members,
            Err(e) => {
                error!(error = %e, squad = %cmd.scope.squad, "Failed to list squad members");
                return 0;
            }
        };

        let mut notified = 0;
        for user_id in members {
            let notification = Notification::publicity_opened(user_id, cmd.sender.clone());
            match self.sink.send(&notification).await {
                Ok(()) => notified += 1,
                Err(e) => warn!(user_id = user_id.as_i64(), error = %e, "Failed to send publicity notice"),
            }
        }
        notified
    }
}
