//! PublicityWindowWatcher - finalizes rows once their publicity window ends.
//!
//! For each table: check the table and its publicity deadline column exist,
//! then close the window (select the expired publicized rows and finalize
//! them in one transaction). Every selected row's student is told the result
//! is confirmed. The selection is the notification list, so a row is only
//! ever announced once: after the update it no longer matches.

use std::sync::Arc;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::RunGuard;
use crate::domain::evaluation::{
    ClosedRecord, Notification, SkipReason, TableDescriptor, TableOutcome, TransitionReport,
};
use crate::domain::foundation::{DomainError, ErrorCode, StudentId, Timestamp};
use crate::ports::{EvaluationRecordStore, IdentityResolver, NotificationSink};

/// Drives the publicized → finalized transition and its notifications.
pub struct PublicityWindowWatcher {
    store: Arc<dyn EvaluationRecordStore>,
    resolver: Arc<dyn IdentityResolver>,
    sink: Arc<dyn NotificationSink>,
    tables: Vec<TableDescriptor>,
    guard: RunGuard,
}

impl PublicityWindowWatcher {
    /// Creates a watcher over all five tables.
    pub fn new(
        store: Arc<dyn EvaluationRecordStore>,
        resolver: Arc<dyn IdentityResolver>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self::with_tables(store, resolver, sink, TableDescriptor::all())
    }

    /// Creates a watcher over an explicit table list.
    pub fn with_tables(
        store: Arc<dyn EvaluationRecordStore>,
        resolver: Arc<dyn IdentityResolver>,
        sink: Arc<dyn NotificationSink>,
        tables: Vec<TableDescriptor>,
    ) -> Self {
        Self {
            store,
            resolver,
            sink,
            tables,
            guard: RunGuard::new(),
        }
    }

    /// Scheduled entry point. Outcomes are only logged.
    pub async fn run_scheduled_check(&self) {
        match self.check_at(Timestamp::now()).await {
            Ok(_) => {}
            Err(e) if e.code == ErrorCode::RunInProgress => {
                debug!("Skipping publicity check: previous run still active");
            }
            Err(e) => error!(error = %e, "Scheduled publicity check failed"),
        }
    }

    /// Operator entry point.
    ///
    /// # Errors
    ///
    /// - `RunInProgress` if another check holds the guard
    pub async fn check_publicity_deadlines(&self) -> Result<TransitionReport, DomainError> {
        self.check_at(Timestamp::now()).await
    }

    /// Runs one guarded pass over all tables as of `now`.
    pub async fn check_at(&self, now: Timestamp) -> Result<TransitionReport, DomainError> {
        let _permit = self.guard.try_acquire().ok_or_else(|| {
            DomainError::new(ErrorCode::RunInProgress, "a run is already in progress")
        })?;

        let run_id = Uuid::new_v4();
        debug!(%run_id, now = %now, "Publicity check started");

        let mut report = TransitionReport::default();
        for descriptor in &self.tables {
            report.push(self.close_table(descriptor, &now).await);
        }

        if report.total_affected() > 0 || !report.is_success() {
            info!(
                %run_id,
                affected = report.total_affected(),
                notified = report.total_notified(),
                failed = report.failures().count(),
                "Publicity check finished"
            );
        }
        Ok(report)
    }

    async fn close_table(&self, descriptor: &TableDescriptor, now: &Timestamp) -> TableOutcome {
        let table = descriptor.table_name();
        match self.try_close_table(descriptor, now).await {
            Ok(outcome) => outcome,
            Err(e) if e.is_schema_absence() => {
                warn!(table, error = %e, "Table disappeared during publicity check");
                TableOutcome::skipped(descriptor, SkipReason::TableMissing)
            }
            Err(e) => {
                error!(table, error = %e, "Publicity check failed");
                TableOutcome::failed(descriptor, e.message)
            }
        }
    }

    async fn try_close_table(
        &self,
        descriptor: &TableDescriptor,
        now: &Timestamp,
    ) -> Result<TableOutcome, DomainError> {
        let form = descriptor.form;
        let table = descriptor.table_name();

        if !self.store.table_exists(form).await? {
            debug!(table, "Table does not exist, skipping");
            return Ok(TableOutcome::skipped(descriptor, SkipReason::TableMissing));
        }

        let column = form.publicity_deadline_column();
        if !self.store.column_exists(form, column).await? {
            warn!(table, column, "Publicity deadline column does not exist, skipping");
            return Ok(TableOutcome::skipped(descriptor, SkipReason::ColumnMissing(column)));
        }

        let closure = self.store.close_publicity(form, now).await?;
        if closure.is_empty() {
            return Ok(TableOutcome::skipped(descriptor, SkipReason::NothingDue));
        }
        info!(
            table,
            affected = closure.affected,
            selected = closure.closed.len(),
            "Publicity window closed"
        );

        let mut notified = 0;
        for record in &closure.closed {
            if self.notify(descriptor, record).await {
                notified += 1;
            }
        }

        Ok(TableOutcome::transitioned(descriptor, closure.affected).with_notified(notified))
    }

    /// Tells one student their result is final. Failures are logged only.
    async fn notify(&self, descriptor: &TableDescriptor, record: &ClosedRecord) -> bool {
        let table = descriptor.table_name();
        let student_id = record.student_id.as_str();

        let Ok(id) = StudentId::new(student_id) else {
            warn!(table, student_id, "Blank student id, notification skipped");
            return false;
        };
        let user_id = match self.resolver.resolve(&id).await {
            Ok(Some(user_id)) => user_id,
            Ok(None) => {
                warn!(table, student_id, "No user for student, notification skipped");
                return false;
            }
            Err(e) => {
                error!(table, student_id, error = %e, "Identity resolution failed");
                return false;
            }
        };

        let notification =
            Notification::publicity_ended(user_id, &descriptor.display_name, &record.publicity_end);
        match self.sink.send(&notification).await {
            Ok(()) => true,
            Err(e) => {
                error!(table, student_id, error = %e, "Failed to send publicity notification");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryEvaluationStore, InMemoryNotificationSink, InMemoryStudentDirectory,
    };
    use crate::application::handlers::evaluation::testing::{profile, publicized, ts};
    use crate::domain::evaluation::{
        AcademicTerm, ApproveFilter, EvaluationPlan, EvaluationStatus, FormType, RosterScope,
        SquadScope, StudentProfile, TableResult, TransitionMode,
    };
    use crate::domain::foundation::UserId;
    use crate::ports::PublicityClosure;
    use async_trait::async_trait;

    struct Fixture {
        store: Arc<InMemoryEvaluationStore>,
        sink: Arc<InMemoryNotificationSink>,
        watcher: PublicityWindowWatcher,
    }

    fn fixture_with(store: InMemoryEvaluationStore, sink: InMemoryNotificationSink) -> Fixture {
        let store = Arc::new(store);
        let sink = Arc::new(sink);
        let directory = Arc::new(
            InMemoryStudentDirectory::new().with_student(UserId::new(42).unwrap(), profile("2021001")),
        );
        let watcher = PublicityWindowWatcher::new(store.clone(), directory, sink.clone());
        Fixture {
            store,
            sink,
            watcher,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(InMemoryEvaluationStore::new(), InMemoryNotificationSink::new())
    }

    #[tokio::test]
    async fn expired_row_is_finalized_and_student_notified() {
        let f = fixture();
        f.store
            .insert(publicized(FormType::MonthlyMoral, "2021001", Some("2024-01-01 00:00:00")))
            .await
            .unwrap();

        let report = f.watcher.check_at(ts("2024-06-01 00:00:00")).await.unwrap();

        assert_eq!(
            f.store.records(FormType::MonthlyMoral).await[0].status,
            EvaluationStatus::Finalized
        );
        let sent = f.sink.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, UserId::new(42).unwrap());
        assert!(sent[0].body.contains("2024-01-01 00:00:00"));
        assert!(sent[0].title.contains("月度德育评测"));
        assert_eq!(report.total_notified(), 1);
    }

    #[tokio::test]
    async fn repeated_check_sends_nothing_more() {
        let f = fixture();
        f.store
            .insert(publicized(FormType::ComprehensiveResult, "2021001", Some("2024-01-01 00:00:00")))
            .await
            .unwrap();
        let now = ts("2024-06-01 00:00:00");

        f.watcher.check_at(now).await.unwrap();
        let second = f.watcher.check_at(now).await.unwrap();

        assert_eq!(second.total_affected(), 0);
        assert_eq!(f.sink.sent().await.len(), 1);
    }

    #[tokio::test]
    async fn row_without_publicity_end_is_never_finalized() {
        let f = fixture();
        f.store
            .insert(publicized(FormType::SemesterMoral, "2021001", None))
            .await
            .unwrap();

        f.watcher.check_at(ts("2099-01-01 00:00:00")).await.unwrap();

        assert_eq!(
            f.store.records(FormType::SemesterMoral).await[0].status,
            EvaluationStatus::Publicized
        );
        assert!(f.sink.sent().await.is_empty());
    }

    #[tokio::test]
    async fn unresolvable_student_is_still_finalized() {
        let f = fixture();
        f.store
            .insert(publicized(FormType::SportsArts, "2029999", Some("2024-01-01 00:00:00")))
            .await
            .unwrap();

        let report = f.watcher.check_at(ts("2024-06-01 00:00:00")).await.unwrap();

        assert_eq!(
            f.store.records(FormType::SportsArts).await[0].status,
            EvaluationStatus::Finalized
        );
        assert!(f.sink.sent().await.is_empty());
        assert_eq!(
            report.outcome_for("sports_arts_evaluation").map(|o| o.result.clone()),
            Some(TableResult::Transitioned {
                affected: 1,
                notified: 0
            })
        );
    }

    /// Store whose only expired rows are the ones it was built with.
    struct FixedClosureStore {
        closed: Vec<ClosedRecord>,
    }

    #[async_trait]
    impl EvaluationRecordStore for FixedClosureStore {
        async fn table_exists(&self, _: FormType) -> Result<bool, DomainError> {
            Ok(true)
        }
        async fn column_exists(&self, _: FormType, _: &'static str) -> Result<bool, DomainError> {
            Ok(true)
        }
        async fn has_rows(&self, _: FormType) -> Result<bool, DomainError> {
            Ok(!self.closed.is_empty())
        }
        async fn apply_review_transition(
            &self,
            _: FormType,
            _: TransitionMode,
            _: &Timestamp,
        ) -> Result<u64, DomainError> {
            Ok(0)
        }
        async fn close_publicity(&self, _: FormType, _: &Timestamp) -> Result<PublicityClosure, DomainError> {
            Ok(PublicityClosure {
                closed: self.closed.clone(),
                affected: self.closed.len() as u64,
            })
        }
        async fn batch_approve(&self, _: FormType, _: &ApproveFilter) -> Result<u64, DomainError> {
            Ok(0)
        }
        async fn count_pending_review(&self, _: FormType, _: &SquadScope) -> Result<u64, DomainError> {
            Ok(0)
        }
        async fn open_publicity(&self, _: FormType, _: &SquadScope) -> Result<u64, DomainError> {
            Ok(0)
        }
        async fn term_exists(&self, _: FormType, _: &AcademicTerm, _: &RosterScope) -> Result<bool, DomainError> {
            Ok(false)
        }
        async fn insert_drafts(&self, _: &EvaluationPlan, _: &[StudentProfile]) -> Result<u64, DomainError> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn blank_student_id_skips_only_its_own_notification() {
        let ended = ts("2024-01-01 00:00:00");
        let store = Arc::new(FixedClosureStore {
            closed: vec![
                ClosedRecord {
                    student_id: "  ".into(),
                    publicity_end: ended,
                },
                ClosedRecord {
                    student_id: "2021001".into(),
                    publicity_end: ended,
                },
            ],
        });
        let sink = Arc::new(InMemoryNotificationSink::new());
        let directory = Arc::new(
            InMemoryStudentDirectory::new().with_student(UserId::new(42).unwrap(), profile("2021001")),
        );
        let watcher = PublicityWindowWatcher::with_tables(
            store,
            directory,
            sink.clone(),
            vec![FormType::MonthlyMoral.descriptor()],
        );

        let report = watcher.check_at(ts("2024-06-01 00:00:00")).await.unwrap();

        assert!(report.is_success());
        assert_eq!(
            report.outcome_for("moral_monthly_evaluation").map(|o| o.result.clone()),
            Some(TableResult::Transitioned {
                affected: 2,
                notified: 1
            })
        );
        let sent = sink.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, UserId::new(42).unwrap());
    }

    #[tokio::test]
    async fn sink_failure_does_not_undo_finalization() {
        let f = fixture_with(
            InMemoryEvaluationStore::new(),
            InMemoryNotificationSink::new().rejecting(UserId::new(42).unwrap()),
        );
        f.store
            .insert(publicized(FormType::MonthlyMoral, "2021001", Some("2024-01-01 00:00:00")))
            .await
            .unwrap();

        let report = f.watcher.check_at(ts("2024-06-01 00:00:00")).await.unwrap();

        assert!(report.is_success());
        assert_eq!(report.total_affected(), 1);
        assert_eq!(report.total_notified(), 0);
    }

    #[tokio::test]
    async fn missing_table_and_failing_table_are_isolated() {
        let f = fixture_with(
            InMemoryEvaluationStore::new()
                .without_table(FormType::SportsArts)
                .failing_on(FormType::ResearchCompetition),
            InMemoryNotificationSink::new(),
        );
        f.store
            .insert(publicized(FormType::ComprehensiveResult, "2021001", Some("2024-01-01 00:00:00")))
            .await
            .unwrap();

        let report = f.watcher.check_at(ts("2024-06-01 00:00:00")).await.unwrap();

        assert_eq!(report.outcomes.len(), 5);
        assert_eq!(report.failures().count(), 1);
        assert_eq!(
            report.outcome_for("sports_arts_evaluation").map(|o| o.result.clone()),
            Some(TableResult::Skipped(SkipReason::TableMissing))
        );
        assert_eq!(report.total_affected(), 1);
    }

    #[tokio::test]
    async fn missing_publicity_column_skips_table() {
        let f = fixture_with(
            InMemoryEvaluationStore::new().without_column(FormType::MonthlyMoral, "publicity_end_time"),
            InMemoryNotificationSink::new(),
        );
        f.store
            .insert(publicized(FormType::MonthlyMoral, "2021001", Some("2024-01-01 00:00:00")))
            .await
            .unwrap();

        let report = f.watcher.check_at(ts("2024-06-01 00:00:00")).await.unwrap();

        assert_eq!(
            report.outcome_for("moral_monthly_evaluation").map(|o| o.result.clone()),
            Some(TableResult::Skipped(SkipReason::ColumnMissing("publicity_end_time")))
        );
        assert_eq!(
            f.store.records(FormType::MonthlyMoral).await[0].status,
            EvaluationStatus::Publicized
        );
    }

    #[tokio::test]
    async fn reduced_table_list_limits_the_scan() {
        let store = Arc::new(InMemoryEvaluationStore::new());
        store
            .insert(publicized(FormType::MonthlyMoral, "2021001", Some("2024-01-01 00:00:00")))
            .await
            .unwrap();
        let watcher = PublicityWindowWatcher::with_tables(
            store.clone(),
            Arc::new(InMemoryStudentDirectory::new()),
            Arc::new(InMemoryNotificationSink::new()),
            vec![FormType::ComprehensiveResult.descriptor()],
        );

        let report = watcher.check_at(ts("2024-06-01 00:00:00")).await.unwrap();

        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(
            store.records(FormType::MonthlyMoral).await[0].status,
            EvaluationStatus::Publicized
        );
    }
}
