//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use rust_decimal::Decimal;

use campus_eval::adapters::auth::MockSessionValidator;
use campus_eval::adapters::http::{app_router, EvaluationAppState};
use campus_eval::adapters::{InMemoryEvaluationStore, InMemoryNotificationSink, InMemoryStudentDirectory};
use campus_eval::application::handlers::evaluation::{
    BatchApproveHandler, OpenPublicityHandler, PublicityWindowWatcher, PublishEvaluationHandler,
    StatusLifecycleEngine,
};
use campus_eval::domain::evaluation::{
    AcademicTerm, AcademicYear, Deadlines, EvaluationRecord, EvaluationStatus, FormType,
    ScoreBreakdown, Semester, StatusTransition, StudentProfile,
};
use campus_eval::domain::foundation::{AuthenticatedUser, Role, StudentId, Timestamp, UserId};

pub const DEPARTMENT: &str = "计算机学院";
pub const SQUAD: &str = "一中队";

pub const ADMIN_TOKEN: &str = "admin-token";
pub const COUNSELOR_TOKEN: &str = "counselor-token";
pub const LEADER_TOKEN: &str = "leader-token";
pub const STUDENT_TOKEN: &str = "student-token";

pub fn ts(s: &str) -> Timestamp {
    Timestamp::parse(s).unwrap()
}

pub fn user(id: i64) -> UserId {
    UserId::new(id).unwrap()
}

pub fn profile(student_id: &str) -> StudentProfile {
    StudentProfile {
        student_id: StudentId::new(student_id).unwrap(),
        name: format!("学生{}", student_id),
        department: DEPARTMENT.into(),
        major: "软件工程".into(),
        squad: SQUAD.into(),
        class_id: Some("2101".into()),
    }
}

/// Row scoring 80 + 5 - 2 in the first semester of 2023-2024.
pub fn record(form: FormType, student_id: &str) -> EvaluationRecord {
    let term = AcademicTerm::for_form(
        form,
        AcademicYear::parse("2023-2024").unwrap(),
        Semester::First,
        form.has_month().then_some(10),
    )
    .unwrap();

    EvaluationRecord {
        id: 0,
        form,
        student: profile(student_id),
        term,
        score: ScoreBreakdown::new(Decimal::from(80))
            .with_bonus(Decimal::from(5))
            .with_penalty(Decimal::from(2)),
        raw_score: None,
        status: EvaluationStatus::Declared,
        deadlines: Deadlines::default(),
        description: None,
        remark: None,
    }
}

pub fn declared(form: FormType, student_id: &str, review_end: Option<&str>) -> EvaluationRecord {
    let mut r = record(form, student_id);
    r.deadlines.review_end = review_end.map(ts);
    r
}

pub fn publicized(form: FormType, student_id: &str, publicity_end: Option<&str>) -> EvaluationRecord {
    let mut r = record(form, student_id);
    r.advance(StatusTransition::review().unwrap());
    r.status = EvaluationStatus::Publicized;
    r.deadlines.publicity_end = publicity_end.map(ts);
    r
}

/// Every service wired over the in-memory adapters.
pub struct Harness {
    pub store: Arc<InMemoryEvaluationStore>,
    pub sink: Arc<InMemoryNotificationSink>,
    pub directory: Arc<InMemoryStudentDirectory>,
    pub engine: Arc<StatusLifecycleEngine>,
    pub watcher: Arc<PublicityWindowWatcher>,
}

impl Harness {
    pub fn new(store: InMemoryEvaluationStore, directory: InMemoryStudentDirectory) -> Self {
        let store = Arc::new(store);
        let sink = Arc::new(InMemoryNotificationSink::new());
        let directory = Arc::new(directory);
        let engine = Arc::new(StatusLifecycleEngine::new(store.clone()));
        let watcher = Arc::new(PublicityWindowWatcher::new(
            store.clone(),
            directory.clone(),
            sink.clone(),
        ));

        Self {
            store,
            sink,
            directory,
            engine,
            watcher,
        }
    }

    /// Store with every table and a squad of three students (ids 41..=43).
    pub fn with_squad() -> Self {
        let directory = InMemoryStudentDirectory::new()
            .with_student(user(41), profile("2021001"))
            .with_student(user(42), profile("2021002"))
            .with_student(user(43), profile("2021003"));
        Self::new(InMemoryEvaluationStore::new(), directory)
    }

    pub fn state(&self) -> EvaluationAppState {
        EvaluationAppState {
            engine: self.engine.clone(),
            watcher: self.watcher.clone(),
            batch_approve: Arc::new(BatchApproveHandler::new(self.store.clone())),
            open_publicity: Arc::new(OpenPublicityHandler::new(
                self.store.clone(),
                self.directory.clone(),
                self.sink.clone(),
            )),
            publish: Arc::new(PublishEvaluationHandler::new(
                self.store.clone(),
                self.directory.clone(),
            )),
        }
    }

    /// Router behind a mock validator that knows one token per role.
    pub fn router(&self) -> Router {
        let validator = MockSessionValidator::new()
            .with_test_user(ADMIN_TOKEN, 1, [Role::Admin])
            .with_user(
                COUNSELOR_TOKEN,
                AuthenticatedUser::new(user(2), "李辅导员", [Role::Counselor])
                    .with_scope(DEPARTMENT, SQUAD),
            )
            .with_user(
                LEADER_TOKEN,
                AuthenticatedUser::new(user(3), "张队长", [Role::GroupLeader])
                    .with_scope(DEPARTMENT, SQUAD),
            )
            .with_test_user(STUDENT_TOKEN, 41, [Role::Student]);

        app_router(self.state(), Arc::new(validator))
    }
}
