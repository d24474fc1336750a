//! HTTP tests for the evaluation router.
//!
//! Requests go through the full axum stack (auth middleware, extractors,
//! handlers) with `tower::ServiceExt::oneshot` and in-memory adapters.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use campus_eval::adapters::{InMemoryEvaluationStore, InMemoryStudentDirectory};
use campus_eval::domain::evaluation::{EvaluationStatus, FormType, StatusTransition};

use common::*;

async fn send(app: Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

// =============================================================================
// Public and auth
// =============================================================================

#[tokio::test]
async fn health_needs_no_token() {
    let h = Harness::with_squad();
    let (status, body) = send(h.router(), "GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn trigger_without_token_is_401() {
    let h = Harness::with_squad();
    let (status, _) = send(h.router(), "POST", "/api/backend/update-evaluation-status", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_token_is_401() {
    let h = Harness::with_squad();
    let (status, body) = send(
        h.router(),
        "POST",
        "/api/backend/update-evaluation-status",
        Some("forged"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "AUTH_ERROR");
}

#[tokio::test]
async fn student_cannot_trigger_lifecycle() {
    let h = Harness::with_squad();
    let (status, _) = send(
        h.router(),
        "POST",
        "/api/backend/force-update",
        Some(STUDENT_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// =============================================================================
// Lifecycle triggers
// =============================================================================

#[tokio::test]
async fn manual_transition_reports_every_table() {
    let h = Harness::with_squad();
    h.store
        .insert(declared(FormType::MonthlyMoral, "2021001", Some("2024-01-01 00:00:00")))
        .await
        .unwrap();

    let (status, body) = send(
        h.router(),
        "POST",
        "/api/backend/update-evaluation-status",
        Some(ADMIN_TOKEN),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let tables = body["tables"].as_array().unwrap();
    assert_eq!(tables.len(), 3);

    let monthly = tables
        .iter()
        .find(|t| t["table"] == FormType::MonthlyMoral.table_name())
        .unwrap();
    assert_eq!(monthly["outcome"], "transitioned");
    assert_eq!(monthly["affected"], 1);

    let rows = h.store.records(FormType::MonthlyMoral).await;
    assert_eq!(rows[0].status, EvaluationStatus::Reviewed);
}

#[tokio::test]
async fn force_update_ignores_deadlines() {
    let h = Harness::with_squad();
    h.store
        .insert(declared(FormType::SportsArts, "2021001", Some("2099-01-01 00:00:00")))
        .await
        .unwrap();

    let (status, body) = send(
        h.router(),
        "POST",
        "/api/backend/force-update",
        Some(COUNSELOR_TOKEN),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let rows = h.store.records(FormType::SportsArts).await;
    assert_eq!(rows[0].status, EvaluationStatus::Reviewed);
}

#[tokio::test]
async fn failing_table_turns_trigger_into_400() {
    let store = InMemoryEvaluationStore::new().failing_on(FormType::ResearchCompetition);
    let h = Harness::new(store, InMemoryStudentDirectory::new());

    let (status, body) = send(
        h.router(),
        "POST",
        "/api/backend/update-evaluation-status",
        Some(ADMIN_TOKEN),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    let research = body["tables"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["table"] == FormType::ResearchCompetition.table_name())
        .unwrap();
    assert_eq!(research["outcome"], "failed");
}

#[tokio::test]
async fn publicity_check_finalizes_and_notifies() {
    let h = Harness::with_squad();
    h.store
        .insert(publicized(FormType::SportsArts, "2021002", Some("2024-01-01 00:00:00")))
        .await
        .unwrap();

    let (status, body) = send(
        h.router(),
        "POST",
        "/api/backend/check-publicity-end-time",
        Some(ADMIN_TOKEN),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tables"].as_array().unwrap().len(), 5);
    let rows = h.store.records(FormType::SportsArts).await;
    assert_eq!(rows[0].status, EvaluationStatus::Finalized);
    assert_eq!(h.sink.sent_to(user(42)).await.len(), 1);
}

// =============================================================================
// Review actions
// =============================================================================

#[tokio::test]
async fn batch_approve_by_request_code() {
    let h = Harness::with_squad();
    let mut row = declared(FormType::MonthlyMoral, "2021001", Some("2024-01-01 00:00:00"));
    row.advance(StatusTransition::review().unwrap());
    h.store.insert(row).await.unwrap();

    let (status, body) = send(
        h.router(),
        "POST",
        "/api/review/batch-approve",
        Some(LEADER_TOKEN),
        Some(json!({ "form_type": "MONTHLY_A" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["approved"], 1);
    let rows = h.store.records(FormType::MonthlyMoral).await;
    assert_eq!(rows[0].status, EvaluationStatus::Approved);
}

#[tokio::test]
async fn batch_approve_rejects_unknown_form() {
    let h = Harness::with_squad();
    let (status, body) = send(
        h.router(),
        "POST",
        "/api/review/batch-approve",
        Some(ADMIN_TOKEN),
        Some(json!({ "form_type": "TYPE_Z" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "UNKNOWN_FORM_TYPE");
}

#[tokio::test]
async fn open_publicity_uses_leader_squad() {
    let h = Harness::with_squad();
    let mut row = declared(FormType::ResearchCompetition, "2021001", Some("2024-01-01 00:00:00"));
    row.advance(StatusTransition::review().unwrap());
    row.status = EvaluationStatus::Approved;
    h.store.insert(row).await.unwrap();

    let (status, body) = send(h.router(), "POST", "/api/review/publish", Some(LEADER_TOKEN), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["opened"], 1);
    assert_eq!(body["notified"], 3);
    let notices = h.sink.sent_to(user(41)).await;
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].sender, "张队长");
}

#[tokio::test]
async fn open_publicity_conflicts_while_review_pending() {
    let h = Harness::with_squad();
    h.store
        .insert(declared(FormType::SportsArts, "2021001", Some("2099-01-01 00:00:00")))
        .await
        .unwrap();

    let (status, body) = send(h.router(), "POST", "/api/review/publish", Some(LEADER_TOKEN), None).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "PENDING_REVIEW");
}

#[tokio::test]
async fn open_publicity_is_leader_only() {
    let h = Harness::with_squad();
    let (status, _) = send(h.router(), "POST", "/api/review/publish", Some(COUNSELOR_TOKEN), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// =============================================================================
// Publishing
// =============================================================================

fn publish_body() -> Value {
    json!({
        "form_type": "moral_semester_evaluation",
        "academic_year": "2023-2024",
        "semester": 2,
        "base_score": "70.5",
        "publicity_start_time": "2024-07-01 00:00:00",
        "publicity_end_time": "2024-07-08 00:00:00"
    })
}

#[tokio::test]
async fn counselor_publishes_for_own_department() {
    let h = Harness::with_squad();

    let (status, body) = send(
        h.router(),
        "POST",
        "/api/evaluation-config/publish",
        Some(COUNSELOR_TOKEN),
        Some(publish_body()),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["created"], 3);
    let rows = h.store.records(FormType::SemesterMoral).await;
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.status == EvaluationStatus::Declared));
}

#[tokio::test]
async fn publishing_twice_conflicts() {
    let h = Harness::with_squad();
    let app = h.router();

    let (first, _) = send(
        app.clone(),
        "POST",
        "/api/evaluation-config/publish",
        Some(COUNSELOR_TOKEN),
        Some(publish_body()),
    )
    .await;
    let (second, body) = send(
        app,
        "POST",
        "/api/evaluation-config/publish",
        Some(COUNSELOR_TOKEN),
        Some(publish_body()),
    )
    .await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ALREADY_PUBLISHED");
}

#[tokio::test]
async fn admin_without_department_must_name_one() {
    let h = Harness::with_squad();

    let (status, body) = send(
        h.router(),
        "POST",
        "/api/evaluation-config/publish",
        Some(ADMIN_TOKEN),
        Some(publish_body()),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn monthly_publish_requires_month() {
    let h = Harness::with_squad();
    let mut body = publish_body();
    body["form_type"] = json!("MONTHLY_A");
    body["review_end_time"] = json!("2024-06-30 00:00:00");

    let (status, _) = send(
        h.router(),
        "POST",
        "/api/evaluation-config/publish",
        Some(COUNSELOR_TOKEN),
        Some(body),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
