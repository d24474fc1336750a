//! HTTP routes for the evaluation endpoints.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::adapters::http::middleware::{auth_middleware, AuthState};

use super::handlers::{
    batch_approve, check_publicity_end_time, force_update, health, open_publicity,
    publish_evaluation, update_evaluation_status, EvaluationAppState,
};

/// Creates the evaluation router with all endpoints.
pub fn evaluation_routes(state: EvaluationAppState) -> Router {
    Router::new()
        .route("/api/backend/update-evaluation-status", post(update_evaluation_status))
        .route("/api/backend/force-update", post(force_update))
        .route("/api/backend/check-publicity-end-time", post(check_publicity_end_time))
        .route("/api/review/batch-approve", post(batch_approve))
        .route("/api/review/publish", post(open_publicity))
        .route("/api/evaluation-config/publish", post(publish_evaluation))
        .with_state(state)
}

/// Full application router: evaluation endpoints behind bearer auth, plus `/health`.
pub fn app_router(state: EvaluationAppState, validator: AuthState) -> Router {
    evaluation_routes(state)
        .layer(middleware::from_fn_with_state(validator, auth_middleware))
        .route("/health", get(health))
}
