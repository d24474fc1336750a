//! HTTP adapter for the evaluation lifecycle.
//!
//! - `POST /api/backend/update-evaluation-status` - review transition now
//! - `POST /api/backend/force-update` - review transition ignoring deadlines
//! - `POST /api/backend/check-publicity-end-time` - close expired publicity now
//! - `POST /api/review/batch-approve` - reviewed → approved
//! - `POST /api/review/publish` - approved → publicized for the caller's squad
//! - `POST /api/evaluation-config/publish` - create declared rows
//! - `GET /health` - liveness

mod dto;
mod handlers;
mod routes;

pub use dto::{
    BatchApproveRequest, BatchApproveResponse, ErrorResponse, OpenPublicityResponse,
    PublishEvaluationRequest, PublishEvaluationResponse, TableOutcomeResponse, TriggerResponse,
};
pub use handlers::{EvaluationApiError, EvaluationAppState};
pub use routes::{app_router, evaluation_routes};
