//! HTTP handlers for the evaluation lifecycle endpoints.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::middleware::{AuthRejection, RequireAuth};
use crate::application::handlers::evaluation::{
    BatchApproveCommand, BatchApproveHandler, OpenPublicityCommand, OpenPublicityHandler,
    PublicityWindowWatcher, PublishEvaluationCommand, PublishEvaluationHandler,
    StatusLifecycleEngine,
};
use crate::domain::evaluation::{
    ApproveFilter, Deadlines, FormType, RosterScope, SquadScope, TransitionReport,
};
use crate::domain::foundation::{DomainError, ErrorCode, Role};

use super::dto::{
    BatchApproveRequest, BatchApproveResponse, ErrorResponse, OpenPublicityResponse,
    PublishEvaluationRequest, PublishEvaluationResponse, TriggerResponse,
};

const TRIGGER_ROLES: &[Role] = &[Role::Admin, Role::Counselor];
const APPROVE_ROLES: &[Role] = &[Role::GroupLeader, Role::Counselor, Role::Admin];
const PUBLISH_ROLES: &[Role] = &[Role::Counselor, Role::Admin];

// ════════════════════════════════════════════════════════════════════════════════
// State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state of the evaluation router.
#[derive(Clone)]
pub struct EvaluationAppState {
    pub engine: Arc<StatusLifecycleEngine>,
    pub watcher: Arc<PublicityWindowWatcher>,
    pub batch_approve: Arc<BatchApproveHandler>,
    pub open_publicity: Arc<OpenPublicityHandler>,
    pub publish: Arc<PublishEvaluationHandler>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Lifecycle triggers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/backend/update-evaluation-status - Review transition now
pub async fn update_evaluation_status(
    State(state): State<EvaluationAppState>,
    auth: RequireAuth,
) -> Result<Response, AuthRejection> {
    let user = auth.require_any(TRIGGER_ROLES)?;
    tracing::info!(user_id = %user.id, "Manual review transition requested");

    let result = state.engine.run_manual_transition().await;
    Ok(trigger_response(result, "评测状态更新成功"))
}

/// POST /api/backend/force-update - Review transition ignoring deadlines
pub async fn force_update(
    State(state): State<EvaluationAppState>,
    auth: RequireAuth,
) -> Result<Response, AuthRejection> {
    let user = auth.require_any(TRIGGER_ROLES)?;
    tracing::warn!(user_id = %user.id, "Forced review transition requested");

    let result = state.engine.run_force_transition().await;
    Ok(trigger_response(result, "强制更新评测状态成功"))
}

/// POST /api/backend/check-publicity-end-time - Close expired publicity now
pub async fn check_publicity_end_time(
    State(state): State<EvaluationAppState>,
    auth: RequireAuth,
) -> Result<Response, AuthRejection> {
    let user = auth.require_any(TRIGGER_ROLES)?;
    tracing::info!(user_id = %user.id, "Manual publicity check requested");

    let result = state.watcher.check_publicity_deadlines().await;
    Ok(trigger_response(result, "公示期检查完成"))
}

fn trigger_response(result: Result<TransitionReport, DomainError>, success_message: &str) -> Response {
    let body = match result {
        Ok(report) => TriggerResponse::from_report(&report, success_message),
        Err(e) => {
            tracing::warn!(error = %e, "Lifecycle trigger refused");
            TriggerResponse::failure(e.message)
        }
    };

    let status = if body.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, Json(body)).into_response()
}

// ════════════════════════════════════════════════════════════════════════════════
// Review actions
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/review/batch-approve - Approve every reviewed row of a form
pub async fn batch_approve(
    State(state): State<EvaluationAppState>,
    auth: RequireAuth,
    Json(req): Json<BatchApproveRequest>,
) -> Result<Response, EvaluationApiError> {
    auth.require_any(APPROVE_ROLES)?;

    let form: FormType = req.form_type.parse()?;
    let cmd = BatchApproveCommand {
        form,
        filter: ApproveFilter {
            major: req.major,
            class_id: req.class_id,
        },
    };

    let result = state.batch_approve.handle(cmd).await?;
    let body = BatchApproveResponse {
        success: true,
        message: format!("已批量审核通过{}条{}记录", result.approved, form.display_name()),
        approved: result.approved,
    };
    Ok((StatusCode::OK, Json(body)).into_response())
}

/// POST /api/review/publish - Open publicity for the caller's squad
pub async fn open_publicity(
    State(state): State<EvaluationAppState>,
    auth: RequireAuth,
) -> Result<Response, EvaluationApiError> {
    let user = auth.require_any(&[Role::GroupLeader])?;

    let (Some(department), Some(squad)) = (user.department.clone(), user.squad.clone()) else {
        return Err(DomainError::new(ErrorCode::Forbidden, "当前账号未绑定学院或中队").into());
    };

    let cmd = OpenPublicityCommand {
        scope: SquadScope { department, squad },
        sender: user.name.clone(),
    };

    let result = state.open_publicity.handle(cmd).await?;
    let body = OpenPublicityResponse {
        success: true,
        message: format!("已公示{}条记录，通知{}名学生", result.opened, result.notified),
        opened: result.opened,
        notified: result.notified,
    };
    Ok((StatusCode::OK, Json(body)).into_response())
}

// ════════════════════════════════════════════════════════════════════════════════
// Publishing
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/evaluation-config/publish - Create the draft rows of a form
pub async fn publish_evaluation(
    State(state): State<EvaluationAppState>,
    auth: RequireAuth,
    Json(req): Json<PublishEvaluationRequest>,
) -> Result<Response, EvaluationApiError> {
    let user = auth.require_any(PUBLISH_ROLES)?;

    let form: FormType = req.form_type.parse()?;
    let department = req
        .department
        .or_else(|| user.department.clone())
        .ok_or_else(|| DomainError::validation("department", "请指定学院"))?;

    let cmd = PublishEvaluationCommand {
        form,
        academic_year: req.academic_year,
        semester: req.semester,
        month: req.month,
        description: req.description,
        base_score: req.base_score,
        deadlines: Deadlines {
            declare_start: req.declare_start_time,
            declare_end: req.declare_end_time,
            review_end: req.review_end_time,
            publicity_start: req.publicity_start_time,
            publicity_end: req.publicity_end_time,
        },
        roster: RosterScope {
            department,
            squad: req.squad,
            major: req.major,
        },
    };

    let result = state.publish.handle(cmd).await?;
    let body = PublishEvaluationResponse {
        success: true,
        message: format!("{}发布成功，共{}名学生", form.display_name(), result.created),
        created: result.created,
    };
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

/// GET /health - Liveness probe
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error wrapper that converts domain errors to HTTP responses.
#[derive(Debug)]
pub enum EvaluationApiError {
    Auth(AuthRejection),
    Domain(DomainError),
}

impl From<DomainError> for EvaluationApiError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<AuthRejection> for EvaluationApiError {
    fn from(err: AuthRejection) -> Self {
        Self::Auth(err)
    }
}

impl IntoResponse for EvaluationApiError {
    fn into_response(self) -> Response {
        let err = match self {
            EvaluationApiError::Auth(rejection) => return rejection.into_response(),
            EvaluationApiError::Domain(err) => err,
        };

        let status = match err.code {
            ErrorCode::ValidationFailed
            | ErrorCode::UnknownFormType
            | ErrorCode::InvalidStateTransition => StatusCode::BAD_REQUEST,
            ErrorCode::TableMissing | ErrorCode::ColumnMissing | ErrorCode::IdentityUnresolved => {
                StatusCode::NOT_FOUND
            }
            ErrorCode::PendingReview | ErrorCode::AlreadyPublished | ErrorCode::RunInProgress => {
                StatusCode::CONFLICT
            }
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotificationFailed => StatusCode::BAD_GATEWAY,
            ErrorCode::DatabaseError | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %err, "Request failed");
            ErrorResponse::new(err.code.to_string(), "服务器内部错误")
        } else {
            let mut body = ErrorResponse::new(err.code.to_string(), err.message);
            if !err.details.is_empty() {
                body.details = serde_json::to_value(&err.details).ok();
            }
            body
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: DomainError) -> StatusCode {
        EvaluationApiError::from(err).into_response().status()
    }

    #[test]
    fn validation_maps_to_400() {
        assert_eq!(status_of(DomainError::validation("month", "bad")), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(DomainError::new(ErrorCode::UnknownFormType, "x")),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn business_conflicts_map_to_409() {
        assert_eq!(status_of(DomainError::new(ErrorCode::PendingReview, "x")), StatusCode::CONFLICT);
        assert_eq!(
            status_of(DomainError::new(ErrorCode::AlreadyPublished, "x")),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn missing_table_maps_to_404() {
        assert_eq!(status_of(DomainError::new(ErrorCode::TableMissing, "x")), StatusCode::NOT_FOUND);
    }

    #[test]
    fn database_error_maps_to_500() {
        assert_eq!(
            status_of(DomainError::database("select", "connection reset")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn auth_rejection_passes_through() {
        let response = EvaluationApiError::from(AuthRejection::Forbidden).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn refused_trigger_is_400_with_message() {
        let response = trigger_response(
            Err(DomainError::new(ErrorCode::RunInProgress, "a run is already in progress")),
            "ok",
        );
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn clean_trigger_is_200() {
        let response = trigger_response(Ok(TransitionReport::default()), "ok");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
