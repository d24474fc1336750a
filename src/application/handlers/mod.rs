//! Application handlers.
//!
//! Command handlers and lifecycle processes that orchestrate domain
//! operations over the ports.

pub mod evaluation;

pub use evaluation::{
    BatchApproveCommand, BatchApproveHandler, BatchApproveResult, OpenPublicityCommand,
    OpenPublicityHandler, OpenPublicityResult, PublicityWindowWatcher, PublishEvaluationCommand,
    PublishEvaluationHandler, PublishEvaluationResult, RunGuard, StatusLifecycleEngine,
};
