//! Application layer - Commands and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::{
    BatchApproveCommand, BatchApproveHandler, BatchApproveResult, OpenPublicityCommand,
    OpenPublicityHandler, OpenPublicityResult, PublicityWindowWatcher, PublishEvaluationCommand,
    PublishEvaluationHandler, PublishEvaluationResult, RunGuard, StatusLifecycleEngine,
};
