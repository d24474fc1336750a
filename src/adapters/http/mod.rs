//! HTTP adapters - REST API implementations.

pub mod evaluation;
pub mod middleware;

pub use evaluation::{app_router, EvaluationAppState};
