//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors, auth)
//! - `evaluation` - Form types, status lifecycle, raw score rule, run reports
pub mod evaluation;
pub mod foundation;
