//! Campus Eval - comprehensive evaluation (综测) lifecycle backend.
//!
//! Drives evaluation forms through declared → reviewed → approved →
//! publicized → finalized, closing review and publicity windows on their
//! deadlines and notifying students when their results become final.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
