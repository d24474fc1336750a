//! Evaluation status state machine.
//!
//! Statuses are stored as small integers. The order of the lifecycle is
//! declared (0) → reviewed (1) → approved (2) → publicized (3) → finalized (-1).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{StateMachine, ValidationError};

/// Lifecycle status of one evaluation row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    /// Editable, waiting for the review deadline.
    Declared,

    /// Review deadline passed; raw score computed.
    Reviewed,

    /// Batch-approved by a reviewer.
    Approved,

    /// Visible to the squad for public comment.
    Publicized,

    /// Publicity window elapsed. Terminal.
    Finalized,
}

impl EvaluationStatus {
    /// Integer code as stored in the `status` column.
    pub fn code(&self) -> i16 {
        match self {
            EvaluationStatus::Declared => 0,
            EvaluationStatus::Reviewed => 1,
            EvaluationStatus::Approved => 2,
            EvaluationStatus::Publicized => 3,
            EvaluationStatus::Finalized => -1,
        }
    }

    pub fn from_code(code: i16) -> Result<Self, ValidationError> {
        match code {
            0 => Ok(EvaluationStatus::Declared),
            1 => Ok(EvaluationStatus::Reviewed),
            2 => Ok(EvaluationStatus::Approved),
            3 => Ok(EvaluationStatus::Publicized),
            -1 => Ok(EvaluationStatus::Finalized),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown status code {}", other),
            )),
        }
    }
}

impl fmt::Display for EvaluationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl StateMachine for EvaluationStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use EvaluationStatus::*;
        matches!(
            (self, target),
            (Declared, Reviewed) | (Reviewed, Approved) | (Approved, Publicized) | (Publicized, Finalized)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use EvaluationStatus::*;
        match self {
            Declared => vec![Reviewed],
            Reviewed => vec![Approved],
            Approved => vec![Publicized],
            Publicized => vec![Finalized],
            Finalized => vec![],
        }
    }
}

/// One legal status move, as applied by a guarded bulk update.
///
/// Stores take both the `WHERE status = ..` and the `SET status = ..` codes
/// from this pair, so an update can only name a move the lifecycle allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTransition {
    prior: EvaluationStatus,
    next: EvaluationStatus,
}

impl StatusTransition {
    pub fn new(prior: EvaluationStatus, next: EvaluationStatus) -> Result<Self, ValidationError> {
        let next = prior.transition_to(next)?;
        Ok(Self { prior, next })
    }

    /// Declared → reviewed, when the review deadline passes.
    pub fn review() -> Result<Self, ValidationError> {
        Self::new(EvaluationStatus::Declared, EvaluationStatus::Reviewed)
    }

    /// Reviewed → approved, by a reviewer.
    pub fn approve() -> Result<Self, ValidationError> {
        Self::new(EvaluationStatus::Reviewed, EvaluationStatus::Approved)
    }

    /// Approved → publicized, when a squad opens publicity.
    pub fn open_publicity() -> Result<Self, ValidationError> {
        Self::new(EvaluationStatus::Approved, EvaluationStatus::Publicized)
    }

    /// Publicized → finalized, when the publicity window closes.
    pub fn finalize() -> Result<Self, ValidationError> {
        Self::new(EvaluationStatus::Publicized, EvaluationStatus::Finalized)
    }

    pub fn prior(&self) -> EvaluationStatus {
        self.prior
    }

    pub fn next(&self) -> EvaluationStatus {
        self.next
    }

    /// Moves `status` if it is the prior state. Returns true when moved.
    pub fn apply(&self, status: &mut EvaluationStatus) -> bool {
        if *status != self.prior {
            return false;
        }
        *status = self.next;
        true
    }
}
