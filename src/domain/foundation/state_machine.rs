//! State machine trait for status enums.
//!
//! Gives lifecycle statuses a uniform way to say which moves are legal.
//! `EvaluationStatus` implements it, and `StatusTransition::new` refuses any
//! pair it rejects. The stores build their guarded updates from those pairs.

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// # Example
///
/// ```ignore
/// let next = EvaluationStatus::Declared.transition_to(EvaluationStatus::Reviewed)?;
/// assert!(EvaluationStatus::Finalized.is_terminal());
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Light {
        Off,
        On,
        Broken,
    }

    impl StateMachine for Light {
        fn can_transition_to(&self, target: &Self) -> bool {
            self.valid_transitions().contains(target)
        }

        fn valid_transitions(&self) -> Vec<Self> {
            match self {
                Light::Off => vec![Light::On, Light::Broken],
                Light::On => vec![Light::Off, Light::Broken],
                Light::Broken => vec![],
            }
        }
    }

    #[test]
    fn transition_to_checks_table() {
        assert_eq!(Light::Off.transition_to(Light::On), Ok(Light::On));
        assert!(Light::Broken.transition_to(Light::On).is_err());
    }

    #[test]
    fn terminal_means_no_exits() {
        assert!(Light::Broken.is_terminal());
        assert!(!Light::On.is_terminal());
    }
}
