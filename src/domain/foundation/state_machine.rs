//! State machine trait for stage enums.
//!
//! Gives a uniform way to ask whether a move between two states is legal and
//! to perform it with validation. The dialogue stage enum is the main
//! implementor.

use std::fmt::Display;

use super::ValidationError;

/// Trait for enums that represent state machines.
///
/// Implementors list their legal targets; validated transitions and the
/// terminal check come for free.
///
/// # Example
///
/// ```ignore
/// let next = DialogueStage::Closure.transition_to(DialogueStage::Ended)?;
/// assert!(next.is_terminal());
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + Display {
    /// Returns all valid target states from the current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Returns true if a transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Performs the transition, returning an error if it is not allowed.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_transition(
                self.to_string(),
                target.to_string(),
            ))
        }
    }

    /// Checks if the current state is terminal (no outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
