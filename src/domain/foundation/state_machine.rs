//! Lifecycle transitions for round statuses.

use super::{DomainError, ErrorCode};

/// A status enum with a fixed transition table.
///
/// Rounds move between statuses only through `transition_to`, so an illegal
/// move (answering before start, resolving twice) surfaces as
/// `InvalidStateTransition` instead of silently corrupting the round.
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if moving from `self` to `target` is allowed.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Every status reachable in one step.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Returns `target` if the move is allowed.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` naming both statuses
    fn transition_to(&self, target: Self) -> Result<Self, DomainError> {
        if self.can_transition_to(&target) {
            return Ok(target);
        }
        Err(DomainError::new(
            ErrorCode::InvalidStateTransition,
            format!("Cannot move from {:?} to {:?}", self, target),
        )
        .with_detail("from", format!("{:?}", self))
        .with_detail("to", format!("{:?}", target)))
    }
}
