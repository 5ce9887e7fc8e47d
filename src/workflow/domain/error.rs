//! Error types for state machine authoring and traversal.

use super::{StateId, TransitionId};
use crate::process::domain::ActionId;
use thiserror::Error;

/// Errors returned by state machine operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkflowDomainError {
    /// The state name is empty after trimming.
    #[error("state name must not be empty")]
    EmptyStateName,

    /// A transition must lead to a different state.
    #[error("transition from state {0} back to itself is not allowed")]
    SelfTransition(StateId),

    /// The (current, next) pair already exists for the process.
    #[error("transition from {current} to {next} already exists")]
    DuplicateTransition {
        /// Source state.
        current: StateId,
        /// Target state.
        next: StateId,
    },

    /// The process already leaves from another start-typed state.
    #[error("process already starts at state {existing}, cannot also start at {candidate}")]
    MultipleStartStates {
        /// Start state already in use.
        existing: StateId,
        /// Rejected second start state.
        candidate: StateId,
    },

    /// The transition does not belong to the process.
    #[error("transition {0} is not part of the process")]
    UnknownTransition(TransitionId),

    /// The action is already bound to the transition.
    #[error("action {action} is already bound to transition {transition}")]
    DuplicateBinding {
        /// Bound action.
        action: ActionId,
        /// Target transition.
        transition: TransitionId,
    },

    /// The action already leaves `state` through another transition.
    #[error("action {action} already leaves state {state} through another transition")]
    AmbiguousAction {
        /// Bound action.
        action: ActionId,
        /// Shared source state.
        state: StateId,
    },

    /// No transition leaves `state` through `action`.
    #[error("action {action} cannot be applied in state {state}")]
    InvalidTransition {
        /// Current state.
        state: StateId,
        /// Requested action.
        action: ActionId,
    },
}

/// Error returned while parsing state types from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown state type: {0}")]
pub struct ParseStateTypeError(pub String);
