//! Domain model for workflow states and transitions.

mod error;
mod ids;
mod machine;
mod state;

pub use error::{ParseStateTypeError, WorkflowDomainError};
pub use ids::{StateId, TransitionId};
pub use machine::{ActionTransition, StateMachine, Transition};
pub use state::{State, StateType};
