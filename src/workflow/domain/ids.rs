//! Identifier types for the workflow domain.

use crate::identifier::uuid_identifier;

uuid_identifier!(
    /// Unique identifier for a workflow state.
    StateId
);

uuid_identifier!(
    /// Unique identifier for a process transition.
    TransitionId
);
