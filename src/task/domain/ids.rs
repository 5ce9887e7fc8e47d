//! Identifier types for the task domain.

use crate::identifier::uuid_identifier;

uuid_identifier!(
    /// Unique identifier for a task instance.
    TaskId
);

uuid_identifier!(
    /// Unique identifier for an action log entry.
    ActionLogId
);
