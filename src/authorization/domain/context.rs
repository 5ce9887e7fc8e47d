//! Facts about a task that role rules are resolved against.

use crate::directory::domain::UserId;
use crate::process::domain::ProcessId;
use crate::task::domain::TaskId;
use std::collections::BTreeSet;

/// Snapshot of the task attributes permission resolution reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskContext {
    /// Task being resolved.
    pub task_id: TaskId,
    /// Process the task instantiates.
    pub process_id: ProcessId,
    /// Task creator.
    pub created_by: UserId,
    /// Users referenced by the task's ASSIGNEE fields.
    pub assignees: BTreeSet<UserId>,
}

impl TaskContext {
    /// Creates a context without assignees.
    #[must_use]
    pub const fn new(task_id: TaskId, process_id: ProcessId, created_by: UserId) -> Self {
        Self {
            task_id,
            process_id,
            created_by,
            assignees: BTreeSet::new(),
        }
    }

    /// Returns a copy carrying `assignees`.
    #[must_use]
    pub fn with_assignees(mut self, assignees: impl IntoIterator<Item = UserId>) -> Self {
        self.assignees = assignees.into_iter().collect();
        self
    }
}
