//! Repository port for tasks, their field data and their action log.

use crate::authorization::domain::{ReconcileOutcome, TaskPermission};
use crate::directory::domain::UserId;
use crate::process::domain::{FieldId, FieldValue, ProcessId};
use crate::task::domain::{Task, TaskActionLog, TaskData, TaskDataHistory, TaskId, TaskTitle};
use crate::workflow::domain::StateId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Everything written when a task is created.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskCreation {
    /// New task.
    pub task: Task,
    /// Initial field values.
    pub data: Vec<TaskData>,
    /// Initial permission rows.
    pub permissions: Vec<TaskPermission>,
}

/// Compare-and-swap of a task's state plus the log entry recording it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionCommit {
    /// Task to move.
    pub task_id: TaskId,
    /// State the caller read before deciding the transition.
    pub expected_state: StateId,
    /// State to move to.
    pub next_state: StateId,
    /// Modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Audit entry appended with the move.
    pub log: TaskActionLog,
}

/// One field edit, conditioned on what the editor read.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldUpdate {
    /// Edited task.
    pub task_id: TaskId,
    /// Edited field.
    pub field_id: FieldId,
    /// State the task was in when the edit was checked.
    pub expected_state: StateId,
    /// Value the field held when the edit was checked; `None` when empty.
    pub expected_value: Option<FieldValue>,
    /// New value; `None` clears the field.
    pub value: Option<TaskData>,
    /// Superseded value, when one existed.
    pub history: Option<TaskDataHistory>,
    /// Replacement permission rows when the edit changes who may act.
    pub permissions: Option<Vec<TaskPermission>>,
    /// Modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Task persistence contract.
///
/// Every mutating method is atomic: either all of its writes land or none
/// do.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a task with its initial data and permission rows.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] or
    /// [`TaskRepositoryError::DuplicateTitle`] when either is taken.
    async fn create(&self, creation: &TaskCreation) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Counts the titles starting with `prefix`.
    async fn count_titles_with_prefix(&self, prefix: &str) -> TaskRepositoryResult<usize>;

    /// Returns the current field values of a task.
    async fn find_data(&self, task: TaskId) -> TaskRepositoryResult<Vec<TaskData>>;

    /// Returns the history of one field, oldest first.
    async fn find_history(
        &self,
        task: TaskId,
        field: FieldId,
    ) -> TaskRepositoryResult<Vec<TaskDataHistory>>;

    /// Returns the action log of a task in commit order.
    async fn find_logs(&self, task: TaskId) -> TaskRepositoryResult<Vec<TaskActionLog>>;

    /// Moves a task to its next state if it is still in the expected one.
    ///
    /// Returns the updated task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::ConcurrentModification`] when the
    /// task left `expected_state` in the meantime.
    async fn commit_transition(&self, commit: &TransitionCommit) -> TaskRepositoryResult<Task>;

    /// Applies a field edit, its history row and optional permission rebuild.
    ///
    /// Returns the permission changes when a rebuild was requested.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::ConcurrentModification`] when the task
    /// left `expected_state`, and [`TaskRepositoryError::StaleFieldValue`]
    /// when the field no longer holds `expected_value`.
    async fn apply_field_update(
        &self,
        update: &FieldUpdate,
    ) -> TaskRepositoryResult<Option<ReconcileOutcome>>;

    /// Returns the tasks created by `user`, newest first.
    async fn list_created_by(&self, user: UserId) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns every task, optionally restricted to one process, oldest first.
    async fn list(&self, process: Option<ProcessId>) -> TaskRepositoryResult<Vec<Task>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// A task with the same title already exists.
    #[error("duplicate task title: {0}")]
    DuplicateTitle(TaskTitle),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The task is no longer in the state the caller read.
    #[error("task {task_id} is no longer in state {expected}")]
    ConcurrentModification {
        /// Contested task.
        task_id: TaskId,
        /// State the caller expected.
        expected: StateId,
    },

    /// The field no longer holds the value the caller read.
    #[error("field {field_id} of task {task_id} changed concurrently")]
    StaleFieldValue {
        /// Contested task.
        task_id: TaskId,
        /// Contested field.
        field_id: FieldId,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
