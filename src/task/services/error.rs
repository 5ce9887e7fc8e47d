//! Error taxonomy shared by the task services.

use crate::authorization::{ports::PermissionRepositoryError, services::PermissionCacheError};
use crate::directory::{domain::UserId, ports::DirectoryError};
use crate::process::{
    domain::{ActionId, FieldId, FieldValidationError, ProcessId, SubmissionError},
    ports::ProcessRepositoryError,
};
use crate::task::{
    domain::TaskId,
    ports::{BlobStoreError, LabelCatalogError, TaskRepositoryError},
};
use crate::workflow::{domain::StateId, ports::WorkflowRepositoryError};
use thiserror::Error;

/// Errors returned by task services.
///
/// Every variant aborts the operation before anything is written.
#[derive(Debug, Error)]
pub enum TaskServiceError {
    /// The process is unknown, inactive or has no usable start state.
    #[error("process {0} cannot be used for tasks")]
    InvalidProcess(ProcessId),

    /// The field is not part of the task's process.
    #[error("field {0} is not part of the process")]
    InvalidField(FieldId),

    /// A submitted value does not fit its field.
    #[error(transparent)]
    Validation(#[from] FieldValidationError),

    /// The action is not defined for the task's process.
    #[error("action {action} is not defined for the process of task {task}")]
    InvalidAction {
        /// Targeted task.
        task: TaskId,
        /// Requested action.
        action: ActionId,
    },

    /// The user may not perform the operation.
    #[error("user {0} is not authorized for this operation")]
    Unauthorized(UserId),

    /// No transition leaves the task's state through the action.
    #[error("action {action} is not available in state {state}")]
    InvalidTransition {
        /// State the task was in.
        state: StateId,
        /// Requested action.
        action: ActionId,
    },

    /// Another request moved the task first.
    #[error("task {0} was modified concurrently")]
    ConcurrentModification(TaskId),

    /// The task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The task reached a terminal state and can no longer be edited.
    #[error("task {0} is finalized")]
    TaskFinalized(TaskId),

    /// Task storage failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),

    /// Permission storage failed.
    #[error(transparent)]
    Permissions(#[from] PermissionRepositoryError),

    /// Permission planning failed.
    #[error(transparent)]
    PermissionCache(#[from] PermissionCacheError),

    /// Process storage failed.
    #[error(transparent)]
    Processes(#[from] ProcessRepositoryError),

    /// Workflow storage failed.
    #[error(transparent)]
    Workflows(#[from] WorkflowRepositoryError),

    /// Directory lookup failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// Blob storage failed.
    #[error(transparent)]
    Blob(#[from] BlobStoreError),

    /// Label lookup failed.
    #[error(transparent)]
    Labels(#[from] LabelCatalogError),
}

impl From<SubmissionError> for TaskServiceError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::UnknownField(field) => Self::InvalidField(field),
            SubmissionError::Field(inner) => Self::Validation(inner),
        }
    }
}

/// Result type for task service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;
