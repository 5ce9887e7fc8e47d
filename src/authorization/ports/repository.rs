//! Repository port for materialized task permissions.

use crate::authorization::domain::{ReconcileOutcome, TaskPermission};
use crate::directory::domain::UserId;
use crate::process::domain::ActionId;
use crate::task::domain::TaskId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for permission repository operations.
pub type PermissionRepositoryResult<T> = Result<T, PermissionRepositoryError>;

/// Permission projection persistence contract.
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Inserts the rows whose key is not stored yet and leaves existing rows
    /// untouched.
    ///
    /// Returns the number of inserted rows.
    async fn insert_missing(&self, rows: &[TaskPermission]) -> PermissionRepositoryResult<usize>;

    /// Returns whether `user` holds a row for `action` on `task`.
    async fn exists(
        &self,
        task: TaskId,
        action: ActionId,
        user: UserId,
    ) -> PermissionRepositoryResult<bool>;

    /// Returns the rows for one action of a task.
    async fn find_for_action(
        &self,
        task: TaskId,
        action: ActionId,
    ) -> PermissionRepositoryResult<Vec<TaskPermission>>;

    /// Returns every row of a task.
    async fn find_for_task(&self, task: TaskId) -> PermissionRepositoryResult<Vec<TaskPermission>>;

    /// Returns every row granted to a user.
    async fn find_for_user(&self, user: UserId) -> PermissionRepositoryResult<Vec<TaskPermission>>;

    /// Atomically replaces the rows of `task` with `desired`.
    ///
    /// Rows present in both keep their original grant timestamp.
    async fn reconcile(
        &self,
        task: TaskId,
        desired: &[TaskPermission],
    ) -> PermissionRepositoryResult<ReconcileOutcome>;
}

/// Errors returned by permission repository implementations.
#[derive(Debug, Clone, Error)]
pub enum PermissionRepositoryError {
    /// The task the rows belong to does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl PermissionRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
