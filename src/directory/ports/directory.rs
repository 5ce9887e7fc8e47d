//! Read-only lookup port over the organization directory.

use crate::directory::domain::{Department, DepartmentId, DirectoryUser, Role, RoleId, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for directory lookups.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Organization directory contract.
#[async_trait]
pub trait OrgDirectory: Send + Sync {
    /// Finds a user by identifier, active or not.
    ///
    /// Returns `None` when the user does not exist.
    async fn find_user(&self, id: UserId) -> DirectoryResult<Option<DirectoryUser>>;

    /// Finds a role by identifier.
    ///
    /// Returns `None` when the role does not exist.
    async fn find_role(&self, id: RoleId) -> DirectoryResult<Option<Role>>;

    /// Finds a department by identifier.
    ///
    /// Returns `None` when the department does not exist.
    async fn find_department(&self, id: DepartmentId) -> DirectoryResult<Option<Department>>;

    /// Returns every active user holding `role`.
    async fn active_users_with_role(&self, role: RoleId) -> DirectoryResult<Vec<DirectoryUser>>;

    /// Returns every active user placed in `department`.
    async fn active_users_in_department(
        &self,
        department: DepartmentId,
    ) -> DirectoryResult<Vec<DirectoryUser>>;
}

/// Errors returned by directory implementations.
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    /// A user with the same identifier or username is already registered.
    #[error("duplicate directory user: {0}")]
    DuplicateUser(String),

    /// Directory backend failure.
    #[error("directory error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl DirectoryError {
    /// Wraps a backend error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
