//! In-memory organization directory for tests and embedded deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::directory::{
    domain::{Department, DepartmentId, DirectoryUser, Role, RoleId, UserId},
    ports::{DirectoryError, DirectoryResult, OrgDirectory},
};

/// Thread-safe in-memory directory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrgDirectory {
    state: Arc<RwLock<InMemoryDirectoryState>>,
}

#[derive(Debug, Default)]
struct InMemoryDirectoryState {
    users: HashMap<UserId, DirectoryUser>,
    roles: HashMap<RoleId, Role>,
    departments: HashMap<DepartmentId, Department>,
}

fn lock_error(err: impl std::fmt::Display) -> DirectoryError {
    DirectoryError::persistence(std::io::Error::other(err.to_string()))
}

/// Sorts users by username so lookups are deterministic.
fn sorted_by_username(mut users: Vec<DirectoryUser>) -> Vec<DirectoryUser> {
    users.sort_by(|left, right| {
        left.username()
            .cmp(right.username())
            .then_with(|| left.id().cmp(&right.id()))
    });
    users
}

impl InMemoryOrgDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::DuplicateUser`] when the identifier or the
    /// username is already taken.
    pub fn add_user(&self, user: DirectoryUser) -> DirectoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let taken = state.users.contains_key(&user.id())
            || state
                .users
                .values()
                .any(|existing| existing.username() == user.username());
        if taken {
            return Err(DirectoryError::DuplicateUser(user.username().to_owned()));
        }
        state.users.insert(user.id(), user);
        Ok(())
    }

    /// Replaces a registered user, for example after a department move.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Persistence`] when the lock is poisoned.
    pub fn replace_user(&self, user: DirectoryUser) -> DirectoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.users.insert(user.id(), user);
        Ok(())
    }

    /// Registers a role.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Persistence`] when the lock is poisoned.
    pub fn add_role(&self, role: Role) -> DirectoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.roles.insert(role.id(), role);
        Ok(())
    }

    /// Registers a department.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Persistence`] when the lock is poisoned.
    pub fn add_department(&self, department: Department) -> DirectoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.departments.insert(department.id(), department);
        Ok(())
    }
}

#[async_trait]
impl OrgDirectory for InMemoryOrgDirectory {
    async fn find_user(&self, id: UserId) -> DirectoryResult<Option<DirectoryUser>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.users.get(&id).cloned())
    }

    async fn find_role(&self, id: RoleId) -> DirectoryResult<Option<Role>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.roles.get(&id).cloned())
    }

    async fn find_department(&self, id: DepartmentId) -> DirectoryResult<Option<Department>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.departments.get(&id).cloned())
    }

    async fn active_users_with_role(&self, role: RoleId) -> DirectoryResult<Vec<DirectoryUser>> {
        let state = self.state.read().map_err(lock_error)?;
        let users = state
            .users
            .values()
            .filter(|user| user.is_active() && user.role() == Some(role))
            .cloned()
            .collect();
        Ok(sorted_by_username(users))
    }

    async fn active_users_in_department(
        &self,
        department: DepartmentId,
    ) -> DirectoryResult<Vec<DirectoryUser>> {
        let state = self.state.read().map_err(lock_error)?;
        let users = state
            .users
            .values()
            .filter(|user| user.is_active() && user.department() == Some(department))
            .cloned()
            .collect();
        Ok(sorted_by_username(users))
    }
}
