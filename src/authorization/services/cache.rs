//! Materialized permission projection per task.

use super::PermissionResolver;
use crate::authorization::{
    domain::{PermissionKey, ReconcileOutcome, TaskContext, TaskPermission},
    ports::{PermissionRepository, PermissionRepositoryError},
};
use crate::directory::{
    domain::UserId,
    ports::{DirectoryError, OrgDirectory},
};
use crate::process::domain::{ActionId, ProcessDefinition, RoleType};
use crate::task::domain::TaskId;
use mockable::Clock;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Service-level errors for the permission projection.
#[derive(Debug, Error)]
pub enum PermissionCacheError {
    /// Directory lookup failed during resolution.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    /// Projection storage failed.
    #[error(transparent)]
    Repository(#[from] PermissionRepositoryError),
}

/// Result type for permission projection operations.
pub type PermissionCacheResult<T> = Result<T, PermissionCacheError>;

/// Plans, stores and queries the permission projection.
#[derive(Clone)]
pub struct PermissionCacheService<R, D, C>
where
    R: PermissionRepository,
    D: OrgDirectory,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    resolver: PermissionResolver<D>,
    clock: Arc<C>,
}

impl<R, D, C> PermissionCacheService<R, D, C>
where
    R: PermissionRepository,
    D: OrgDirectory,
    C: Clock + Send + Sync,
{
    /// Creates a projection service.
    #[must_use]
    pub const fn new(repository: Arc<R>, resolver: PermissionResolver<D>, clock: Arc<C>) -> Self {
        Self {
            repository,
            resolver,
            clock,
        }
    }

    /// Returns the resolver backing this projection.
    #[must_use]
    pub const fn resolver(&self) -> &PermissionResolver<D> {
        &self.resolver
    }

    /// Computes the rows the task should carry.
    ///
    /// Every action governed by at least one role rule yields one row per
    /// admitted user. A user admitted through several rules is recorded
    /// under the lowest [`RoleType`].
    ///
    /// # Errors
    ///
    /// Returns [`PermissionCacheError::Directory`] when resolution fails.
    pub async fn plan(
        &self,
        context: &TaskContext,
        definition: &ProcessDefinition,
    ) -> PermissionCacheResult<Vec<TaskPermission>> {
        let granted_at = self.clock.utc();
        let mut rows = Vec::new();
        for action in definition.governed_actions() {
            let resolved = self
                .resolver
                .resolve_for_action(context, definition, action)
                .await?;
            let mut lowest: BTreeMap<UserId, RoleType> = BTreeMap::new();
            for (user, role_type) in resolved {
                lowest
                    .entry(user)
                    .and_modify(|current| *current = (*current).min(role_type))
                    .or_insert(role_type);
            }
            rows.extend(lowest.into_iter().map(|(user_id, role_type)| {
                let key = PermissionKey {
                    task_id: context.task_id,
                    action_id: action,
                    user_id,
                };
                TaskPermission::new(key, role_type, granted_at)
            }));
        }
        Ok(rows)
    }

    /// Stores the planned rows, skipping rows that already exist.
    ///
    /// Running it twice is harmless, which makes it suitable for repairing a
    /// projection after rule changes.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionCacheError`] when resolution or storage fails.
    #[tracing::instrument(skip(self, context, definition), fields(task_id = %context.task_id))]
    pub async fn materialize(
        &self,
        context: &TaskContext,
        definition: &ProcessDefinition,
    ) -> PermissionCacheResult<usize> {
        let rows = self.plan(context, definition).await?;
        let inserted = self.repository.insert_missing(&rows).await?;
        info!(inserted, planned = rows.len(), "permissions materialized");
        Ok(inserted)
    }

    /// Returns whether `user` may perform `action` on `task`.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionCacheError::Repository`] when the lookup fails.
    pub async fn can_act(
        &self,
        user: UserId,
        task: TaskId,
        action: ActionId,
    ) -> PermissionCacheResult<bool> {
        Ok(self.repository.exists(task, action, user).await?)
    }

    /// Returns the users who may perform `action` on `task`.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionCacheError::Repository`] when the lookup fails.
    pub async fn eligible_users(
        &self,
        task: TaskId,
        action: ActionId,
    ) -> PermissionCacheResult<BTreeSet<UserId>> {
        let rows = self.repository.find_for_action(task, action).await?;
        Ok(rows.iter().map(TaskPermission::user_id).collect())
    }

    /// Rebuilds the rows of a task from the resolver.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionCacheError`] when resolution or storage fails.
    #[tracing::instrument(skip(self, context, definition), fields(task_id = %context.task_id))]
    pub async fn reconcile(
        &self,
        context: &TaskContext,
        definition: &ProcessDefinition,
    ) -> PermissionCacheResult<ReconcileOutcome> {
        let rows = self.plan(context, definition).await?;
        let outcome = self.repository.reconcile(context.task_id, &rows).await?;
        if outcome.changed() {
            info!(
                inserted = outcome.inserted,
                removed = outcome.removed,
                "permissions reconciled"
            );
        }
        Ok(outcome)
    }
}
