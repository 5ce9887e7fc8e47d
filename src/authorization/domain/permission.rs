//! Materialized permission rows.

use crate::directory::domain::UserId;
use crate::process::domain::{ActionId, RoleType};
use crate::task::domain::TaskId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of a permission row: one user may perform one action on one
/// task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PermissionKey {
    /// Task the permission applies to.
    pub task_id: TaskId,
    /// Permitted action.
    pub action_id: ActionId,
    /// Permitted user.
    pub user_id: UserId,
}

/// Precomputed grant allowing a user to perform an action on a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskPermission {
    key: PermissionKey,
    role_type: RoleType,
    granted_at: DateTime<Utc>,
}

impl TaskPermission {
    /// Creates a permission row.
    #[must_use]
    pub const fn new(key: PermissionKey, role_type: RoleType, granted_at: DateTime<Utc>) -> Self {
        Self {
            key,
            role_type,
            granted_at,
        }
    }

    /// Returns the row identity.
    #[must_use]
    pub const fn key(&self) -> PermissionKey {
        self.key
    }

    /// Returns the task the permission applies to.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.key.task_id
    }

    /// Returns the permitted action.
    #[must_use]
    pub const fn action_id(&self) -> ActionId {
        self.key.action_id
    }

    /// Returns the permitted user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.key.user_id
    }

    /// Returns the category of the rule that produced the row.
    #[must_use]
    pub const fn role_type(&self) -> RoleType {
        self.role_type
    }

    /// Returns when the row was materialized.
    #[must_use]
    pub const fn granted_at(&self) -> DateTime<Utc> {
        self.granted_at
    }
}

/// Row counts reported by a projection rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Rows added because the resolver now produces them.
    pub inserted: usize,
    /// Rows dropped because the resolver no longer produces them.
    pub removed: usize,
}

impl ReconcileOutcome {
    /// Returns whether the projection changed.
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.inserted > 0 || self.removed > 0
    }
}
