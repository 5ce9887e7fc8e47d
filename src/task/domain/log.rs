//! Append-only audit trail of executed actions.

use super::{ActionLogId, TaskId};
use crate::directory::domain::UserId;
use crate::process::domain::{ActionId, FileRef};
use crate::workflow::domain::{StateId, Transition};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// One executed action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskActionLog {
    id: ActionLogId,
    task_id: TaskId,
    user_id: UserId,
    action_id: ActionId,
    from_state: StateId,
    to_state: StateId,
    comment: Option<String>,
    attachment: Option<FileRef>,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedActionLogData {
    /// Persisted identifier.
    pub id: ActionLogId,
    /// Persisted task reference.
    pub task_id: TaskId,
    /// Persisted actor.
    pub user_id: UserId,
    /// Persisted action.
    pub action_id: ActionId,
    /// Persisted source state.
    pub from_state: StateId,
    /// Persisted target state.
    pub to_state: StateId,
    /// Persisted comment.
    pub comment: Option<String>,
    /// Persisted attachment.
    pub attachment: Option<FileRef>,
    /// Persisted timestamp.
    pub created_at: DateTime<Utc>,
}

impl TaskActionLog {
    /// Records `user` firing `transition` through `action`.
    ///
    /// Blank comments are dropped.
    #[must_use]
    pub fn record(
        task_id: TaskId,
        user_id: UserId,
        action_id: ActionId,
        transition: &Transition,
        comment: Option<String>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: ActionLogId::new(),
            task_id,
            user_id,
            action_id,
            from_state: transition.current_state(),
            to_state: transition.next_state(),
            comment: comment
                .map(|text| text.trim().to_owned())
                .filter(|text| !text.is_empty()),
            attachment: None,
            created_at: clock.utc(),
        }
    }

    /// Returns a copy carrying an attachment.
    #[must_use]
    pub fn with_attachment(mut self, attachment: FileRef) -> Self {
        self.attachment = Some(attachment);
        self
    }

    /// Reconstructs a log entry from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedActionLogData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            user_id: data.user_id,
            action_id: data.action_id,
            from_state: data.from_state,
            to_state: data.to_state,
            comment: data.comment,
            attachment: data.attachment,
            created_at: data.created_at,
        }
    }

    /// Returns the entry identifier.
    #[must_use]
    pub const fn id(&self) -> ActionLogId {
        self.id
    }

    /// Returns the task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the actor.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the executed action.
    #[must_use]
    pub const fn action_id(&self) -> ActionId {
        self.action_id
    }

    /// Returns the state the task left.
    #[must_use]
    pub const fn from_state(&self) -> StateId {
        self.from_state
    }

    /// Returns the state the task entered.
    #[must_use]
    pub const fn to_state(&self) -> StateId {
        self.to_state
    }

    /// Returns the optional comment.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Returns the optional attachment.
    #[must_use]
    pub const fn attachment(&self) -> Option<&FileRef> {
        self.attachment.as_ref()
    }

    /// Returns when the action was executed.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
