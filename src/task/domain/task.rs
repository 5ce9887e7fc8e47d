//! Task aggregate root.

use super::{TaskId, TaskTitle};
use crate::directory::domain::UserId;
use crate::process::domain::ProcessId;
use crate::workflow::domain::StateId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Running instance of a process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    process_id: ProcessId,
    title: TaskTitle,
    created_by: UserId,
    state_id: StateId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted process reference.
    pub process_id: ProcessId,
    /// Persisted title.
    pub title: TaskTitle,
    /// Persisted creator.
    pub created_by: UserId,
    /// Persisted current state.
    pub state_id: StateId,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a task placed in its initial state.
    #[must_use]
    pub fn new(
        process_id: ProcessId,
        title: TaskTitle,
        created_by: UserId,
        initial_state: StateId,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            process_id,
            title,
            created_by,
            state_id: initial_state,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            process_id: data.process_id,
            title: data.title,
            created_by: data.created_by,
            state_id: data.state_id,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the instantiated process.
    #[must_use]
    pub const fn process_id(&self) -> ProcessId {
        self.process_id
    }

    /// Returns the unique title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the creator.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state_id(&self) -> StateId {
        self.state_id
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Moves the task to `next`; only stores call this, after their
    /// compare-and-swap succeeded.
    pub(crate) const fn move_to(&mut self, next: StateId, at: DateTime<Utc>) {
        self.state_id = next;
        self.updated_at = at;
    }

    pub(crate) const fn touch_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}
