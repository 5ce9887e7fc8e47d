//! Current field values of a task and their append-only history.

use super::TaskId;
use crate::directory::domain::UserId;
use crate::process::domain::{FieldId, FieldValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current value of one field on one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskData {
    task_id: TaskId,
    field_id: FieldId,
    value: FieldValue,
    updated_by: UserId,
    updated_at: DateTime<Utc>,
}

impl TaskData {
    /// Creates a field value record.
    #[must_use]
    pub const fn new(
        task_id: TaskId,
        field_id: FieldId,
        value: FieldValue,
        updated_by: UserId,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            task_id,
            field_id,
            value,
            updated_by,
            updated_at,
        }
    }

    /// Returns the owning task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the field.
    #[must_use]
    pub const fn field_id(&self) -> FieldId {
        self.field_id
    }

    /// Returns the normalized value.
    #[must_use]
    pub const fn value(&self) -> &FieldValue {
        &self.value
    }

    /// Returns the latest editor.
    #[must_use]
    pub const fn updated_by(&self) -> UserId {
        self.updated_by
    }

    /// Returns the latest edit timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Value a field held before an edit replaced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDataHistory {
    task_id: TaskId,
    field_id: FieldId,
    old_value: FieldValue,
    editor: UserId,
    recorded_at: DateTime<Utc>,
}

impl TaskDataHistory {
    /// Records that `editor` replaced `previous` at `recorded_at`.
    #[must_use]
    pub fn superseded(previous: &TaskData, editor: UserId, recorded_at: DateTime<Utc>) -> Self {
        Self {
            task_id: previous.task_id,
            field_id: previous.field_id,
            old_value: previous.value.clone(),
            editor,
            recorded_at,
        }
    }

    /// Reconstructs a history row from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedHistoryData) -> Self {
        Self {
            task_id: data.task_id,
            field_id: data.field_id,
            old_value: data.old_value,
            editor: data.editor,
            recorded_at: data.recorded_at,
        }
    }

    /// Returns the owning task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the field.
    #[must_use]
    pub const fn field_id(&self) -> FieldId {
        self.field_id
    }

    /// Returns the replaced value.
    #[must_use]
    pub const fn old_value(&self) -> &FieldValue {
        &self.old_value
    }

    /// Returns who made the edit.
    #[must_use]
    pub const fn editor(&self) -> UserId {
        self.editor
    }

    /// Returns when the edit happened.
    #[must_use]
    pub const fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

/// Parameter object for reconstructing a persisted history row.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedHistoryData {
    /// Persisted task reference.
    pub task_id: TaskId,
    /// Persisted field reference.
    pub field_id: FieldId,
    /// Persisted replaced value.
    pub old_value: FieldValue,
    /// Persisted editor.
    pub editor: UserId,
    /// Persisted edit timestamp.
    pub recorded_at: DateTime<Utc>,
}
