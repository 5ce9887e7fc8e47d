//! Diesel row models for the task store.

use super::schema::{task_action_logs, task_data, task_data_history, task_permissions, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query and insert row for task records.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Instantiated process.
    pub process_id: uuid::Uuid,
    /// Unique title.
    pub title: String,
    /// Creator.
    pub created_by: uuid::Uuid,
    /// Current workflow state.
    pub state_id: uuid::Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query and insert row for current field values.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_data)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskDataRow {
    /// Owning task.
    pub task_id: uuid::Uuid,
    /// Field.
    pub field_id: uuid::Uuid,
    /// Normalized value as JSON.
    pub value: Value,
    /// Latest editor.
    pub updated_by: uuid::Uuid,
    /// Latest edit timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query row for field history.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = task_data_history)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskDataHistoryRow {
    /// Insertion order.
    pub id: i64,
    /// Owning task.
    pub task_id: uuid::Uuid,
    /// Field.
    pub field_id: uuid::Uuid,
    /// Replaced value as JSON.
    pub old_value: Value,
    /// Editor.
    pub editor: uuid::Uuid,
    /// Edit timestamp.
    pub recorded_at: DateTime<Utc>,
}

/// Insert model for field history.
#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = task_data_history)]
pub struct NewTaskDataHistoryRow {
    /// Owning task.
    pub task_id: uuid::Uuid,
    /// Field.
    pub field_id: uuid::Uuid,
    /// Replaced value as JSON.
    pub old_value: Value,
    /// Editor.
    pub editor: uuid::Uuid,
    /// Edit timestamp.
    pub recorded_at: DateTime<Utc>,
}

/// Query and insert row for action log entries.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_action_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskActionLogRow {
    /// Entry identifier.
    pub id: uuid::Uuid,
    /// Owning task.
    pub task_id: uuid::Uuid,
    /// Actor.
    pub user_id: uuid::Uuid,
    /// Executed action.
    pub action_id: uuid::Uuid,
    /// Source state.
    pub from_state: uuid::Uuid,
    /// Target state.
    pub to_state: uuid::Uuid,
    /// Optional comment.
    pub comment: Option<String>,
    /// Optional attachment metadata as JSON.
    pub attachment: Option<Value>,
    /// Execution timestamp.
    pub created_at: DateTime<Utc>,
}

/// Query and insert row for permission projection entries.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_permissions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskPermissionRow {
    /// Task.
    pub task_id: uuid::Uuid,
    /// Permitted action.
    pub action_id: uuid::Uuid,
    /// Permitted user.
    pub user_id: uuid::Uuid,
    /// Category of the producing rule.
    pub role_type: String,
    /// Materialization timestamp.
    pub granted_at: DateTime<Utc>,
}
