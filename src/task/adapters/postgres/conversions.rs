//! Conversions between domain values and Diesel rows.

use super::models::{
    NewTaskDataHistoryRow, TaskActionLogRow, TaskDataHistoryRow, TaskDataRow, TaskPermissionRow,
    TaskRow,
};
use crate::authorization::domain::{PermissionKey, TaskPermission};
use crate::directory::domain::UserId;
use crate::process::domain::{ActionId, FieldId, FieldValue, FileRef, ParseRoleTypeError, ProcessId, RoleType};
use crate::task::domain::{
    ActionLogId, PersistedActionLogData, PersistedHistoryData, PersistedTaskData, Task,
    TaskActionLog, TaskData, TaskDataHistory, TaskId, TaskTitle,
};
use crate::workflow::domain::StateId;

pub(super) fn task_to_row(task: &Task) -> TaskRow {
    TaskRow {
        id: task.id().into_inner(),
        process_id: task.process_id().into_inner(),
        title: task.title().as_str().to_owned(),
        created_by: task.created_by().into_inner(),
        state_id: task.state_id().into_inner(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    }
}

pub(super) fn row_to_task(row: TaskRow) -> Task {
    Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        process_id: ProcessId::from_uuid(row.process_id),
        title: TaskTitle::from_persisted(row.title),
        created_by: UserId::from_uuid(row.created_by),
        state_id: StateId::from_uuid(row.state_id),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub(super) fn data_to_row(data: &TaskData) -> Result<TaskDataRow, serde_json::Error> {
    Ok(TaskDataRow {
        task_id: data.task_id().into_inner(),
        field_id: data.field_id().into_inner(),
        value: serde_json::to_value(data.value())?,
        updated_by: data.updated_by().into_inner(),
        updated_at: data.updated_at(),
    })
}

pub(super) fn row_to_data(row: TaskDataRow) -> Result<TaskData, serde_json::Error> {
    let value = serde_json::from_value::<FieldValue>(row.value)?;
    Ok(TaskData::new(
        TaskId::from_uuid(row.task_id),
        FieldId::from_uuid(row.field_id),
        value,
        UserId::from_uuid(row.updated_by),
        row.updated_at,
    ))
}

pub(super) fn history_to_row(
    history: &TaskDataHistory,
) -> Result<NewTaskDataHistoryRow, serde_json::Error> {
    Ok(NewTaskDataHistoryRow {
        task_id: history.task_id().into_inner(),
        field_id: history.field_id().into_inner(),
        old_value: serde_json::to_value(history.old_value())?,
        editor: history.editor().into_inner(),
        recorded_at: history.recorded_at(),
    })
}

pub(super) fn row_to_history(row: TaskDataHistoryRow) -> Result<TaskDataHistory, serde_json::Error> {
    let old_value = serde_json::from_value::<FieldValue>(row.old_value)?;
    Ok(TaskDataHistory::from_persisted(PersistedHistoryData {
        task_id: TaskId::from_uuid(row.task_id),
        field_id: FieldId::from_uuid(row.field_id),
        old_value,
        editor: UserId::from_uuid(row.editor),
        recorded_at: row.recorded_at,
    }))
}

pub(super) fn log_to_row(log: &TaskActionLog) -> Result<TaskActionLogRow, serde_json::Error> {
    let attachment = log.attachment().map(serde_json::to_value).transpose()?;
    Ok(TaskActionLogRow {
        id: log.id().into_inner(),
        task_id: log.task_id().into_inner(),
        user_id: log.user_id().into_inner(),
        action_id: log.action_id().into_inner(),
        from_state: log.from_state().into_inner(),
        to_state: log.to_state().into_inner(),
        comment: log.comment().map(str::to_owned),
        attachment,
        created_at: log.created_at(),
    })
}

pub(super) fn row_to_log(row: TaskActionLogRow) -> Result<TaskActionLog, serde_json::Error> {
    let attachment = row
        .attachment
        .map(serde_json::from_value::<FileRef>)
        .transpose()?;
    Ok(TaskActionLog::from_persisted(PersistedActionLogData {
        id: ActionLogId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        user_id: UserId::from_uuid(row.user_id),
        action_id: ActionId::from_uuid(row.action_id),
        from_state: StateId::from_uuid(row.from_state),
        to_state: StateId::from_uuid(row.to_state),
        comment: row.comment,
        attachment,
        created_at: row.created_at,
    }))
}

pub(super) fn permission_to_row(permission: &TaskPermission) -> TaskPermissionRow {
    TaskPermissionRow {
        task_id: permission.task_id().into_inner(),
        action_id: permission.action_id().into_inner(),
        user_id: permission.user_id().into_inner(),
        role_type: permission.role_type().as_str().to_owned(),
        granted_at: permission.granted_at(),
    }
}

pub(super) fn row_to_permission(
    row: TaskPermissionRow,
) -> Result<TaskPermission, ParseRoleTypeError> {
    let role_type = RoleType::try_from(row.role_type.as_str())?;
    let key = PermissionKey {
        task_id: TaskId::from_uuid(row.task_id),
        action_id: ActionId::from_uuid(row.action_id),
        user_id: UserId::from_uuid(row.user_id),
    };
    Ok(TaskPermission::new(key, role_type, row.granted_at))
}
