//! `PostgreSQL` task store covering tasks and their permission projection.

use super::{
    conversions::{
        data_to_row, history_to_row, log_to_row, permission_to_row, row_to_data, row_to_history,
        row_to_log, row_to_permission, row_to_task, task_to_row,
    },
    models::{TaskActionLogRow, TaskDataHistoryRow, TaskDataRow, TaskPermissionRow, TaskRow},
    schema::{task_action_logs, task_data, task_data_history, task_permissions, tasks},
};
use crate::authorization::{
    domain::{ReconcileOutcome, TaskPermission},
    ports::{PermissionRepository, PermissionRepositoryError, PermissionRepositoryResult},
};
use crate::directory::domain::UserId;
use crate::process::domain::{ActionId, FieldId, FieldValue, ProcessId};
use crate::task::{
    domain::{Task, TaskActionLog, TaskData, TaskDataHistory, TaskId, TaskTitle},
    ports::{
        FieldUpdate, TaskCreation, TaskRepository, TaskRepositoryError, TaskRepositoryResult,
        TransitionCommit,
    },
};
use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use diesel::upsert::excluded;
use std::collections::BTreeSet;

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

const TITLE_UNIQUE_CONSTRAINT: &str = "tasks_title_unique";

/// `PostgreSQL`-backed task store.
///
/// Implements both [`TaskRepository`] and [`PermissionRepository`] so that
/// task writes and their permission rows share one transaction.
#[derive(Debug, Clone)]
pub struct PostgresTaskStore {
    pool: TaskPgPool,
}

/// Error types a blocking store call can report pool and join failures as.
trait StoreFailure: Sized {
    fn from_failure(err: impl std::error::Error + Send + Sync + 'static) -> Self;
}

impl StoreFailure for TaskRepositoryError {
    fn from_failure(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::persistence(err)
    }
}

impl StoreFailure for PermissionRepositoryError {
    fn from_failure(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::persistence(err)
    }
}

impl From<DieselError> for TaskRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

impl From<DieselError> for PermissionRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

impl PostgresTaskStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut PgConnection) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: StoreFailure + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(E::from_failure)?;
            f(&mut connection)
        })
        .await
        .map_err(E::from_failure)?
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskStore {
    async fn create(&self, creation: &TaskCreation) -> TaskRepositoryResult<()> {
        let task_id = creation.task.id();
        let title = creation.task.title().clone();
        let task_row = task_to_row(&creation.task);
        let data_rows = creation
            .data
            .iter()
            .map(data_to_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(TaskRepositoryError::persistence)?;
        let permission_rows: Vec<TaskPermissionRow> =
            creation.permissions.iter().map(permission_to_row).collect();

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                diesel::insert_into(tasks::table)
                    .values(&task_row)
                    .execute(tx)
                    .map_err(|err| map_task_insert_error(err, task_id, &title))?;
                if !data_rows.is_empty() {
                    diesel::insert_into(task_data::table)
                        .values(&data_rows)
                        .execute(tx)?;
                }
                insert_permission_rows(tx, &permission_rows)?;
                Ok(())
            })
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            Ok(row.map(row_to_task))
        })
        .await
    }

    async fn count_titles_with_prefix(&self, prefix: &str) -> TaskRepositoryResult<usize> {
        let pattern = format!("{}%", escape_like(prefix));
        self.run_blocking(move |connection| {
            let count = tasks::table
                .filter(tasks::title.like(pattern))
                .count()
                .get_result::<i64>(connection)?;
            usize::try_from(count).map_err(TaskRepositoryError::persistence)
        })
        .await
    }

    async fn find_data(&self, task: TaskId) -> TaskRepositoryResult<Vec<TaskData>> {
        self.run_blocking(move |connection| {
            let rows = task_data::table
                .filter(task_data::task_id.eq(task.into_inner()))
                .select(TaskDataRow::as_select())
                .load::<TaskDataRow>(connection)?;
            rows.into_iter()
                .map(row_to_data)
                .collect::<Result<Vec<_>, _>>()
                .map_err(TaskRepositoryError::persistence)
        })
        .await
    }

    async fn find_history(
        &self,
        task: TaskId,
        field: FieldId,
    ) -> TaskRepositoryResult<Vec<TaskDataHistory>> {
        self.run_blocking(move |connection| {
            let rows = task_data_history::table
                .filter(task_data_history::task_id.eq(task.into_inner()))
                .filter(task_data_history::field_id.eq(field.into_inner()))
                .order(task_data_history::id.asc())
                .select(TaskDataHistoryRow::as_select())
                .load::<TaskDataHistoryRow>(connection)?;
            rows.into_iter()
                .map(row_to_history)
                .collect::<Result<Vec<_>, _>>()
                .map_err(TaskRepositoryError::persistence)
        })
        .await
    }

    async fn find_logs(&self, task: TaskId) -> TaskRepositoryResult<Vec<TaskActionLog>> {
        self.run_blocking(move |connection| {
            let rows = task_action_logs::table
                .filter(task_action_logs::task_id.eq(task.into_inner()))
                .order(task_action_logs::seq.asc())
                .select(TaskActionLogRow::as_select())
                .load::<TaskActionLogRow>(connection)?;
            rows.into_iter()
                .map(row_to_log)
                .collect::<Result<Vec<_>, _>>()
                .map_err(TaskRepositoryError::persistence)
        })
        .await
    }

    async fn commit_transition(&self, commit: &TransitionCommit) -> TaskRepositoryResult<Task> {
        let task_id = commit.task_id;
        let expected = commit.expected_state;
        let next = commit.next_state;
        let updated_at = commit.updated_at;
        let log_row = log_to_row(&commit.log).map_err(TaskRepositoryError::persistence)?;

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                let updated = diesel::update(
                    tasks::table
                        .filter(tasks::id.eq(task_id.into_inner()))
                        .filter(tasks::state_id.eq(expected.into_inner())),
                )
                .set((
                    tasks::state_id.eq(next.into_inner()),
                    tasks::updated_at.eq(updated_at),
                ))
                .returning(TaskRow::as_returning())
                .get_result::<TaskRow>(tx)
                .optional()?;

                let Some(row) = updated else {
                    return Err(if task_exists(tx, task_id)? {
                        TaskRepositoryError::ConcurrentModification { task_id, expected }
                    } else {
                        TaskRepositoryError::NotFound(task_id)
                    });
                };

                diesel::insert_into(task_action_logs::table)
                    .values(&log_row)
                    .execute(tx)?;
                Ok(row_to_task(row))
            })
        })
        .await
    }

    async fn apply_field_update(
        &self,
        update: &FieldUpdate,
    ) -> TaskRepositoryResult<Option<ReconcileOutcome>> {
        let task_id = update.task_id;
        let field_id = update.field_id;
        let expected_state = update.expected_state;
        let expected_value = update.expected_value.clone();
        let updated_at = update.updated_at;
        let value_row = update
            .value
            .as_ref()
            .map(data_to_row)
            .transpose()
            .map_err(TaskRepositoryError::persistence)?;
        let history_row = update
            .history
            .as_ref()
            .map(history_to_row)
            .transpose()
            .map_err(TaskRepositoryError::persistence)?;
        let permission_rows: Option<Vec<TaskPermissionRow>> = update
            .permissions
            .as_ref()
            .map(|rows| rows.iter().map(permission_to_row).collect());

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                let touched = diesel::update(
                    tasks::table
                        .filter(tasks::id.eq(task_id.into_inner()))
                        .filter(tasks::state_id.eq(expected_state.into_inner())),
                )
                .set(tasks::updated_at.eq(updated_at))
                .execute(tx)?;
                if touched == 0 {
                    return Err(if task_exists(tx, task_id)? {
                        TaskRepositoryError::ConcurrentModification {
                            task_id,
                            expected: expected_state,
                        }
                    } else {
                        TaskRepositoryError::NotFound(task_id)
                    });
                }
                if locked_field_value(tx, task_id, field_id)? != expected_value {
                    return Err(TaskRepositoryError::StaleFieldValue { task_id, field_id });
                }

                if let Some(history) = history_row.as_ref() {
                    diesel::insert_into(task_data_history::table)
                        .values(history)
                        .execute(tx)?;
                }

                match value_row.as_ref() {
                    Some(row) => {
                        diesel::insert_into(task_data::table)
                            .values(row)
                            .on_conflict((task_data::task_id, task_data::field_id))
                            .do_update()
                            .set((
                                task_data::value.eq(excluded(task_data::value)),
                                task_data::updated_by.eq(excluded(task_data::updated_by)),
                                task_data::updated_at.eq(excluded(task_data::updated_at)),
                            ))
                            .execute(tx)?;
                    }
                    None => {
                        diesel::delete(
                            task_data::table
                                .filter(task_data::task_id.eq(task_id.into_inner()))
                                .filter(task_data::field_id.eq(field_id.into_inner())),
                        )
                        .execute(tx)?;
                    }
                }

                let outcome = permission_rows
                    .as_deref()
                    .map(|rows| reconcile_rows(tx, task_id, rows))
                    .transpose()?;
                Ok(outcome)
            })
        })
        .await
    }

    async fn list_created_by(&self, user: UserId) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::created_by.eq(user.into_inner()))
                .order((tasks::created_at.desc(), tasks::title.desc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            Ok(rows.into_iter().map(row_to_task).collect())
        })
        .await
    }

    async fn list(&self, process: Option<ProcessId>) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let mut query = tasks::table.select(TaskRow::as_select()).into_boxed();
            if let Some(process_id) = process {
                query = query.filter(tasks::process_id.eq(process_id.into_inner()));
            }
            let rows = query
                .order((tasks::created_at.asc(), tasks::title.asc()))
                .load::<TaskRow>(connection)?;
            Ok(rows.into_iter().map(row_to_task).collect())
        })
        .await
    }
}

#[async_trait]
impl PermissionRepository for PostgresTaskStore {
    async fn insert_missing(&self, rows: &[TaskPermission]) -> PermissionRepositoryResult<usize> {
        let permission_rows: Vec<TaskPermissionRow> = rows.iter().map(permission_to_row).collect();
        self.run_blocking(move |connection| {
            insert_permission_rows(connection, &permission_rows)
                .map_err(PermissionRepositoryError::from)
        })
        .await
    }

    async fn exists(
        &self,
        task: TaskId,
        action: ActionId,
        user: UserId,
    ) -> PermissionRepositoryResult<bool> {
        self.run_blocking(move |connection| {
            let found = diesel::select(exists(
                task_permissions::table
                    .filter(task_permissions::task_id.eq(task.into_inner()))
                    .filter(task_permissions::action_id.eq(action.into_inner()))
                    .filter(task_permissions::user_id.eq(user.into_inner())),
            ))
            .get_result::<bool>(connection)?;
            Ok(found)
        })
        .await
    }

    async fn find_for_action(
        &self,
        task: TaskId,
        action: ActionId,
    ) -> PermissionRepositoryResult<Vec<TaskPermission>> {
        self.run_blocking(move |connection| {
            let rows = task_permissions::table
                .filter(task_permissions::task_id.eq(task.into_inner()))
                .filter(task_permissions::action_id.eq(action.into_inner()))
                .select(TaskPermissionRow::as_select())
                .load::<TaskPermissionRow>(connection)?;
            rows_to_permissions(rows)
        })
        .await
    }

    async fn find_for_task(&self, task: TaskId) -> PermissionRepositoryResult<Vec<TaskPermission>> {
        self.run_blocking(move |connection| {
            let rows = task_permissions::table
                .filter(task_permissions::task_id.eq(task.into_inner()))
                .select(TaskPermissionRow::as_select())
                .load::<TaskPermissionRow>(connection)?;
            rows_to_permissions(rows)
        })
        .await
    }

    async fn find_for_user(&self, user: UserId) -> PermissionRepositoryResult<Vec<TaskPermission>> {
        self.run_blocking(move |connection| {
            let rows = task_permissions::table
                .filter(task_permissions::user_id.eq(user.into_inner()))
                .select(TaskPermissionRow::as_select())
                .load::<TaskPermissionRow>(connection)?;
            rows_to_permissions(rows)
        })
        .await
    }

    async fn reconcile(
        &self,
        task: TaskId,
        desired: &[TaskPermission],
    ) -> PermissionRepositoryResult<ReconcileOutcome> {
        let permission_rows: Vec<TaskPermissionRow> =
            desired.iter().map(permission_to_row).collect();
        self.run_blocking(move |connection| {
            connection.transaction::<_, PermissionRepositoryError, _>(|tx| {
                if !task_exists(tx, task)? {
                    return Err(PermissionRepositoryError::TaskNotFound(task));
                }
                reconcile_rows(tx, task, &permission_rows).map_err(PermissionRepositoryError::from)
            })
        })
        .await
    }
}

fn map_task_insert_error(err: DieselError, task_id: TaskId, title: &TaskTitle) -> TaskRepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
            if is_title_unique_violation(info.as_ref()) =>
        {
            TaskRepositoryError::DuplicateTitle(title.clone())
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            TaskRepositoryError::DuplicateTask(task_id)
        }
        _ => TaskRepositoryError::persistence(err),
    }
}

fn is_title_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == TITLE_UNIQUE_CONSTRAINT)
}

/// Escapes `LIKE` metacharacters so a prefix matches literally.
pub(super) fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn task_exists(connection: &mut PgConnection, task: TaskId) -> Result<bool, DieselError> {
    diesel::select(exists(tasks::table.filter(tasks::id.eq(task.into_inner()))))
        .get_result::<bool>(connection)
}

/// Reads a field value under a row lock.
///
/// The caller already holds the task row lock, so an absent row cannot be
/// inserted concurrently either.
fn locked_field_value(
    connection: &mut PgConnection,
    task: TaskId,
    field: FieldId,
) -> TaskRepositoryResult<Option<FieldValue>> {
    let raw = task_data::table
        .filter(task_data::task_id.eq(task.into_inner()))
        .filter(task_data::field_id.eq(field.into_inner()))
        .select(task_data::value)
        .for_update()
        .first::<serde_json::Value>(connection)
        .optional()?;
    raw.map(serde_json::from_value::<FieldValue>)
        .transpose()
        .map_err(TaskRepositoryError::persistence)
}

fn insert_permission_rows(
    connection: &mut PgConnection,
    rows: &[TaskPermissionRow],
) -> Result<usize, DieselError> {
    if rows.is_empty() {
        return Ok(0);
    }
    diesel::insert_into(task_permissions::table)
        .values(rows)
        .on_conflict_do_nothing()
        .execute(connection)
}

fn reconcile_rows(
    connection: &mut PgConnection,
    task: TaskId,
    desired: &[TaskPermissionRow],
) -> Result<ReconcileOutcome, DieselError> {
    let task_uuid = task.into_inner();
    let existing = task_permissions::table
        .filter(task_permissions::task_id.eq(task_uuid))
        .select((task_permissions::action_id, task_permissions::user_id))
        .load::<(uuid::Uuid, uuid::Uuid)>(connection)?;
    let wanted: BTreeSet<(uuid::Uuid, uuid::Uuid)> = desired
        .iter()
        .map(|row| (row.action_id, row.user_id))
        .collect();

    let mut removed = 0;
    for (action_id, user_id) in existing.into_iter().filter(|pair| !wanted.contains(pair)) {
        removed += diesel::delete(
            task_permissions::table
                .filter(task_permissions::task_id.eq(task_uuid))
                .filter(task_permissions::action_id.eq(action_id))
                .filter(task_permissions::user_id.eq(user_id)),
        )
        .execute(connection)?;
    }
    let inserted = insert_permission_rows(connection, desired)?;
    Ok(ReconcileOutcome { inserted, removed })
}

fn rows_to_permissions(
    rows: Vec<TaskPermissionRow>,
) -> PermissionRepositoryResult<Vec<TaskPermission>> {
    rows.into_iter()
        .map(row_to_permission)
        .collect::<Result<Vec<_>, _>>()
        .map_err(PermissionRepositoryError::persistence)
}
