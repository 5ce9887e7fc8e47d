//! In-memory task store holding tasks and their permission projection.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use crate::authorization::{
    domain::{PermissionKey, ReconcileOutcome, TaskPermission},
    ports::{PermissionRepository, PermissionRepositoryError, PermissionRepositoryResult},
};
use crate::directory::domain::UserId;
use crate::process::domain::{ActionId, FieldId, ProcessId};
use crate::task::{
    domain::{Task, TaskActionLog, TaskData, TaskDataHistory, TaskId, TaskTitle},
    ports::{
        FieldUpdate, TaskCreation, TaskRepository, TaskRepositoryError, TaskRepositoryResult,
        TransitionCommit,
    },
};

/// Thread-safe in-memory task store.
///
/// One lock guards tasks, data, history, logs and permission rows, so every
/// mutating call is atomic.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    titles: HashMap<TaskTitle, TaskId>,
    data: HashMap<(TaskId, FieldId), TaskData>,
    history: Vec<TaskDataHistory>,
    logs: Vec<TaskActionLog>,
    permissions: BTreeMap<PermissionKey, TaskPermission>,
}

impl InMemoryTaskStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn task_lock_error(err: impl std::fmt::Display) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

fn permission_lock_error(err: impl std::fmt::Display) -> PermissionRepositoryError {
    PermissionRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

impl InMemoryTaskState {
    fn insert_missing(&mut self, rows: &[TaskPermission]) -> usize {
        let mut inserted = 0;
        for row in rows {
            if !self.permissions.contains_key(&row.key()) {
                self.permissions.insert(row.key(), *row);
                inserted += 1;
            }
        }
        inserted
    }

    fn reconcile(&mut self, task: TaskId, desired: &[TaskPermission]) -> ReconcileOutcome {
        let wanted: BTreeMap<PermissionKey, TaskPermission> =
            desired.iter().map(|row| (row.key(), *row)).collect();
        let before = self.permissions.len();
        self.permissions
            .retain(|key, _| key.task_id != task || wanted.contains_key(key));
        let removed = before - self.permissions.len();
        let rows: Vec<TaskPermission> = wanted.into_values().collect();
        let inserted = self.insert_missing(&rows);
        ReconcileOutcome { inserted, removed }
    }

    fn rows_matching(&self, predicate: impl Fn(&PermissionKey) -> bool) -> Vec<TaskPermission> {
        self.permissions
            .iter()
            .filter(|(key, _)| predicate(key))
            .map(|(_, row)| *row)
            .collect()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskStore {
    async fn create(&self, creation: &TaskCreation) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(task_lock_error)?;
        let task = &creation.task;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        if state.titles.contains_key(task.title()) {
            return Err(TaskRepositoryError::DuplicateTitle(task.title().clone()));
        }

        state.titles.insert(task.title().clone(), task.id());
        state.tasks.insert(task.id(), task.clone());
        for data in &creation.data {
            state
                .data
                .insert((data.task_id(), data.field_id()), data.clone());
        }
        state.insert_missing(&creation.permissions);
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(task_lock_error)?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn count_titles_with_prefix(&self, prefix: &str) -> TaskRepositoryResult<usize> {
        let state = self.state.read().map_err(task_lock_error)?;
        Ok(state
            .titles
            .keys()
            .filter(|title| title.as_str().starts_with(prefix))
            .count())
    }

    async fn find_data(&self, task: TaskId) -> TaskRepositoryResult<Vec<TaskData>> {
        let state = self.state.read().map_err(task_lock_error)?;
        Ok(state
            .data
            .values()
            .filter(|data| data.task_id() == task)
            .cloned()
            .collect())
    }

    async fn find_history(
        &self,
        task: TaskId,
        field: FieldId,
    ) -> TaskRepositoryResult<Vec<TaskDataHistory>> {
        let state = self.state.read().map_err(task_lock_error)?;
        Ok(state
            .history
            .iter()
            .filter(|entry| entry.task_id() == task && entry.field_id() == field)
            .cloned()
            .collect())
    }

    async fn find_logs(&self, task: TaskId) -> TaskRepositoryResult<Vec<TaskActionLog>> {
        let state = self.state.read().map_err(task_lock_error)?;
        Ok(state
            .logs
            .iter()
            .filter(|log| log.task_id() == task)
            .cloned()
            .collect())
    }

    async fn commit_transition(&self, commit: &TransitionCommit) -> TaskRepositoryResult<Task> {
        let mut state = self.state.write().map_err(task_lock_error)?;
        let task = state
            .tasks
            .get_mut(&commit.task_id)
            .ok_or(TaskRepositoryError::NotFound(commit.task_id))?;
        if task.state_id() != commit.expected_state {
            return Err(TaskRepositoryError::ConcurrentModification {
                task_id: commit.task_id,
                expected: commit.expected_state,
            });
        }
        task.move_to(commit.next_state, commit.updated_at);
        let updated = task.clone();
        state.logs.push(commit.log.clone());
        Ok(updated)
    }

    async fn apply_field_update(
        &self,
        update: &FieldUpdate,
    ) -> TaskRepositoryResult<Option<ReconcileOutcome>> {
        let mut state = self.state.write().map_err(task_lock_error)?;
        let stored_state = state
            .tasks
            .get(&update.task_id)
            .map(Task::state_id)
            .ok_or(TaskRepositoryError::NotFound(update.task_id))?;
        if stored_state != update.expected_state {
            return Err(TaskRepositoryError::ConcurrentModification {
                task_id: update.task_id,
                expected: update.expected_state,
            });
        }
        let key = (update.task_id, update.field_id);
        if state.data.get(&key).map(TaskData::value) != update.expected_value.as_ref() {
            return Err(TaskRepositoryError::StaleFieldValue {
                task_id: update.task_id,
                field_id: update.field_id,
            });
        }

        let task = state
            .tasks
            .get_mut(&update.task_id)
            .ok_or(TaskRepositoryError::NotFound(update.task_id))?;
        task.touch_at(update.updated_at);

        if let Some(history) = update.history.as_ref() {
            state.history.push(history.clone());
        }
        state.data.remove(&key);
        if let Some(data) = update.value.as_ref() {
            state.data.insert(key, data.clone());
        }
        Ok(update
            .permissions
            .as_ref()
            .map(|rows| state.reconcile(update.task_id, rows)))
    }

    async fn list_created_by(&self, user: UserId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(task_lock_error)?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.created_by() == user)
            .cloned()
            .collect();
        tasks.sort_by(|left, right| {
            right
                .created_at()
                .cmp(&left.created_at())
                .then_with(|| right.title().cmp(left.title()))
        });
        Ok(tasks)
    }

    async fn list(&self, process: Option<ProcessId>) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(task_lock_error)?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| process.is_none_or(|id| task.process_id() == id))
            .cloned()
            .collect();
        tasks.sort_by(|left, right| {
            left.created_at()
                .cmp(&right.created_at())
                .then_with(|| left.title().cmp(right.title()))
        });
        Ok(tasks)
    }
}

#[async_trait]
impl PermissionRepository for InMemoryTaskStore {
    async fn insert_missing(&self, rows: &[TaskPermission]) -> PermissionRepositoryResult<usize> {
        let mut state = self.state.write().map_err(permission_lock_error)?;
        Ok(state.insert_missing(rows))
    }

    async fn exists(
        &self,
        task: TaskId,
        action: ActionId,
        user: UserId,
    ) -> PermissionRepositoryResult<bool> {
        let state = self.state.read().map_err(permission_lock_error)?;
        let key = PermissionKey {
            task_id: task,
            action_id: action,
            user_id: user,
        };
        Ok(state.permissions.contains_key(&key))
    }

    async fn find_for_action(
        &self,
        task: TaskId,
        action: ActionId,
    ) -> PermissionRepositoryResult<Vec<TaskPermission>> {
        let state = self.state.read().map_err(permission_lock_error)?;
        Ok(state.rows_matching(|key| key.task_id == task && key.action_id == action))
    }

    async fn find_for_task(&self, task: TaskId) -> PermissionRepositoryResult<Vec<TaskPermission>> {
        let state = self.state.read().map_err(permission_lock_error)?;
        Ok(state.rows_matching(|key| key.task_id == task))
    }

    async fn find_for_user(&self, user: UserId) -> PermissionRepositoryResult<Vec<TaskPermission>> {
        let state = self.state.read().map_err(permission_lock_error)?;
        Ok(state.rows_matching(|key| key.user_id == user))
    }

    async fn reconcile(
        &self,
        task: TaskId,
        desired: &[TaskPermission],
    ) -> PermissionRepositoryResult<ReconcileOutcome> {
        let mut state = self.state.write().map_err(permission_lock_error)?;
        if !state.tasks.contains_key(&task) {
            return Err(PermissionRepositoryError::TaskNotFound(task));
        }
        Ok(state.reconcile(task, desired))
    }
}
