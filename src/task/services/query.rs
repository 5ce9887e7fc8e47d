//! Read models over tasks: inboxes, available actions and task detail.

use super::{TaskPorts, TaskServiceResult};
use crate::authorization::{domain::TaskPermission, ports::PermissionRepository};
use crate::directory::{domain::UserId, ports::OrgDirectory};
use crate::process::{
    domain::{Action, ActionId, FieldId, FieldValue, FileRef, ProcessDefinition},
    ports::ProcessRepository,
};
use crate::task::{
    domain::{Task, TaskActionLog, TaskDataHistory, TaskId},
    ports::{BlobStore, LabelCatalog, LabelSubject, TaskRepository},
};
use crate::workflow::{
    domain::{State, StateId, StateMachine},
    ports::WorkflowRepository,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Task created by a user, with who it waits on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentTask {
    /// The task.
    pub task: Task,
    /// Current state, when it is still registered.
    pub state: Option<State>,
    /// First user, by username, who may act on the task next.
    pub recipient: Option<UserId>,
}

/// Task waiting on a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedTask {
    /// The task.
    pub task: Task,
    /// Current state, when it is still registered.
    pub state: Option<State>,
    /// First action, by name, the user may perform.
    pub action: Action,
}

/// Stored file together with its download URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    /// File metadata.
    pub file: FileRef,
    /// Download URL.
    pub url: String,
}

/// Current value of one field plus everything it replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDetail {
    /// Field identifier.
    pub field_id: FieldId,
    /// Field name.
    pub name: String,
    /// Current value, `None` once the field has been cleared.
    pub value: Option<FieldValue>,
    /// Download links for FILE values.
    pub files: Vec<ResolvedFile>,
    /// Superseded values, oldest first.
    pub history: Vec<TaskDataHistory>,
}

/// Everything shown on a task page.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDetail {
    /// The task.
    pub task: Task,
    /// Localized state label, or the state name.
    pub state_label: String,
    /// Fields that hold a value or a history, in field order.
    pub fields: Vec<FieldDetail>,
    /// Action log, oldest first.
    pub log: Vec<TaskActionLog>,
    /// Actions the viewing user may perform now.
    pub available_actions: Vec<Action>,
}

/// Read-side queries over tasks.
pub struct TaskQueryService<P, W, D, S, B, L>
where
    P: ProcessRepository,
    W: WorkflowRepository,
    D: OrgDirectory,
    S: TaskRepository + PermissionRepository,
    B: BlobStore,
    L: LabelCatalog,
{
    ports: TaskPorts<P, W, D, S>,
    blobs: Arc<B>,
    labels: Arc<L>,
}

impl<P, W, D, S, B, L> TaskQueryService<P, W, D, S, B, L>
where
    P: ProcessRepository,
    W: WorkflowRepository,
    D: OrgDirectory,
    S: TaskRepository + PermissionRepository,
    B: BlobStore,
    L: LabelCatalog,
{
    /// Creates a query service.
    #[must_use]
    pub const fn new(ports: TaskPorts<P, W, D, S>, blobs: Arc<B>, labels: Arc<L>) -> Self {
        Self {
            ports,
            blobs,
            labels,
        }
    }

    /// Returns the tasks `user` created, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskServiceError`] when a lookup fails.
    pub async fn sent_by(&self, user: UserId) -> TaskServiceResult<Vec<SentTask>> {
        let tasks = self.ports.store.list_created_by(user).await?;
        let mut sent = Vec::with_capacity(tasks.len());
        for task in tasks {
            let machine = self.ports.load_machine(task.process_id()).await?;
            let waiting_on = self.next_actors(&task, &machine).await?;
            let recipient = self.first_by_username(waiting_on).await?;
            let state = self.ports.workflows.find_state(task.state_id()).await?;
            sent.push(SentTask {
                task,
                state,
                recipient,
            });
        }
        Ok(sent)
    }

    /// Returns the tasks `user` may act on in their current state, oldest
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskServiceError`] when a lookup fails.
    pub async fn received_by(&self, user: UserId) -> TaskServiceResult<Vec<ReceivedTask>> {
        let rows = self.ports.store.find_for_user(user).await?;
        let mut permitted: BTreeMap<TaskId, BTreeSet<_>> = BTreeMap::new();
        for row in &rows {
            permitted
                .entry(row.task_id())
                .or_default()
                .insert(row.action_id());
        }

        let mut received = Vec::new();
        for (task_id, actions) in permitted {
            let Some(task) = self.ports.store.find_by_id(task_id).await? else {
                continue;
            };
            let definition = self.ports.load_definition(task.process_id()).await?;
            let machine = self.ports.load_machine(task.process_id()).await?;
            let available = machine.actions_available(task.state_id());
            let first = sorted_actions(&definition, available.intersection(&actions).copied())
                .into_iter()
                .next();
            if let Some(action) = first {
                let state = self.ports.workflows.find_state(task.state_id()).await?;
                received.push(ReceivedTask {
                    task,
                    state,
                    action,
                });
            }
        }
        received.sort_by(|left, right| {
            left.task
                .created_at()
                .cmp(&right.task.created_at())
                .then_with(|| left.task.title().cmp(right.task.title()))
        });
        Ok(received)
    }

    /// Returns the actions `user` may perform on the task now, by name.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskServiceError::NotFound`] for unknown tasks.
    pub async fn available_actions(
        &self,
        user: UserId,
        task_id: TaskId,
    ) -> TaskServiceResult<Vec<Action>> {
        let task = self.ports.load_task(task_id).await?;
        let definition = self.ports.load_definition(task.process_id()).await?;
        let machine = self.ports.load_machine(task.process_id()).await?;
        self.actions_for(&task, &definition, &machine, user).await
    }

    /// Assembles the detail view of a task as seen by `viewer`.
    ///
    /// The state label is looked up in `locale` and falls back to the state
    /// name.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskServiceError::NotFound`] for unknown tasks and
    /// blob or label errors when links or labels cannot be produced.
    #[tracing::instrument(skip(self))]
    pub async fn detail(
        &self,
        task_id: TaskId,
        viewer: UserId,
        locale: &str,
    ) -> TaskServiceResult<TaskDetail> {
        let task = self.ports.load_task(task_id).await?;
        let definition = self.ports.load_definition(task.process_id()).await?;
        let machine = self.ports.load_machine(task.process_id()).await?;

        let state_label = self.state_label(task.state_id(), locale).await?;
        let fields = self.field_details(&task, &definition).await?;
        let log = self.ports.store.find_logs(task.id()).await?;
        let available_actions = self.actions_for(&task, &definition, &machine, viewer).await?;
        Ok(TaskDetail {
            task,
            state_label,
            fields,
            log,
            available_actions,
        })
    }

    async fn actions_for(
        &self,
        task: &Task,
        definition: &ProcessDefinition,
        machine: &StateMachine,
        user: UserId,
    ) -> TaskServiceResult<Vec<Action>> {
        let permitted: BTreeSet<_> = self
            .ports
            .store
            .find_for_task(task.id())
            .await?
            .iter()
            .filter(|row| row.user_id() == user)
            .map(TaskPermission::action_id)
            .collect();
        let available = machine.actions_available(task.state_id());
        Ok(sorted_actions(
            definition,
            available.intersection(&permitted).copied(),
        ))
    }

    async fn next_actors(
        &self,
        task: &Task,
        machine: &StateMachine,
    ) -> TaskServiceResult<BTreeSet<UserId>> {
        let available = machine.actions_available(task.state_id());
        Ok(self
            .ports
            .store
            .find_for_task(task.id())
            .await?
            .iter()
            .filter(|row| available.contains(&row.action_id()))
            .map(TaskPermission::user_id)
            .collect())
    }

    async fn first_by_username(
        &self,
        users: BTreeSet<UserId>,
    ) -> TaskServiceResult<Option<UserId>> {
        let mut first: Option<(String, UserId)> = None;
        for user in users {
            let Some(found) = self.ports.directory.find_user(user).await? else {
                continue;
            };
            if first
                .as_ref()
                .is_none_or(|(username, _)| found.username() < username.as_str())
            {
                first = Some((found.username().to_owned(), user));
            }
        }
        Ok(first.map(|(_, user)| user))
    }

    async fn state_label(&self, state: StateId, locale: &str) -> TaskServiceResult<String> {
        if let Some(label) = self.labels.label(LabelSubject::State(state), locale).await? {
            return Ok(label);
        }
        Ok(self
            .ports
            .workflows
            .find_state(state)
            .await?
            .map_or_else(|| state.to_string(), |found| found.name().to_owned()))
    }

    async fn field_details(
        &self,
        task: &Task,
        definition: &ProcessDefinition,
    ) -> TaskServiceResult<Vec<FieldDetail>> {
        let mut current: BTreeMap<FieldId, FieldValue> = self
            .ports
            .store
            .find_data(task.id())
            .await?
            .into_iter()
            .map(|data| (data.field_id(), data.value().clone()))
            .collect();

        let mut details = Vec::with_capacity(current.len());
        for field in definition.fields() {
            let value = current.remove(&field.id());
            let history = self.ports.store.find_history(task.id(), field.id()).await?;
            if value.is_none() && history.is_empty() {
                continue;
            }
            let stored_files = value.as_ref().map_or(&[][..], FieldValue::files);
            let mut files = Vec::with_capacity(stored_files.len());
            for file in stored_files {
                let url = self.blobs.resolve(file).await?;
                files.push(ResolvedFile {
                    file: file.clone(),
                    url,
                });
            }
            details.push(FieldDetail {
                field_id: field.id(),
                name: field.name().to_owned(),
                value,
                files,
                history,
            });
        }
        Ok(details)
    }
}

fn sorted_actions(
    definition: &ProcessDefinition,
    ids: impl Iterator<Item = ActionId>,
) -> Vec<Action> {
    let mut actions: Vec<Action> = ids
        .filter_map(|id| definition.action(id).cloned())
        .collect();
    actions.sort_by(|left, right| left.name().cmp(right.name()));
    actions
}
