//! Executes workflow actions on tasks.

use super::{TaskPorts, TaskServiceError, TaskServiceResult};
use crate::authorization::{ports::PermissionRepository, services::PermissionCacheService};
use crate::config::EngineConfig;
use crate::directory::{domain::UserId, ports::OrgDirectory};
use crate::process::{
    domain::{ActionId, FileRef},
    ports::ProcessRepository,
};
use crate::task::{
    domain::{Task, TaskActionLog, TaskId},
    ports::{NotificationDispatcher, TaskRepository, TaskRepositoryError, TransitionCommit},
};
use crate::workflow::{domain::StateMachine, ports::WorkflowRepository};
use mockable::Clock;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Authorizes, validates and applies workflow actions.
///
/// A state change and its log entry are committed together, conditioned on
/// the task still being in the state the request was checked against.
/// Notification happens after the commit and never fails the request.
pub struct TaskActionExecutor<P, W, D, S, N, C>
where
    P: ProcessRepository,
    W: WorkflowRepository,
    D: OrgDirectory,
    S: TaskRepository + PermissionRepository,
    N: NotificationDispatcher,
    C: Clock + Send + Sync,
{
    ports: TaskPorts<P, W, D, S>,
    notifier: Arc<N>,
    permissions: PermissionCacheService<S, D, C>,
    clock: Arc<C>,
}

impl<P, W, D, S, N, C> TaskActionExecutor<P, W, D, S, N, C>
where
    P: ProcessRepository,
    W: WorkflowRepository,
    D: OrgDirectory,
    S: TaskRepository + PermissionRepository,
    N: NotificationDispatcher,
    C: Clock + Send + Sync,
{
    /// Creates an executor.
    #[must_use]
    pub fn new(
        ports: TaskPorts<P, W, D, S>,
        notifier: Arc<N>,
        config: &EngineConfig,
        clock: Arc<C>,
    ) -> Self {
        let permissions = ports.permission_cache(config, Arc::clone(&clock));
        Self {
            ports,
            notifier,
            permissions,
            clock,
        }
    }

    /// Performs `action_id` on `task_id` as `user`.
    ///
    /// Returns the task in its new state.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] for unknown tasks,
    /// [`TaskServiceError::InvalidAction`] when the action belongs to
    /// another process, [`TaskServiceError::Unauthorized`] when `user`
    /// holds no permission for it, [`TaskServiceError::InvalidTransition`]
    /// when the action does not leave the current state, and
    /// [`TaskServiceError::ConcurrentModification`] when another request
    /// moved the task first.
    #[tracing::instrument(
        skip(self, comment, attachment),
        fields(has_comment = comment.is_some(), has_attachment = attachment.is_some())
    )]
    pub async fn execute(
        &self,
        task_id: TaskId,
        user: UserId,
        action_id: ActionId,
        comment: Option<String>,
        attachment: Option<FileRef>,
    ) -> TaskServiceResult<Task> {
        let task = self.ports.load_task(task_id).await?;
        let definition = self.ports.load_definition(task.process_id()).await?;
        if definition.action(action_id).is_none() {
            return Err(TaskServiceError::InvalidAction {
                task: task_id,
                action: action_id,
            });
        }
        if !self.permissions.can_act(user, task_id, action_id).await? {
            return Err(TaskServiceError::Unauthorized(user));
        }

        let machine = self.ports.load_machine(task.process_id()).await?;
        let transition = *machine
            .resolve_transition(task.state_id(), action_id)
            .map_err(|_| TaskServiceError::InvalidTransition {
                state: task.state_id(),
                action: action_id,
            })?;

        let mut log = TaskActionLog::record(
            task_id,
            user,
            action_id,
            &transition,
            comment,
            &*self.clock,
        );
        if let Some(file) = attachment {
            log = log.with_attachment(file);
        }
        let commit = TransitionCommit {
            task_id,
            expected_state: task.state_id(),
            next_state: transition.next_state(),
            updated_at: log.created_at(),
            log,
        };
        let updated = self
            .ports
            .store
            .commit_transition(&commit)
            .await
            .map_err(|err| match err {
                TaskRepositoryError::ConcurrentModification { task_id: id, .. } => {
                    TaskServiceError::ConcurrentModification(id)
                }
                TaskRepositoryError::NotFound(id) => TaskServiceError::NotFound(id),
                other => TaskServiceError::Repository(other),
            })?;
        info!(
            from_state = %transition.current_state(),
            to_state = %transition.next_state(),
            "task transitioned"
        );

        self.notify_next_actors(&updated, &machine, user).await;
        Ok(updated)
    }

    async fn notify_next_actors(&self, task: &Task, machine: &StateMachine, actor: UserId) {
        let mut recipients = BTreeSet::new();
        for action in machine.actions_available(task.state_id()) {
            match self.permissions.eligible_users(task.id(), action).await {
                Ok(users) => recipients.extend(users),
                Err(err) => {
                    warn!(error = %err, %action, "could not collect notification recipients");
                    return;
                }
            }
        }
        recipients.remove(&actor);
        if recipients.is_empty() {
            debug!("no one to notify");
            return;
        }
        if let Err(err) = self
            .notifier
            .notify(task.id(), task.state_id(), recipients, actor)
            .await
        {
            warn!(error = %err, "notification dispatch failed");
        }
    }
}
