//! Ports shared by every task service, plus the lookups they all repeat.

use super::{TaskServiceError, TaskServiceResult};
use crate::authorization::{
    domain::TaskContext,
    ports::PermissionRepository,
    services::{PermissionCacheService, PermissionResolver},
};
use crate::config::EngineConfig;
use crate::directory::ports::OrgDirectory;
use crate::process::{
    domain::{ProcessDefinition, ProcessId},
    ports::ProcessRepository,
};
use crate::task::{
    domain::{Task, TaskData, TaskId},
    ports::TaskRepository,
};
use crate::workflow::{domain::StateMachine, ports::WorkflowRepository};
use mockable::Clock;
use std::sync::Arc;

/// Repositories and directory every task service reads.
///
/// The store implements both the task and the permission repository so the
/// two can be written in one atomic unit.
pub struct TaskPorts<P, W, D, S> {
    /// Process definitions.
    pub processes: Arc<P>,
    /// State machines and states.
    pub workflows: Arc<W>,
    /// Organization directory.
    pub directory: Arc<D>,
    /// Task store and permission projection.
    pub store: Arc<S>,
}

impl<P, W, D, S> Clone for TaskPorts<P, W, D, S> {
    fn clone(&self) -> Self {
        Self {
            processes: Arc::clone(&self.processes),
            workflows: Arc::clone(&self.workflows),
            directory: Arc::clone(&self.directory),
            store: Arc::clone(&self.store),
        }
    }
}

impl<P, W, D, S> TaskPorts<P, W, D, S>
where
    P: ProcessRepository,
    W: WorkflowRepository,
    D: OrgDirectory,
    S: TaskRepository + PermissionRepository,
{
    /// Bundles the ports.
    #[must_use]
    pub const fn new(processes: Arc<P>, workflows: Arc<W>, directory: Arc<D>, store: Arc<S>) -> Self {
        Self {
            processes,
            workflows,
            directory,
            store,
        }
    }

    pub(super) fn permission_cache<C>(
        &self,
        config: &EngineConfig,
        clock: Arc<C>,
    ) -> PermissionCacheService<S, D, C>
    where
        C: Clock + Send + Sync,
    {
        let resolver = PermissionResolver::new(Arc::clone(&self.directory), config);
        PermissionCacheService::new(Arc::clone(&self.store), resolver, clock)
    }

    pub(super) async fn load_task(&self, id: TaskId) -> TaskServiceResult<Task> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(TaskServiceError::NotFound(id))
    }

    pub(super) async fn load_definition(
        &self,
        id: ProcessId,
    ) -> TaskServiceResult<ProcessDefinition> {
        self.processes
            .find_by_id(id)
            .await?
            .ok_or(TaskServiceError::InvalidProcess(id))
    }

    /// Loads the machine of a process; a process without one has no
    /// transitions.
    pub(super) async fn load_machine(&self, id: ProcessId) -> TaskServiceResult<StateMachine> {
        Ok(self
            .workflows
            .find_machine(id)
            .await?
            .unwrap_or_else(|| StateMachine::new(id)))
    }

    pub(super) async fn context_for(&self, task: &Task) -> TaskServiceResult<TaskContext> {
        let data = self.store.find_data(task.id()).await?;
        Ok(context_from(task, &data))
    }
}

pub(super) fn context_from(task: &Task, data: &[TaskData]) -> TaskContext {
    TaskContext::new(task.id(), task.process_id(), task.created_by())
        .with_assignees(data.iter().filter_map(|entry| entry.value().assignee()))
}
