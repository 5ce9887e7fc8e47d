//! Repair of the permission projection after directory or rule changes.

use super::{TaskPorts, TaskServiceResult};
use crate::authorization::{
    domain::ReconcileOutcome, ports::PermissionRepository, services::PermissionCacheService,
};
use crate::config::EngineConfig;
use crate::directory::ports::OrgDirectory;
use crate::process::{domain::ProcessId, ports::ProcessRepository};
use crate::task::{
    domain::{Task, TaskId},
    ports::TaskRepository,
};
use crate::workflow::ports::WorkflowRepository;
use mockable::Clock;
use std::sync::Arc;
use tracing::{info, warn};

/// Counts reported by a backfill run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillReport {
    /// Tasks visited.
    pub processed: usize,
    /// Tasks whose rows were rebuilt.
    pub succeeded: usize,
    /// Tasks that could not be rebuilt.
    pub failed: usize,
    /// Rows added across all tasks.
    pub inserted: usize,
    /// Rows removed across all tasks.
    pub removed: usize,
}

/// Rebuilds permission rows from the current directory and role rules.
pub struct PermissionMaintenanceService<P, W, D, S, C>
where
    P: ProcessRepository,
    W: WorkflowRepository,
    D: OrgDirectory,
    S: TaskRepository + PermissionRepository,
    C: Clock + Send + Sync,
{
    ports: TaskPorts<P, W, D, S>,
    permissions: PermissionCacheService<S, D, C>,
}

impl<P, W, D, S, C> PermissionMaintenanceService<P, W, D, S, C>
where
    P: ProcessRepository,
    W: WorkflowRepository,
    D: OrgDirectory,
    S: TaskRepository + PermissionRepository,
    C: Clock + Send + Sync,
{
    /// Creates a maintenance service.
    #[must_use]
    pub fn new(ports: TaskPorts<P, W, D, S>, config: &EngineConfig, clock: Arc<C>) -> Self {
        let permissions = ports.permission_cache(config, clock);
        Self { ports, permissions }
    }

    /// Rebuilds the rows of one task.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskServiceError::NotFound`] for unknown tasks and
    /// the underlying error when resolution or storage fails.
    pub async fn reconcile_task(&self, task_id: TaskId) -> TaskServiceResult<ReconcileOutcome> {
        let task = self.ports.load_task(task_id).await?;
        self.reconcile(&task).await
    }

    /// Rebuilds the rows of every task, optionally of one process only.
    ///
    /// A failing task is logged and counted; the run carries on with the
    /// next one.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskServiceError::Repository`] when the tasks cannot
    /// be listed.
    #[tracing::instrument(skip(self))]
    pub async fn backfill(&self, process: Option<ProcessId>) -> TaskServiceResult<BackfillReport> {
        let tasks = self.ports.store.list(process).await?;
        let mut report = BackfillReport::default();
        for task in &tasks {
            report.processed += 1;
            match self.reconcile(task).await {
                Ok(outcome) => {
                    report.succeeded += 1;
                    report.inserted += outcome.inserted;
                    report.removed += outcome.removed;
                }
                Err(err) => {
                    report.failed += 1;
                    warn!(task_id = %task.id(), error = %err, "permission backfill failed");
                }
            }
        }
        info!(
            processed = report.processed,
            succeeded = report.succeeded,
            failed = report.failed,
            "permission backfill finished"
        );
        Ok(report)
    }

    async fn reconcile(&self, task: &Task) -> TaskServiceResult<ReconcileOutcome> {
        let definition = self.ports.load_definition(task.process_id()).await?;
        let context = self.ports.context_for(task).await?;
        Ok(self.permissions.reconcile(&context, &definition).await?)
    }
}
