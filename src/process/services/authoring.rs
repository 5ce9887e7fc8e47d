//! Service layer for authoring process definitions and their state machines.

use crate::directory::{
    domain::{DepartmentId, RoleId, UserId},
    ports::{DirectoryError, OrgDirectory},
};
use crate::process::{
    domain::{
        ActionId, ActionType, FieldId, FieldSpec, NewProcess, ProcessDefinition,
        ProcessDomainError, ProcessId, RoleRule, RoleRuleId,
    },
    ports::{ProcessRepository, ProcessRepositoryError},
};
use crate::workflow::{
    domain::{State, StateId, StateMachine, StateType, TransitionId, WorkflowDomainError},
    ports::{WorkflowRepository, WorkflowRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Service-level errors for process authoring.
#[derive(Debug, Error)]
pub enum ProcessAuthoringError {
    /// Definition validation failed.
    #[error(transparent)]
    Domain(#[from] ProcessDomainError),
    /// State machine validation failed.
    #[error(transparent)]
    Workflow(#[from] WorkflowDomainError),
    /// Process repository operation failed.
    #[error(transparent)]
    Repository(#[from] ProcessRepositoryError),
    /// Workflow repository operation failed.
    #[error(transparent)]
    WorkflowRepository(#[from] WorkflowRepositoryError),
    /// Directory lookup failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    /// The process does not exist.
    #[error("process not found: {0}")]
    ProcessNotFound(ProcessId),
    /// The state has not been registered.
    #[error("state not found: {0}")]
    UnknownState(StateId),
    /// The user is not known to the directory.
    #[error("user not found in directory: {0}")]
    UnknownUser(UserId),
    /// The role is not known to the directory.
    #[error("role not found in directory: {0}")]
    UnknownRole(RoleId),
    /// The department is not known to the directory.
    #[error("department not found in directory: {0}")]
    UnknownDepartment(DepartmentId),
}

/// Result type for process authoring operations.
pub type ProcessAuthoringResult<T> = Result<T, ProcessAuthoringError>;

/// Authoring service for process definitions, states and transitions.
#[derive(Clone)]
pub struct ProcessAuthoringService<P, W, D, C>
where
    P: ProcessRepository,
    W: WorkflowRepository,
    D: OrgDirectory,
    C: Clock + Send + Sync,
{
    processes: Arc<P>,
    workflows: Arc<W>,
    directory: Arc<D>,
    clock: Arc<C>,
}

impl<P, W, D, C> ProcessAuthoringService<P, W, D, C>
where
    P: ProcessRepository,
    W: WorkflowRepository,
    D: OrgDirectory,
    C: Clock + Send + Sync,
{
    /// Creates a new authoring service.
    #[must_use]
    pub const fn new(processes: Arc<P>, workflows: Arc<W>, directory: Arc<D>, clock: Arc<C>) -> Self {
        Self {
            processes,
            workflows,
            directory,
            clock,
        }
    }

    /// Defines a new, unpublished process.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessAuthoringError`] when validation fails, the
    /// (name, version) pair exists, or the prefix belongs to another process.
    #[tracing::instrument(skip(self, request), fields(name = %request.name, version = request.version))]
    pub async fn define_process(
        &self,
        request: NewProcess,
    ) -> ProcessAuthoringResult<ProcessDefinition> {
        let definition = ProcessDefinition::new(request, &*self.clock)?;
        self.processes.store(&definition).await?;
        info!(process_id = %definition.id(), "process defined");
        Ok(definition)
    }

    /// Adds a field to an unpublished process.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessAuthoringError`] when the process is missing or
    /// locked, or the field violates a definition invariant.
    pub async fn add_field(
        &self,
        process_id: ProcessId,
        spec: FieldSpec,
    ) -> ProcessAuthoringResult<FieldId> {
        let mut definition = self.load(process_id).await?;
        let field_id = definition.add_field(spec, &*self.clock)?;
        self.processes.update(&definition).await?;
        Ok(field_id)
    }

    /// Adds an action to an unpublished process.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessAuthoringError`] when the process is missing or
    /// locked, or the name is blank or taken.
    pub async fn add_action(
        &self,
        process_id: ProcessId,
        name: impl Into<String> + Send,
        description: Option<String>,
        action_type: ActionType,
    ) -> ProcessAuthoringResult<ActionId> {
        let mut definition = self.load(process_id).await?;
        let action_id = definition.add_action(name, description, action_type, &*self.clock)?;
        self.processes.update(&definition).await?;
        Ok(action_id)
    }

    /// Adds a role rule after checking its directory references exist.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessAuthoringError`] when the process is missing or
    /// locked, the action is foreign, or a referenced user, role or
    /// department is unknown.
    #[tracing::instrument(skip(self))]
    pub async fn add_role_rule(
        &self,
        process_id: ProcessId,
        action_id: ActionId,
        rule: RoleRule,
    ) -> ProcessAuthoringResult<RoleRuleId> {
        let mut definition = self.load(process_id).await?;
        definition.ensure_editable()?;
        self.check_rule_references(rule).await?;
        let role_id = definition.add_role_rule(action_id, rule, &*self.clock)?;
        self.processes.update(&definition).await?;
        info!(role_type = %rule.role_type(), "role rule added");
        Ok(role_id)
    }

    /// Registers a workflow state.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessAuthoringError`] when the name is blank or taken.
    pub async fn register_state(
        &self,
        name: impl Into<String> + Send,
        description: Option<String>,
        state_type: StateType,
    ) -> ProcessAuthoringResult<State> {
        let state = State::new(name, description, state_type)?;
        self.workflows.store_state(&state).await?;
        Ok(state)
    }

    /// Adds a transition to the state machine of an unpublished process.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessAuthoringError`] when the process is missing or
    /// locked, a state is unknown, or the transition breaks a graph rule.
    #[tracing::instrument(skip(self))]
    pub async fn add_transition(
        &self,
        process_id: ProcessId,
        current: StateId,
        next: StateId,
    ) -> ProcessAuthoringResult<TransitionId> {
        let definition = self.load(process_id).await?;
        definition.ensure_editable()?;
        let current_state = self.load_state(current).await?;
        let next_state = self.load_state(next).await?;

        let mut machine = self
            .workflows
            .find_machine(process_id)
            .await?
            .unwrap_or_else(|| StateMachine::new(process_id));
        let transition_id = machine.add_transition(&current_state, &next_state)?;
        self.workflows.save_machine(&machine).await?;
        Ok(transition_id)
    }

    /// Gates a transition behind an action of the same process.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessAuthoringError`] when the process is missing or
    /// locked, the action or transition is foreign, or the binding would
    /// make the action ambiguous.
    pub async fn bind_action(
        &self,
        process_id: ProcessId,
        action_id: ActionId,
        transition_id: TransitionId,
    ) -> ProcessAuthoringResult<()> {
        let definition = self.load(process_id).await?;
        definition.ensure_editable()?;
        if definition.action(action_id).is_none() {
            return Err(ProcessDomainError::UnknownAction {
                process_id,
                action_id,
            }
            .into());
        }
        let mut machine = self
            .workflows
            .find_machine(process_id)
            .await?
            .ok_or(WorkflowDomainError::UnknownTransition(transition_id))?;
        machine.bind_action(action_id, transition_id)?;
        self.workflows.save_machine(&machine).await?;
        Ok(())
    }

    /// Publishes a definition, locking it and making it startable.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessAuthoringError`] when the process is missing or was
    /// already published.
    #[tracing::instrument(skip(self))]
    pub async fn publish(&self, process_id: ProcessId) -> ProcessAuthoringResult<ProcessDefinition> {
        let mut definition = self.load(process_id).await?;
        definition.publish(&*self.clock)?;
        self.processes.update(&definition).await?;
        info!("process published");
        Ok(definition)
    }

    /// Activates or deactivates a published process.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessAuthoringError`] when the process is missing or
    /// still a draft.
    #[tracing::instrument(skip(self))]
    pub async fn set_active(
        &self,
        process_id: ProcessId,
        active: bool,
    ) -> ProcessAuthoringResult<ProcessDefinition> {
        let mut definition = self.load(process_id).await?;
        definition.set_active(active, &*self.clock)?;
        self.processes.update(&definition).await?;
        info!("process activation changed");
        Ok(definition)
    }

    /// Allows a directory user to start tasks of a process.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessAuthoringError`] when the process or user is missing.
    pub async fn allow_creator(
        &self,
        process_id: ProcessId,
        user: UserId,
    ) -> ProcessAuthoringResult<()> {
        let mut definition = self.load(process_id).await?;
        self.ensure_user(user).await?;
        if definition.allow_creator(user, &*self.clock) {
            self.processes.update(&definition).await?;
        }
        Ok(())
    }

    /// Returns the active processes `user` may start.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessAuthoringError::UnknownUser`] when the user is not in
    /// the directory.
    pub async fn list_processes_for(
        &self,
        user: UserId,
    ) -> ProcessAuthoringResult<Vec<ProcessDefinition>> {
        let directory_user = self
            .directory
            .find_user(user)
            .await?
            .ok_or(ProcessAuthoringError::UnknownUser(user))?;
        let definitions = self.processes.list().await?;
        Ok(definitions
            .into_iter()
            .filter(|definition| definition.can_be_started_by(&directory_user))
            .collect())
    }

    async fn load(&self, process_id: ProcessId) -> ProcessAuthoringResult<ProcessDefinition> {
        self.processes
            .find_by_id(process_id)
            .await?
            .ok_or(ProcessAuthoringError::ProcessNotFound(process_id))
    }

    async fn load_state(&self, state_id: StateId) -> ProcessAuthoringResult<State> {
        self.workflows
            .find_state(state_id)
            .await?
            .ok_or(ProcessAuthoringError::UnknownState(state_id))
    }

    async fn ensure_user(&self, user: UserId) -> ProcessAuthoringResult<()> {
        self.directory
            .find_user(user)
            .await?
            .map(|_| ())
            .ok_or(ProcessAuthoringError::UnknownUser(user))
    }

    async fn ensure_role(&self, role: RoleId) -> ProcessAuthoringResult<()> {
        self.directory
            .find_role(role)
            .await?
            .map(|_| ())
            .ok_or(ProcessAuthoringError::UnknownRole(role))
    }

    async fn ensure_department(&self, department: DepartmentId) -> ProcessAuthoringResult<()> {
        self.directory
            .find_department(department)
            .await?
            .map(|_| ())
            .ok_or(ProcessAuthoringError::UnknownDepartment(department))
    }

    async fn check_rule_references(&self, rule: RoleRule) -> ProcessAuthoringResult<()> {
        match rule {
            RoleRule::Requestor
            | RoleRule::RequestorManager
            | RoleRule::RequestorDepartmentHead
            | RoleRule::Assignee => Ok(()),
            RoleRule::SpecificUser { user } => self.ensure_user(user).await,
            RoleRule::SpecificRole { role } => self.ensure_role(role).await,
            RoleRule::SpecificDepartmentHead { department }
            | RoleRule::SpecificDepartment { department } => {
                self.ensure_department(department).await
            }
            RoleRule::SpecificRoleAndDepartment { role, department } => {
                self.ensure_role(role).await?;
                self.ensure_department(department).await
            }
        }
    }
}
