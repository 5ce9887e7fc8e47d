//! Repository port for states and per-process state machines.

use crate::process::domain::ProcessId;
use crate::workflow::domain::{State, StateId, StateMachine};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for workflow repository operations.
pub type WorkflowRepositoryResult<T> = Result<T, WorkflowRepositoryError>;

/// Workflow persistence contract.
#[async_trait]
pub trait WorkflowRepository: Send + Sync {
    /// Registers a state.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::DuplicateState`] when the identifier
    /// or the name is already registered.
    async fn store_state(&self, state: &State) -> WorkflowRepositoryResult<()>;

    /// Finds a state by identifier.
    async fn find_state(&self, id: StateId) -> WorkflowRepositoryResult<Option<State>>;

    /// Returns the `static` state used when a process has no start state.
    ///
    /// When several are registered the one with the lowest name wins.
    async fn find_fallback_state(&self) -> WorkflowRepositoryResult<Option<State>>;

    /// Creates or replaces the state machine of a process.
    async fn save_machine(&self, machine: &StateMachine) -> WorkflowRepositoryResult<()>;

    /// Finds the state machine of a process.
    ///
    /// Returns `None` when nothing was authored for the process yet.
    async fn find_machine(
        &self,
        process_id: ProcessId,
    ) -> WorkflowRepositoryResult<Option<StateMachine>>;
}

/// Errors returned by workflow repository implementations.
#[derive(Debug, Clone, Error)]
pub enum WorkflowRepositoryError {
    /// A state with the same identifier or name already exists.
    #[error("duplicate state: {0}")]
    DuplicateState(String),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl WorkflowRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
