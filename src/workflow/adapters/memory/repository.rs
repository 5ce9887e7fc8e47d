//! In-memory repository for states and state machines.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::process::domain::ProcessId;
use crate::workflow::{
    domain::{State, StateId, StateMachine, StateType},
    ports::{WorkflowRepository, WorkflowRepositoryError, WorkflowRepositoryResult},
};

/// Thread-safe in-memory workflow repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkflowRepository {
    state: Arc<RwLock<InMemoryWorkflowState>>,
}

#[derive(Debug, Default)]
struct InMemoryWorkflowState {
    states: HashMap<StateId, State>,
    machines: HashMap<ProcessId, StateMachine>,
}

impl InMemoryWorkflowRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl std::fmt::Display) -> WorkflowRepositoryError {
    WorkflowRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl WorkflowRepository for InMemoryWorkflowRepository {
    async fn store_state(&self, state: &State) -> WorkflowRepositoryResult<()> {
        let mut guard = self.state.write().map_err(lock_error)?;
        let taken = guard
            .states
            .values()
            .any(|existing| existing.id() == state.id() || existing.name() == state.name());
        if taken {
            return Err(WorkflowRepositoryError::DuplicateState(
                state.name().to_owned(),
            ));
        }
        guard.states.insert(state.id(), state.clone());
        Ok(())
    }

    async fn find_state(&self, id: StateId) -> WorkflowRepositoryResult<Option<State>> {
        let guard = self.state.read().map_err(lock_error)?;
        Ok(guard.states.get(&id).cloned())
    }

    async fn find_fallback_state(&self) -> WorkflowRepositoryResult<Option<State>> {
        let guard = self.state.read().map_err(lock_error)?;
        Ok(guard
            .states
            .values()
            .filter(|state| state.state_type() == StateType::Static)
            .min_by(|left, right| left.name().cmp(right.name()))
            .cloned())
    }

    async fn save_machine(&self, machine: &StateMachine) -> WorkflowRepositoryResult<()> {
        let mut guard = self.state.write().map_err(lock_error)?;
        guard.machines.insert(machine.process_id(), machine.clone());
        Ok(())
    }

    async fn find_machine(
        &self,
        process_id: ProcessId,
    ) -> WorkflowRepositoryResult<Option<StateMachine>> {
        let guard = self.state.read().map_err(lock_error)?;
        Ok(guard.machines.get(&process_id).cloned())
    }
}
