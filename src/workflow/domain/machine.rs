//! Directed state graph of one process.

use super::{State, StateId, StateType, TransitionId, WorkflowDomainError};
use crate::process::domain::{ActionId, ProcessId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Directed edge between two states of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition {
    id: TransitionId,
    process_id: ProcessId,
    current_state: StateId,
    next_state: StateId,
}

impl Transition {
    /// Returns the transition identifier.
    #[must_use]
    pub const fn id(&self) -> TransitionId {
        self.id
    }

    /// Returns the owning process.
    #[must_use]
    pub const fn process_id(&self) -> ProcessId {
        self.process_id
    }

    /// Returns the source state.
    #[must_use]
    pub const fn current_state(&self) -> StateId {
        self.current_state
    }

    /// Returns the target state.
    #[must_use]
    pub const fn next_state(&self) -> StateId {
        self.next_state
    }
}

/// Gate allowing `action` to fire `transition`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionTransition {
    /// Action that fires the transition.
    pub action_id: ActionId,
    /// Fired transition.
    pub transition_id: TransitionId,
}

/// State graph of a single process.
///
/// The machine keeps a copy of every state it references so that traversal
/// never needs another lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateMachine {
    process_id: ProcessId,
    states: BTreeMap<StateId, State>,
    transitions: Vec<Transition>,
    bindings: Vec<ActionTransition>,
}

impl StateMachine {
    /// Creates an empty machine for `process_id`.
    #[must_use]
    pub const fn new(process_id: ProcessId) -> Self {
        Self {
            process_id,
            states: BTreeMap::new(),
            transitions: Vec::new(),
            bindings: Vec::new(),
        }
    }

    /// Returns the owning process.
    #[must_use]
    pub const fn process_id(&self) -> ProcessId {
        self.process_id
    }

    /// Returns every transition in authoring order.
    #[must_use]
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Returns every action binding in authoring order.
    #[must_use]
    pub fn bindings(&self) -> &[ActionTransition] {
        &self.bindings
    }

    /// Finds a state referenced by this machine.
    #[must_use]
    pub fn state(&self, id: StateId) -> Option<&State> {
        self.states.get(&id)
    }

    /// Finds a transition of this machine.
    #[must_use]
    pub fn transition(&self, id: TransitionId) -> Option<&Transition> {
        self.transitions.iter().find(|transition| transition.id == id)
    }

    /// Adds a transition between two states.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError`] when the states are equal, the pair
    /// already exists, or `current` would be a second start state.
    pub fn add_transition(
        &mut self,
        current: &State,
        next: &State,
    ) -> Result<TransitionId, WorkflowDomainError> {
        if current.id() == next.id() {
            return Err(WorkflowDomainError::SelfTransition(current.id()));
        }
        let duplicate = self.transitions.iter().any(|transition| {
            transition.current_state == current.id() && transition.next_state == next.id()
        });
        if duplicate {
            return Err(WorkflowDomainError::DuplicateTransition {
                current: current.id(),
                next: next.id(),
            });
        }
        if current.state_type() == StateType::Start {
            let existing = self.initial_state().map(State::id);
            if let Some(existing) = existing.filter(|id| *id != current.id()) {
                return Err(WorkflowDomainError::MultipleStartStates {
                    existing,
                    candidate: current.id(),
                });
            }
        }

        let transition = Transition {
            id: TransitionId::new(),
            process_id: self.process_id,
            current_state: current.id(),
            next_state: next.id(),
        };
        self.states.insert(current.id(), current.clone());
        self.states.insert(next.id(), next.clone());
        self.transitions.push(transition);
        Ok(transition.id)
    }

    /// Allows `action` to fire `transition`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError`] when the transition is foreign, the
    /// binding exists, or the action already leaves the same source state
    /// through another transition.
    pub fn bind_action(
        &mut self,
        action: ActionId,
        transition: TransitionId,
    ) -> Result<(), WorkflowDomainError> {
        let target = *self
            .transition(transition)
            .ok_or(WorkflowDomainError::UnknownTransition(transition))?;
        let binding = ActionTransition {
            action_id: action,
            transition_id: transition,
        };
        if self.bindings.contains(&binding) {
            return Err(WorkflowDomainError::DuplicateBinding { action, transition });
        }
        if self
            .transitions_for(target.current_state, action)
            .next()
            .is_some()
        {
            return Err(WorkflowDomainError::AmbiguousAction {
                action,
                state: target.current_state,
            });
        }
        self.bindings.push(binding);
        Ok(())
    }

    /// Returns the distinct actions that may fire from `state`.
    #[must_use]
    pub fn actions_available(&self, state: StateId) -> BTreeSet<ActionId> {
        self.bindings
            .iter()
            .filter(|binding| {
                self.transition(binding.transition_id)
                    .is_some_and(|transition| transition.current_state == state)
            })
            .map(|binding| binding.action_id)
            .collect()
    }

    /// Resolves the transition `action` fires from `state`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::InvalidTransition`] when no bound
    /// transition leaves `state` through `action`.
    pub fn resolve_transition(
        &self,
        state: StateId,
        action: ActionId,
    ) -> Result<&Transition, WorkflowDomainError> {
        self.transitions_for(state, action)
            .next()
            .ok_or(WorkflowDomainError::InvalidTransition { state, action })
    }

    /// Returns the start-typed state some transition leaves from.
    #[must_use]
    pub fn initial_state(&self) -> Option<&State> {
        self.transitions
            .iter()
            .filter_map(|transition| self.states.get(&transition.current_state))
            .find(|state| state.state_type() == StateType::Start)
    }

    fn transitions_for(
        &self,
        state: StateId,
        action: ActionId,
    ) -> impl Iterator<Item = &Transition> {
        self.bindings
            .iter()
            .filter(move |binding| binding.action_id == action)
            .filter_map(|binding| self.transition(binding.transition_id))
            .filter(move |transition| transition.current_state == state)
    }
}
