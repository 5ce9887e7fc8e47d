//! In-memory repository for process definitions.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::process::{
    domain::{ProcessDefinition, ProcessId},
    ports::{ProcessRepository, ProcessRepositoryError, ProcessRepositoryResult},
};

/// Thread-safe in-memory process repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProcessRepository {
    state: Arc<RwLock<HashMap<ProcessId, ProcessDefinition>>>,
}

impl InMemoryProcessRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl std::fmt::Display) -> ProcessRepositoryError {
    ProcessRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

/// Rejects a prefix already claimed by a process with a different name.
fn check_prefix(
    definitions: &HashMap<ProcessId, ProcessDefinition>,
    candidate: &ProcessDefinition,
) -> ProcessRepositoryResult<()> {
    let owner = definitions.values().find(|existing| {
        existing.id() != candidate.id()
            && existing.prefix() == candidate.prefix()
            && existing.name() != candidate.name()
    });
    match owner {
        Some(existing) => Err(ProcessRepositoryError::PrefixConflict {
            prefix: candidate.prefix().clone(),
            owner: existing.name().to_owned(),
        }),
        None => Ok(()),
    }
}

#[async_trait]
impl ProcessRepository for InMemoryProcessRepository {
    async fn store(&self, definition: &ProcessDefinition) -> ProcessRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let duplicate = state.values().any(|existing| {
            existing.id() == definition.id()
                || (existing.name() == definition.name()
                    && existing.version() == definition.version())
        });
        if duplicate {
            return Err(ProcessRepositoryError::DuplicateProcess {
                name: definition.name().to_owned(),
                version: definition.version(),
            });
        }
        check_prefix(&state, definition)?;
        state.insert(definition.id(), definition.clone());
        Ok(())
    }

    async fn update(&self, definition: &ProcessDefinition) -> ProcessRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if !state.contains_key(&definition.id()) {
            return Err(ProcessRepositoryError::NotFound(definition.id()));
        }
        state.insert(definition.id(), definition.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: ProcessId) -> ProcessRepositoryResult<Option<ProcessDefinition>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.get(&id).cloned())
    }

    async fn find_by_name_and_version(
        &self,
        name: &str,
        version: u32,
    ) -> ProcessRepositoryResult<Option<ProcessDefinition>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .values()
            .find(|definition| definition.name() == name && definition.version() == version)
            .cloned())
    }

    async fn list(&self) -> ProcessRepositoryResult<Vec<ProcessDefinition>> {
        let state = self.state.read().map_err(lock_error)?;
        let mut definitions: Vec<ProcessDefinition> = state.values().cloned().collect();
        definitions.sort_by(|left, right| {
            left.name()
                .cmp(right.name())
                .then_with(|| left.version().cmp(&right.version()))
        });
        Ok(definitions)
    }
}
