//! Repository port for process definitions.

use crate::process::domain::{ProcessDefinition, ProcessId, ProcessPrefix};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for process repository operations.
pub type ProcessRepositoryResult<T> = Result<T, ProcessRepositoryError>;

/// Process definition persistence contract.
#[async_trait]
pub trait ProcessRepository: Send + Sync {
    /// Stores a new definition.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessRepositoryError::DuplicateProcess`] when the
    /// (name, version) pair exists, or [`ProcessRepositoryError::PrefixConflict`]
    /// when a process with a different name already uses the prefix.
    async fn store(&self, definition: &ProcessDefinition) -> ProcessRepositoryResult<()>;

    /// Persists changes to an existing definition.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessRepositoryError::NotFound`] when the definition does
    /// not exist.
    async fn update(&self, definition: &ProcessDefinition) -> ProcessRepositoryResult<()>;

    /// Finds a definition by identifier.
    ///
    /// Returns `None` when the definition does not exist.
    async fn find_by_id(&self, id: ProcessId) -> ProcessRepositoryResult<Option<ProcessDefinition>>;

    /// Finds a definition by name and version.
    async fn find_by_name_and_version(
        &self,
        name: &str,
        version: u32,
    ) -> ProcessRepositoryResult<Option<ProcessDefinition>>;

    /// Returns every definition, ordered by name then version.
    async fn list(&self) -> ProcessRepositoryResult<Vec<ProcessDefinition>>;
}

/// Errors returned by process repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ProcessRepositoryError {
    /// A definition with the same name and version already exists.
    #[error("duplicate process '{name}' version {version}")]
    DuplicateProcess {
        /// Process name.
        name: String,
        /// Process version.
        version: u32,
    },

    /// The prefix is already used by a process with another name.
    #[error("prefix {prefix} is already used by process '{owner}'")]
    PrefixConflict {
        /// Contested prefix.
        prefix: ProcessPrefix,
        /// Name of the process owning the prefix.
        owner: String,
    },

    /// The definition was not found.
    #[error("process not found: {0}")]
    NotFound(ProcessId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ProcessRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
