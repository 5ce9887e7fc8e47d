//! Localized display labels for states and actions.

use crate::process::domain::{ActionId, FieldId, ProcessId};
use crate::workflow::domain::StateId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for label lookups.
pub type LabelCatalogResult<T> = Result<T, LabelCatalogError>;

/// Entity a label describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LabelSubject {
    /// A process.
    Process(ProcessId),
    /// A process field.
    Field(FieldId),
    /// A process action.
    Action(ActionId),
    /// A workflow state.
    State(StateId),
}

/// Localization lookup.
#[async_trait]
pub trait LabelCatalog: Send + Sync {
    /// Returns the label of `subject` in `locale`, if one is configured.
    ///
    /// Callers fall back to the entity name when `None` is returned.
    async fn label(&self, subject: LabelSubject, locale: &str)
    -> LabelCatalogResult<Option<String>>;
}

/// Errors returned by label catalogs.
#[derive(Debug, Clone, Error)]
pub enum LabelCatalogError {
    /// Catalog backend failure.
    #[error("label catalog error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl LabelCatalogError {
    /// Wraps a backend error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
