//! Label catalog backed by a map.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::ports::{LabelCatalog, LabelCatalogError, LabelCatalogResult, LabelSubject};

/// In-memory label catalog keyed by subject and locale.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLabelCatalog {
    labels: Arc<RwLock<HashMap<(LabelSubject, String), String>>>,
}

impl InMemoryLabelCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the label of `subject` in `locale`.
    ///
    /// # Errors
    ///
    /// Returns [`LabelCatalogError::Persistence`] when the lock is poisoned.
    pub fn insert(
        &self,
        subject: LabelSubject,
        locale: impl Into<String>,
        label: impl Into<String>,
    ) -> LabelCatalogResult<()> {
        let mut labels = self.labels.write().map_err(lock_error)?;
        labels.insert((subject, locale.into()), label.into());
        Ok(())
    }
}

fn lock_error(err: impl std::fmt::Display) -> LabelCatalogError {
    LabelCatalogError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl LabelCatalog for InMemoryLabelCatalog {
    async fn label(
        &self,
        subject: LabelSubject,
        locale: &str,
    ) -> LabelCatalogResult<Option<String>> {
        let labels = self.labels.read().map_err(lock_error)?;
        Ok(labels.get(&(subject, locale.to_owned())).cloned())
    }
}
