//! Port contracts for task persistence and the collaborators tasks use.

pub mod blob;
pub mod labels;
pub mod notification;
pub mod repository;

pub use blob::{BlobStore, BlobStoreError, BlobStoreResult};
pub use labels::{LabelCatalog, LabelCatalogError, LabelCatalogResult, LabelSubject};
#[cfg(test)]
pub use notification::MockNotificationDispatcher;
pub use notification::{NotificationDispatcher, NotificationError, NotificationResult};
pub use repository::{
    FieldUpdate, TaskCreation, TaskRepository, TaskRepositoryError, TaskRepositoryResult,
    TransitionCommit,
};
