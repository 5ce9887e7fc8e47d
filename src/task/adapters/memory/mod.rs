//! In-memory task adapters.

mod blob;
mod labels;
mod notifier;
mod store;

pub use blob::InMemoryBlobStore;
pub use labels::InMemoryLabelCatalog;
pub use notifier::{RecordedNotification, RecordingNotifier};
pub use store::InMemoryTaskStore;
