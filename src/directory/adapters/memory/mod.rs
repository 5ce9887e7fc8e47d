//! In-memory directory adapter.

mod directory;

pub use directory::InMemoryOrgDirectory;
