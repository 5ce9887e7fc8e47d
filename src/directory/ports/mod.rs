//! Port contracts for the organization directory.

pub mod directory;

pub use directory::{DirectoryError, DirectoryResult, OrgDirectory};
