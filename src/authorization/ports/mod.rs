//! Port contracts for the permission projection.

pub mod repository;

pub use repository::{PermissionRepository, PermissionRepositoryError, PermissionRepositoryResult};
