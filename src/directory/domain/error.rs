//! Error types for directory domain validation.

use super::UserId;
use thiserror::Error;

/// Errors returned while constructing directory values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryDomainError {
    /// The username is empty after trimming.
    #[error("username must not be empty")]
    EmptyUsername,

    /// The role name is empty after trimming.
    #[error("role name must not be empty")]
    EmptyRoleName,

    /// The department name is empty after trimming.
    #[error("department name must not be empty")]
    EmptyDepartmentName,

    /// A user cannot supervise themselves.
    #[error("user {0} cannot be their own supervisor")]
    SelfSupervision(UserId),
}
