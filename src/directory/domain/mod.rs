//! Domain model for directory users, roles and departments.

mod error;
mod ids;
mod user;

pub use error::DirectoryDomainError;
pub use ids::{DepartmentId, RoleId, UserId};
pub use user::{Department, DirectoryUser, Role};
