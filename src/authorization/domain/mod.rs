//! Domain model for task permissions.

mod context;
mod permission;

pub use context::TaskContext;
pub use permission::{PermissionKey, ReconcileOutcome, TaskPermission};
