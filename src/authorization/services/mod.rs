//! Permission resolution and projection services.

mod cache;
mod resolver;

pub use cache::{PermissionCacheError, PermissionCacheResult, PermissionCacheService};
pub use resolver::PermissionResolver;
