//! Port contracts for process definitions.

pub mod repository;

pub use repository::{ProcessRepository, ProcessRepositoryError, ProcessRepositoryResult};
