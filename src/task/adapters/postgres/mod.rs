//! `PostgreSQL` adapters for task persistence.
//!
//! Tables are created by the migrations under `migrations/`.

mod conversions;
mod models;
mod repository;
mod schema;

pub use repository::{PostgresTaskStore, TaskPgPool};
