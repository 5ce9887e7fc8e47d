//! In-memory process adapters.

mod repository;

pub use repository::InMemoryProcessRepository;
