//! Running process instances.
//!
//! A task is created in its process's start state together with its field
//! values and permission rows, then moved through the workflow by actions
//! its permitted users execute. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
