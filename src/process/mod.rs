//! Process definitions: versioned templates for business workflows.
//!
//! A process definition owns the ordered, typed fields a task carries, the
//! actions users may attempt, and the role rules that decide who may attempt
//! each action. Definitions are authored once, published, and then stay
//! immutable apart from their activation flag and creator allow-list. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Authoring services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
