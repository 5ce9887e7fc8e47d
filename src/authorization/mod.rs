//! Permission resolution and the precomputed permission projection.
//!
//! The resolver maps a task and a role rule to the users the rule admits.
//! Its output is materialized per task as [`domain::TaskPermission`] rows so
//! that every authorization check is a lookup. The projection is derived
//! data: it can be rebuilt from the resolver at any time. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Resolver and projection services in [`services`]
//!
//! Adapters live with the task store, which writes tasks and their
//! permission rows in the same atomic unit.

pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
