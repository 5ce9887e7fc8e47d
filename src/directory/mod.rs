//! Identity and organization directory.
//!
//! The directory is an external collaborator: given a user it reports their
//! department, role, supervisor and whether the account is active. Only the
//! permission resolver consults it for authorization decisions; task and
//! process services use it to validate references. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
