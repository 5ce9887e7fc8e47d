//! Per-process state machines.
//!
//! States are shared vocabulary; a process owns the directed graph of
//! transitions between them and the bindings that gate each transition
//! behind one or more actions. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
