//! Adapter implementations for the organization directory.

pub mod memory;
