//! Adapter implementations for process ports.

pub mod memory;
