//! Step definitions for purchase request scenarios.

mod given;
mod when;
pub mod world;
