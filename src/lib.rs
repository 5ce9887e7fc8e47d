//! Taskflow: configurable business-process workflow engine.
//!
//! This crate lets an organization author multi-step business processes,
//! instantiate them as tasks carrying dynamically typed field values, and
//! decide who may advance each task through its lifecycle.
//!
//! # Architecture
//!
//! Taskflow follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, in-memory)
//! - **Services**: Orchestration across ports
//!
//! # Modules
//!
//! - [`directory`]: Identity and organization directory collaborator
//! - [`process`]: Versioned process templates, typed fields and role rules
//! - [`workflow`]: Per-process state machines
//! - [`authorization`]: Permission resolution and the precomputed permission
//!   projection
//! - [`task`]: Task instances, field data, action execution and read-models
//! - [`config`]: Engine-wide tunables

mod identifier;

pub mod authorization;
pub mod config;
pub mod directory;
pub mod process;
pub mod task;
pub mod workflow;
