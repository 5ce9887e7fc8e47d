//! Service layer for process definitions.

mod authoring;

pub use authoring::{ProcessAuthoringError, ProcessAuthoringResult, ProcessAuthoringService};
