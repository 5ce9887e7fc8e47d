//! Domain model for task instances.
//!
//! A task instantiates a published process: it sits in one workflow state,
//! carries one normalized value per filled field, and accumulates an
//! append-only action log and field history.

mod data;
mod ids;
mod log;
mod task;
mod title;

pub use data::{PersistedHistoryData, TaskData, TaskDataHistory};
pub use ids::{ActionLogId, TaskId};
pub use log::{PersistedActionLogData, TaskActionLog};
pub use task::{PersistedTaskData, Task};
pub use title::TaskTitle;
