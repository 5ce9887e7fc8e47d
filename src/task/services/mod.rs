//! Application services for task orchestration.

mod dependencies;
mod error;
mod executor;
mod lifecycle;
mod maintenance;
mod query;

pub use dependencies::TaskPorts;
pub use error::{TaskServiceError, TaskServiceResult};
pub use executor::TaskActionExecutor;
pub use lifecycle::{CreateTaskRequest, TaskLifecycleService};
pub use maintenance::{BackfillReport, PermissionMaintenanceService};
pub use query::{
    FieldDetail, ReceivedTask, ResolvedFile, SentTask, TaskDetail, TaskQueryService,
};
