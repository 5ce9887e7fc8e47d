//! Outbound notification hook fired after a task changes state.

use crate::directory::domain::UserId;
use crate::task::domain::TaskId;
use crate::workflow::domain::StateId;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;

/// Result type for notification delivery.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// Best-effort delivery of "your turn" notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Tells `recipients` that `task` entered `state`, skipping
    /// `exclude_user`.
    async fn notify(
        &self,
        task: TaskId,
        state: StateId,
        recipients: BTreeSet<UserId>,
        exclude_user: UserId,
    ) -> NotificationResult<()>;
}

/// Errors returned by notification dispatchers.
#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    /// Delivery failed.
    #[error("notification delivery failed: {0}")]
    Delivery(Arc<dyn std::error::Error + Send + Sync>),
}

impl NotificationError {
    /// Wraps a delivery error.
    pub fn delivery(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Delivery(Arc::new(err))
    }
}
