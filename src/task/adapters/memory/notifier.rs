//! Notification dispatcher that records deliveries instead of sending them.

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

use crate::directory::domain::UserId;
use crate::task::{
    domain::TaskId,
    ports::{NotificationDispatcher, NotificationError, NotificationResult},
};
use crate::workflow::domain::StateId;

/// One recorded delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedNotification {
    /// Task that changed state.
    pub task_id: TaskId,
    /// State the task entered.
    pub state_id: StateId,
    /// Users notified, actor excluded.
    pub recipients: BTreeSet<UserId>,
}

/// In-memory dispatcher for tests and embedded deployments.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<RwLock<Vec<RecordedNotification>>>,
}

impl RecordingNotifier {
    /// Creates a dispatcher with no recorded deliveries.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the deliveries recorded so far.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::Delivery`] when the lock is poisoned.
    pub fn sent(&self) -> NotificationResult<Vec<RecordedNotification>> {
        let sent = self.sent.read().map_err(lock_error)?;
        Ok(sent.clone())
    }
}

fn lock_error(err: impl std::fmt::Display) -> NotificationError {
    NotificationError::delivery(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl NotificationDispatcher for RecordingNotifier {
    async fn notify(
        &self,
        task: TaskId,
        state: StateId,
        recipients: BTreeSet<UserId>,
        exclude_user: UserId,
    ) -> NotificationResult<()> {
        let mut sent = self.sent.write().map_err(lock_error)?;
        let recipients: BTreeSet<UserId> = recipients
            .into_iter()
            .filter(|user| *user != exclude_user)
            .collect();
        if recipients.is_empty() {
            return Ok(());
        }
        sent.push(RecordedNotification {
            task_id: task,
            state_id: state,
            recipients,
        });
        Ok(())
    }
}
