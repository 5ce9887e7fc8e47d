//! Actions users may attempt on a task.

use super::{ActionId, ParseActionTypeError, ProcessId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Business category of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Approves the request.
    Approve,
    /// Sends the request back for adjustment.
    Adjust,
    /// Confirms receipt or correctness.
    Confirm,
    /// Marks the work as complete.
    Complete,
    /// Closes the task.
    Close,
    /// Rejects the request.
    Reject,
    /// Cancels the request.
    Cancel,
}

impl ActionType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Adjust => "adjust",
            Self::Confirm => "confirm",
            Self::Complete => "complete",
            Self::Close => "close",
            Self::Reject => "reject",
            Self::Cancel => "cancel",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ActionType {
    type Error = ParseActionTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "approve" => Ok(Self::Approve),
            "adjust" => Ok(Self::Adjust),
            "confirm" => Ok(Self::Confirm),
            "complete" => Ok(Self::Complete),
            "close" => Ok(Self::Close),
            "reject" => Ok(Self::Reject),
            "cancel" => Ok(Self::Cancel),
            _ => Err(ParseActionTypeError(value.to_owned())),
        }
    }
}

/// Named operation defined by a process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    id: ActionId,
    process_id: ProcessId,
    name: String,
    description: Option<String>,
    action_type: ActionType,
}

impl Action {
    /// Creates an action; the name must already be validated.
    pub(crate) fn new(
        process_id: ProcessId,
        name: String,
        description: Option<String>,
        action_type: ActionType,
    ) -> Self {
        Self {
            id: ActionId::new(),
            process_id,
            name,
            description,
            action_type,
        }
    }

    /// Returns the action identifier.
    #[must_use]
    pub const fn id(&self) -> ActionId {
        self.id
    }

    /// Returns the owning process.
    #[must_use]
    pub const fn process_id(&self) -> ProcessId {
        self.process_id
    }

    /// Returns the action name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the action category.
    #[must_use]
    pub const fn action_type(&self) -> ActionType {
        self.action_type
    }
}
