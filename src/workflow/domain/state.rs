//! Workflow states.

use super::{ParseStateTypeError, StateId, WorkflowDomainError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle category of a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateType {
    /// Entry point of a process.
    Start,
    /// Work in progress.
    Working,
    /// Awaiting review.
    PendingReview,
    /// Awaiting approval.
    PendingApprove,
    /// Request was denied.
    Denied,
    /// Request was canceled.
    Canceled,
    /// Request was closed.
    Closed,
    /// Fallback state used when a process declares no start state.
    Static,
}

impl StateType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Working => "working",
            Self::PendingReview => "pending_review",
            Self::PendingApprove => "pending_approve",
            Self::Denied => "denied",
            Self::Canceled => "canceled",
            Self::Closed => "closed",
            Self::Static => "static",
        }
    }

    /// Returns whether tasks in this state are finished.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Denied | Self::Canceled | Self::Closed)
    }
}

impl fmt::Display for StateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for StateType {
    type Error = ParseStateTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "working" => Ok(Self::Working),
            "pending_review" => Ok(Self::PendingReview),
            "pending_approve" => Ok(Self::PendingApprove),
            "denied" => Ok(Self::Denied),
            "canceled" => Ok(Self::Canceled),
            "closed" => Ok(Self::Closed),
            "static" => Ok(Self::Static),
            _ => Err(ParseStateTypeError(value.to_owned())),
        }
    }
}

/// Named workflow state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct State {
    id: StateId,
    name: String,
    description: Option<String>,
    state_type: StateType,
}

impl State {
    /// Creates a state.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::EmptyStateName`] when the name is blank.
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        state_type: StateType,
    ) -> Result<Self, WorkflowDomainError> {
        let raw = name.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(WorkflowDomainError::EmptyStateName);
        }
        Ok(Self {
            id: StateId::new(),
            name: trimmed.to_owned(),
            description,
            state_type,
        })
    }

    /// Returns the state identifier.
    #[must_use]
    pub const fn id(&self) -> StateId {
        self.id
    }

    /// Returns the state name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the lifecycle category.
    #[must_use]
    pub const fn state_type(&self) -> StateType {
        self.state_type
    }

    /// Returns whether tasks in this state are finished.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.state_type.is_terminal()
    }
}
