//! Role rules: who may attempt a given action.

use super::{ActionId, ParseRoleTypeError, ProcessId, RoleRuleId};
use crate::directory::domain::{DepartmentId, RoleId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a role rule, recorded on every permission row.
///
/// The declaration order doubles as precedence: when one user qualifies for
/// an action through several rules, the earliest category is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleType {
    /// The task creator.
    Requestor,
    /// The task creator's direct supervisor.
    RequestorManager,
    /// The head of the task creator's department.
    RequestorDepartmentHead,
    /// The head of a named department.
    SpecificDepartmentHead,
    /// Users referenced by the task's ASSIGNEE fields.
    Assignee,
    /// One named user.
    SpecificUser,
    /// Every active holder of a role.
    SpecificRole,
    /// Every active member of a department.
    SpecificDepartment,
    /// Every active holder of a role within a department.
    SpecificRoleAndDepartment,
}

impl RoleType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Requestor => "requestor",
            Self::RequestorManager => "requestor_manager",
            Self::RequestorDepartmentHead => "requestor_department_head",
            Self::SpecificDepartmentHead => "specific_department_head",
            Self::Assignee => "assignee",
            Self::SpecificUser => "specific_user",
            Self::SpecificRole => "specific_role",
            Self::SpecificDepartment => "specific_department",
            Self::SpecificRoleAndDepartment => "specific_role_and_department",
        }
    }
}

impl fmt::Display for RoleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for RoleType {
    type Error = ParseRoleTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "requestor" => Ok(Self::Requestor),
            "requestor_manager" => Ok(Self::RequestorManager),
            "requestor_department_head" => Ok(Self::RequestorDepartmentHead),
            "specific_department_head" => Ok(Self::SpecificDepartmentHead),
            "assignee" => Ok(Self::Assignee),
            "specific_user" => Ok(Self::SpecificUser),
            "specific_role" => Ok(Self::SpecificRole),
            "specific_department" => Ok(Self::SpecificDepartment),
            "specific_role_and_department" => Ok(Self::SpecificRoleAndDepartment),
            _ => Err(ParseRoleTypeError(value.to_owned())),
        }
    }
}

/// Rule describing which users qualify for an action.
///
/// Variants carry exactly the directory references their category needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "role_type", rename_all = "snake_case")]
pub enum RoleRule {
    /// The task creator.
    Requestor,
    /// The task creator's direct supervisor.
    RequestorManager,
    /// The head of the task creator's department.
    RequestorDepartmentHead,
    /// The head of `department`.
    SpecificDepartmentHead {
        /// Department whose head qualifies.
        department: DepartmentId,
    },
    /// Users referenced by the task's ASSIGNEE fields.
    Assignee,
    /// Exactly `user`.
    SpecificUser {
        /// Qualifying user.
        user: UserId,
    },
    /// Every active holder of `role`.
    SpecificRole {
        /// Qualifying role.
        role: RoleId,
    },
    /// Every active member of `department`.
    SpecificDepartment {
        /// Qualifying department.
        department: DepartmentId,
    },
    /// Every active holder of `role` within `department`.
    SpecificRoleAndDepartment {
        /// Qualifying role.
        role: RoleId,
        /// Qualifying department.
        department: DepartmentId,
    },
}

impl RoleRule {
    /// Returns the rule category.
    #[must_use]
    pub const fn role_type(&self) -> RoleType {
        match self {
            Self::Requestor => RoleType::Requestor,
            Self::RequestorManager => RoleType::RequestorManager,
            Self::RequestorDepartmentHead => RoleType::RequestorDepartmentHead,
            Self::SpecificDepartmentHead { .. } => RoleType::SpecificDepartmentHead,
            Self::Assignee => RoleType::Assignee,
            Self::SpecificUser { .. } => RoleType::SpecificUser,
            Self::SpecificRole { .. } => RoleType::SpecificRole,
            Self::SpecificDepartment { .. } => RoleType::SpecificDepartment,
            Self::SpecificRoleAndDepartment { .. } => RoleType::SpecificRoleAndDepartment,
        }
    }
}

/// Binds a role rule to one action of a process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessActionRole {
    id: RoleRuleId,
    process_id: ProcessId,
    action_id: ActionId,
    rule: RoleRule,
}

impl ProcessActionRole {
    pub(crate) fn new(process_id: ProcessId, action_id: ActionId, rule: RoleRule) -> Self {
        Self {
            id: RoleRuleId::new(),
            process_id,
            action_id,
            rule,
        }
    }

    /// Returns the rule identifier.
    #[must_use]
    pub const fn id(&self) -> RoleRuleId {
        self.id
    }

    /// Returns the owning process.
    #[must_use]
    pub const fn process_id(&self) -> ProcessId {
        self.process_id
    }

    /// Returns the governed action.
    #[must_use]
    pub const fn action_id(&self) -> ActionId {
        self.action_id
    }

    /// Returns the rule.
    #[must_use]
    pub const fn rule(&self) -> RoleRule {
        self.rule
    }
}
