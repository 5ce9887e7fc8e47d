//! Directory users and the organizational units they belong to.

use super::{DepartmentId, DirectoryDomainError, RoleId, UserId};
use serde::{Deserialize, Serialize};

/// Organizational role such as "Purchasing Manager".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Role {
    id: RoleId,
    name: String,
}

impl Role {
    /// Creates a role with a generated identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryDomainError::EmptyRoleName`] when the trimmed name
    /// is empty.
    pub fn new(name: impl Into<String>) -> Result<Self, DirectoryDomainError> {
        let raw = name.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DirectoryDomainError::EmptyRoleName);
        }
        Ok(Self {
            id: RoleId::new(),
            name: trimmed.to_owned(),
        })
    }

    /// Returns the role identifier.
    #[must_use]
    pub const fn id(&self) -> RoleId {
        self.id
    }

    /// Returns the role display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns whether the role name contains `pattern`, ignoring case.
    #[must_use]
    pub fn name_matches(&self, pattern: &str) -> bool {
        self.name
            .to_lowercase()
            .contains(pattern.to_lowercase().as_str())
    }
}

/// Department a user belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Department {
    id: DepartmentId,
    name: String,
}

impl Department {
    /// Creates a department with a generated identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryDomainError::EmptyDepartmentName`] when the trimmed
    /// name is empty.
    pub fn new(name: impl Into<String>) -> Result<Self, DirectoryDomainError> {
        let raw = name.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DirectoryDomainError::EmptyDepartmentName);
        }
        Ok(Self {
            id: DepartmentId::new(),
            name: trimmed.to_owned(),
        })
    }

    /// Returns the department identifier.
    #[must_use]
    pub const fn id(&self) -> DepartmentId {
        self.id
    }

    /// Returns the department display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// User as reported by the organization directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryUser {
    id: UserId,
    username: String,
    department: Option<DepartmentId>,
    role: Option<RoleId>,
    supervisor: Option<UserId>,
    active: bool,
    staff: bool,
}

impl DirectoryUser {
    /// Creates an active, non-staff user with no organizational placement.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryDomainError::EmptyUsername`] when the trimmed
    /// username is empty.
    pub fn new(username: impl Into<String>) -> Result<Self, DirectoryDomainError> {
        let raw = username.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DirectoryDomainError::EmptyUsername);
        }
        Ok(Self {
            id: UserId::new(),
            username: trimmed.to_owned(),
            department: None,
            role: None,
            supervisor: None,
            active: true,
            staff: false,
        })
    }

    /// Places the user in a department.
    #[must_use]
    pub const fn with_department(mut self, department: DepartmentId) -> Self {
        self.department = Some(department);
        self
    }

    /// Assigns the user a role.
    #[must_use]
    pub const fn with_role(mut self, role: RoleId) -> Self {
        self.role = Some(role);
        self
    }

    /// Sets the user's direct supervisor.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryDomainError::SelfSupervision`] when `supervisor`
    /// is the user themselves.
    pub fn with_supervisor(mut self, supervisor: UserId) -> Result<Self, DirectoryDomainError> {
        if supervisor == self.id {
            return Err(DirectoryDomainError::SelfSupervision(self.id));
        }
        self.supervisor = Some(supervisor);
        Ok(self)
    }

    /// Marks the user as staff, which bypasses process creator allow-lists.
    #[must_use]
    pub const fn as_staff(mut self) -> Self {
        self.staff = true;
        self
    }

    /// Marks the account as inactive.
    #[must_use]
    pub const fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the login name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the user's department, if any.
    #[must_use]
    pub const fn department(&self) -> Option<DepartmentId> {
        self.department
    }

    /// Returns the user's role, if any.
    #[must_use]
    pub const fn role(&self) -> Option<RoleId> {
        self.role
    }

    /// Returns the user's direct supervisor, if any.
    #[must_use]
    pub const fn supervisor(&self) -> Option<UserId> {
        self.supervisor
    }

    /// Returns whether the account is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns whether the user is staff.
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        self.staff
    }
}
