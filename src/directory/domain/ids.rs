//! Identifier types for the directory domain.

use crate::identifier::uuid_identifier;

uuid_identifier!(
    /// Unique identifier for a directory user.
    UserId
);

uuid_identifier!(
    /// Unique identifier for an organizational role.
    RoleId
);

uuid_identifier!(
    /// Unique identifier for a department.
    DepartmentId
);
