//! Identifier types for the process domain.

use crate::identifier::uuid_identifier;

uuid_identifier!(
    /// Unique identifier for a process definition.
    ProcessId
);

uuid_identifier!(
    /// Unique identifier for a process field.
    FieldId
);

uuid_identifier!(
    /// Unique identifier for a process action.
    ActionId
);

uuid_identifier!(
    /// Unique identifier for a process action role rule.
    RoleRuleId
);
