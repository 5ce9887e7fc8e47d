//! Domain model for process definitions.
//!
//! The aggregate root is [`ProcessDefinition`]; fields, actions and role
//! rules are only added through it so that ordering, uniqueness and
//! condition invariants hold for every stored definition.

mod action;
mod definition;
mod error;
mod field;
mod ids;
mod role_rule;
mod validation;
mod value;

pub use action::{Action, ActionType};
pub use definition::{NewProcess, PersistedProcessData, ProcessDefinition, ProcessPrefix};
pub use error::{
    FieldValidationError, ParseActionTypeError, ParseFieldTypeError, ParseRoleTypeError,
    ProcessDomainError,
};
pub use field::{
    ConditionOperator, FieldCondition, FieldOptions, FieldSpec, FieldType, ProcessField,
    SelectChoice,
};
pub use ids::{ActionId, FieldId, ProcessId, RoleRuleId};
pub use role_rule::{ProcessActionRole, RoleRule, RoleType};
pub use validation::{
    FieldInput, SubmissionError, is_field_visible, validate_field_value, validate_submission,
};
pub use value::{FieldPayload, FieldValue, FileRef, ScalarValue};
