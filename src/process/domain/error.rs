//! Error types for process definition authoring and field validation.

use super::{ActionId, FieldType, ProcessId};
use thiserror::Error;

/// Errors returned while authoring a process definition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProcessDomainError {
    /// The process name is empty after trimming.
    #[error("process name must not be empty")]
    EmptyProcessName,

    /// Versions start at 1.
    #[error("invalid process version {0}, expected a positive integer")]
    InvalidVersion(u32),

    /// The title prefix is not 1-8 uppercase ASCII letters or digits.
    #[error("invalid process prefix '{0}', expected 1-8 uppercase letters or digits")]
    InvalidPrefix(String),

    /// The field name is empty after trimming.
    #[error("field name must not be empty")]
    EmptyFieldName,

    /// Another field of the process already uses this name.
    #[error("duplicate field name '{0}'")]
    DuplicateFieldName(String),

    /// Options were supplied for a field type that does not use them.
    #[error("field '{field}' of type {field_type} does not accept options")]
    OptionsNotAllowed {
        /// Field name.
        field: String,
        /// Declared field type.
        field_type: FieldType,
    },

    /// A condition references a field outside this process.
    #[error("field '{field}' has a condition on a field that is not part of the process")]
    UnknownConditionField {
        /// Field carrying the condition.
        field: String,
    },

    /// A condition references a field that does not precede it.
    #[error("field '{field}' can only depend on a field ordered before it, not '{condition_field}'")]
    ConditionOrder {
        /// Field carrying the condition.
        field: String,
        /// Field the condition reads.
        condition_field: String,
    },

    /// The action name is empty after trimming.
    #[error("action name must not be empty")]
    EmptyActionName,

    /// Another action of the process already uses this name.
    #[error("duplicate action name '{0}'")]
    DuplicateActionName(String),

    /// The action does not belong to the process.
    #[error("action {action_id} is not defined for process {process_id}")]
    UnknownAction {
        /// Process being edited.
        process_id: ProcessId,
        /// Referenced action.
        action_id: ActionId,
    },

    /// An identical role rule already exists for the action.
    #[error("duplicate role rule for action {0}")]
    DuplicateRoleRule(ActionId),

    /// Published definitions can no longer be edited.
    #[error("process {0} is published and its definition is locked")]
    DefinitionLocked(ProcessId),

    /// Activation can only be toggled on published definitions.
    #[error("process {0} has not been published")]
    NotPublished(ProcessId),

    /// The definition was already published.
    #[error("process {0} is already published")]
    AlreadyPublished(ProcessId),
}

/// Errors returned when a submitted value does not fit its field.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FieldValidationError {
    /// A required field received no value.
    #[error("field '{field}' is required")]
    Required {
        /// Field name.
        field: String,
    },

    /// More than one payload channel was populated.
    #[error("field '{field}' received more than one kind of payload")]
    MultiplePayloads {
        /// Field name.
        field: String,
    },

    /// The populated payload channel does not match the field type.
    #[error("field '{field}' of type {field_type} received an incompatible payload")]
    WrongPayload {
        /// Field name.
        field: String,
        /// Declared field type.
        field_type: FieldType,
    },

    /// The value is not a finite number.
    #[error("field '{field}' expects a number, got '{value}'")]
    InvalidNumber {
        /// Field name.
        field: String,
        /// Rejected input.
        value: String,
    },

    /// The value is not an ISO `YYYY-MM-DD` date.
    #[error("field '{field}' expects an ISO date (YYYY-MM-DD), got '{value}'")]
    InvalidDate {
        /// Field name.
        field: String,
        /// Rejected input.
        value: String,
    },

    /// The value is not one of the configured choices.
    #[error("field '{field}' does not offer the choice '{value}'")]
    UnknownChoice {
        /// Field name.
        field: String,
        /// Rejected input.
        value: String,
    },

    /// The value is not valid JSON.
    #[error("field '{field}' expects JSON data: {reason}")]
    InvalidJson {
        /// Field name.
        field: String,
        /// Parser message.
        reason: String,
    },

    /// The value is not a user identifier.
    #[error("field '{field}' expects a user identifier, got '{value}'")]
    InvalidAssignee {
        /// Field name.
        field: String,
        /// Rejected input.
        value: String,
    },

    /// The referenced user is not known to the directory.
    #[error("field '{field}' references an unknown user {user}")]
    UnknownAssignee {
        /// Field name.
        field: String,
        /// Referenced user identifier.
        user: String,
    },

    /// The field is hidden by its condition and must not receive a value.
    #[error("field '{field}' is hidden by its condition and cannot receive a value")]
    HiddenField {
        /// Field name.
        field: String,
    },

    /// The same field was submitted more than once.
    #[error("field '{field}' was submitted more than once")]
    DuplicateSubmission {
        /// Field name.
        field: String,
    },
}

/// Error returned while parsing field types from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown field type: {0}")]
pub struct ParseFieldTypeError(pub String);

/// Error returned while parsing action types from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown action type: {0}")]
pub struct ParseActionTypeError(pub String);

/// Error returned while parsing role types from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role type: {0}")]
pub struct ParseRoleTypeError(pub String);
