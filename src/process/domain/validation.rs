//! Validation of submitted field payloads against a process definition.

use super::{
    FieldId, FieldPayload, FieldType, FieldValidationError, FieldValue, FileRef,
    ProcessDefinition, ProcessField, ScalarValue,
};
use crate::directory::domain::UserId;
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One submitted field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInput {
    /// Target field.
    pub field: FieldId,
    /// Raw submission.
    pub payload: FieldPayload,
}

impl FieldInput {
    /// Creates a field input.
    #[must_use]
    pub const fn new(field: FieldId, payload: FieldPayload) -> Self {
        Self { field, payload }
    }
}

/// Errors returned while validating a complete submission.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SubmissionError {
    /// A submitted field is not part of the process.
    #[error("field {0} is not part of the process")]
    UnknownField(FieldId),

    /// A submitted value does not fit its field.
    #[error(transparent)]
    Field(#[from] FieldValidationError),
}

enum Channel<'a> {
    Scalar(&'a str),
    Files(&'a [FileRef]),
    Json(&'a Value),
    Assignee(UserId),
}

fn channel_of(payload: &FieldPayload) -> Option<Channel<'_>> {
    if let Some(text) = payload.scalar_text() {
        return Some(Channel::Scalar(text));
    }
    if !payload.files.is_empty() {
        return Some(Channel::Files(&payload.files));
    }
    if let Some(value) = payload.json_value() {
        return Some(Channel::Json(value));
    }
    payload.assignee.map(Channel::Assignee)
}

/// Validates one payload against its field and normalizes it.
///
/// Returns `Ok(None)` when an optional field receives no payload.
///
/// # Errors
///
/// Returns [`FieldValidationError`] when the payload is missing for a
/// required field, populates several channels, uses a channel foreign to
/// the field type, or carries a value the type rejects.
pub fn validate_field_value(
    field: &ProcessField,
    payload: &FieldPayload,
) -> Result<Option<FieldValue>, FieldValidationError> {
    let name = || field.name().to_owned();
    if payload.populated_channels() > 1 {
        return Err(FieldValidationError::MultiplePayloads { field: name() });
    }
    let Some(channel) = channel_of(payload) else {
        if field.is_required() {
            return Err(FieldValidationError::Required { field: name() });
        }
        return Ok(None);
    };

    let value = match (field.field_type(), channel) {
        (FieldType::Text, Channel::Scalar(text)) => {
            FieldValue::Scalar(ScalarValue::Text(text.to_owned()))
        }
        (FieldType::Number, Channel::Scalar(text)) => {
            let number = text
                .parse::<f64>()
                .ok()
                .filter(|number| number.is_finite())
                .ok_or_else(|| FieldValidationError::InvalidNumber {
                    field: name(),
                    value: text.to_owned(),
                })?;
            FieldValue::Scalar(ScalarValue::Number(number))
        }
        (FieldType::Date, Channel::Scalar(text)) => {
            let date = NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|_| {
                FieldValidationError::InvalidDate {
                    field: name(),
                    value: text.to_owned(),
                }
            })?;
            FieldValue::Scalar(ScalarValue::Date(date))
        }
        (FieldType::Select, Channel::Scalar(text)) => {
            let offered = field.options().is_some_and(|options| options.offers(text));
            if !offered {
                return Err(FieldValidationError::UnknownChoice {
                    field: name(),
                    value: text.to_owned(),
                });
            }
            FieldValue::Scalar(ScalarValue::Select(text.to_owned()))
        }
        (FieldType::File, Channel::Files(files)) => FieldValue::Files(files.to_vec()),
        (FieldType::Json, Channel::Json(value)) => FieldValue::Json(value.clone()),
        (FieldType::Json, Channel::Scalar(text)) => {
            let parsed = serde_json::from_str::<Value>(text).map_err(|err| {
                FieldValidationError::InvalidJson {
                    field: name(),
                    reason: err.to_string(),
                }
            })?;
            FieldValue::Json(parsed)
        }
        (FieldType::Assignee, Channel::Assignee(user)) => FieldValue::Assignee(user),
        (FieldType::Assignee, Channel::Scalar(text)) => {
            let uuid = Uuid::parse_str(text).map_err(|_| FieldValidationError::InvalidAssignee {
                field: name(),
                value: text.to_owned(),
            })?;
            FieldValue::Assignee(UserId::from_uuid(uuid))
        }
        (field_type, _) => {
            return Err(FieldValidationError::WrongPayload {
                field: name(),
                field_type,
            });
        }
    };
    Ok(Some(value))
}

/// Returns whether `field` is visible given the task's other values.
///
/// Fields without a condition are always visible.
#[must_use]
pub fn is_field_visible(field: &ProcessField, values: &BTreeMap<FieldId, FieldValue>) -> bool {
    field.condition().is_none_or(|condition| {
        condition.is_satisfied_by(values.get(&condition.condition_field))
    })
}

/// Validates a complete submission for a new task.
///
/// Fields are visited in definition order so that every condition reads a
/// value that has already been normalized. With `enforce_conditions` set,
/// hidden fields must stay empty and are exempt from `required`.
///
/// # Errors
///
/// Returns [`SubmissionError::UnknownField`] for foreign fields and
/// [`SubmissionError::Field`] for the first field that fails validation.
pub fn validate_submission(
    definition: &ProcessDefinition,
    inputs: &[FieldInput],
    enforce_conditions: bool,
) -> Result<BTreeMap<FieldId, FieldValue>, SubmissionError> {
    let mut submitted: BTreeMap<FieldId, &FieldPayload> = BTreeMap::new();
    let mut seen = BTreeSet::new();
    for input in inputs {
        let field = definition
            .field(input.field)
            .ok_or(SubmissionError::UnknownField(input.field))?;
        if !seen.insert(input.field) {
            return Err(FieldValidationError::DuplicateSubmission {
                field: field.name().to_owned(),
            }
            .into());
        }
        submitted.insert(input.field, &input.payload);
    }

    let empty = FieldPayload::empty();
    let mut values = BTreeMap::new();
    for field in definition.fields() {
        let payload = submitted.get(&field.id()).copied().unwrap_or(&empty);
        if enforce_conditions && !is_field_visible(field, &values) {
            if payload.populated_channels() > 0 {
                return Err(FieldValidationError::HiddenField {
                    field: field.name().to_owned(),
                }
                .into());
            }
            continue;
        }
        if let Some(value) = validate_field_value(field, payload)? {
            values.insert(field.id(), value);
        }
    }
    Ok(values)
}
