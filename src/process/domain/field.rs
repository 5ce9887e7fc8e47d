//! Typed process fields and their visibility conditions.

use super::{FieldId, FieldValue, ParseFieldTypeError, ProcessId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Data type of a process field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Free text.
    Text,
    /// Floating-point number.
    Number,
    /// ISO calendar date.
    Date,
    /// One of a fixed set of choices.
    Select,
    /// One or more uploaded files.
    File,
    /// Structured JSON data, typically a table.
    Json,
    /// Reference to a directory user.
    Assignee,
}

impl FieldType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Date => "date",
            Self::Select => "select",
            Self::File => "file",
            Self::Json => "json",
            Self::Assignee => "assignee",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for FieldType {
    type Error = ParseFieldTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "number" => Ok(Self::Number),
            "date" => Ok(Self::Date),
            "select" => Ok(Self::Select),
            "file" => Ok(Self::File),
            "json" => Ok(Self::Json),
            "assignee" => Ok(Self::Assignee),
            _ => Err(ParseFieldTypeError(value.to_owned())),
        }
    }
}

/// One selectable option of a SELECT field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectChoice {
    /// Stored value.
    pub value: String,
    /// Display label.
    pub label: String,
}

impl SelectChoice {
    /// Creates a choice.
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Field options; only SELECT fields carry them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOptions {
    /// Choices offered by a SELECT field.
    #[serde(default)]
    pub choices: Vec<SelectChoice>,
}

impl FieldOptions {
    /// Creates options from a list of choices.
    #[must_use]
    pub fn with_choices(choices: impl IntoIterator<Item = SelectChoice>) -> Self {
        Self {
            choices: choices.into_iter().collect(),
        }
    }

    /// Returns whether `value` is one of the offered choices.
    #[must_use]
    pub fn offers(&self, value: &str) -> bool {
        self.choices.iter().any(|choice| choice.value == value)
    }
}

/// Comparison applied by a [`FieldCondition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    /// The other field's value equals the operand.
    Equals,
    /// The other field's value is absent or differs from the operand.
    NotEquals,
    /// The other field has a value.
    IsSet,
    /// The other field has no value.
    IsNotSet,
}

/// Makes a field visible only when another, earlier field satisfies a test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCondition {
    /// Field whose value is tested.
    pub condition_field: FieldId,
    /// Comparison to apply.
    pub operator: ConditionOperator,
    /// Operand for `equals` and `not_equals`.
    pub value: Option<String>,
}

impl FieldCondition {
    /// Creates a condition.
    #[must_use]
    pub const fn new(
        condition_field: FieldId,
        operator: ConditionOperator,
        value: Option<String>,
    ) -> Self {
        Self {
            condition_field,
            operator,
            value,
        }
    }

    /// Evaluates the condition against the other field's current value.
    #[must_use]
    pub fn is_satisfied_by(&self, other: Option<&FieldValue>) -> bool {
        let other_text = other.and_then(FieldValue::comparable_text);
        match self.operator {
            ConditionOperator::IsSet => other.is_some(),
            ConditionOperator::IsNotSet => other.is_none(),
            ConditionOperator::Equals => other_text.is_some() && other_text == self.value,
            ConditionOperator::NotEquals => other_text != self.value,
        }
    }
}

/// Parameter object describing a field to add to a definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name, unique within the process.
    pub name: String,
    /// Declared type.
    pub field_type: FieldType,
    /// Display and dependency order.
    pub order: u16,
    /// Whether a value must be supplied.
    pub required: bool,
    /// SELECT options.
    pub options: Option<FieldOptions>,
    /// Optional visibility condition.
    pub condition: Option<FieldCondition>,
}

impl FieldSpec {
    /// Creates an optional field specification without options or condition.
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: FieldType, order: u16) -> Self {
        Self {
            name: name.into(),
            field_type,
            order,
            required: false,
            options: None,
            condition: None,
        }
    }

    /// Marks the field as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets SELECT options.
    #[must_use]
    pub fn with_options(mut self, options: FieldOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Sets a visibility condition.
    #[must_use]
    pub fn with_condition(mut self, condition: FieldCondition) -> Self {
        self.condition = Some(condition);
        self
    }
}

/// Field declared by a process definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessField {
    id: FieldId,
    process_id: ProcessId,
    name: String,
    field_type: FieldType,
    order: u16,
    required: bool,
    options: Option<FieldOptions>,
    condition: Option<FieldCondition>,
}

impl ProcessField {
    /// Builds a field from an already validated specification.
    pub(crate) fn from_spec(process_id: ProcessId, spec: FieldSpec) -> Self {
        Self {
            id: FieldId::new(),
            process_id,
            name: spec.name,
            field_type: spec.field_type,
            order: spec.order,
            required: spec.required,
            options: spec.options,
            condition: spec.condition,
        }
    }

    /// Returns the field identifier.
    #[must_use]
    pub const fn id(&self) -> FieldId {
        self.id
    }

    /// Returns the owning process.
    #[must_use]
    pub const fn process_id(&self) -> ProcessId {
        self.process_id
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared type.
    #[must_use]
    pub const fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Returns the display and dependency order.
    #[must_use]
    pub const fn order(&self) -> u16 {
        self.order
    }

    /// Returns whether a value must be supplied.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Returns SELECT options, if any.
    #[must_use]
    pub const fn options(&self) -> Option<&FieldOptions> {
        self.options.as_ref()
    }

    /// Returns the visibility condition, if any.
    #[must_use]
    pub const fn condition(&self) -> Option<&FieldCondition> {
        self.condition.as_ref()
    }
}
