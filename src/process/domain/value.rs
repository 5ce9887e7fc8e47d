//! Submitted payloads and the normalized values stored for task fields.

use crate::directory::domain::UserId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reference to a stored blob plus the metadata captured at upload time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileRef {
    /// Opaque blob-store reference.
    pub reference: String,
    /// File name supplied by the uploader.
    pub original_filename: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// MIME type reported by the uploader.
    pub mime_type: String,
}

impl FileRef {
    /// Creates a file reference.
    #[must_use]
    pub fn new(
        reference: impl Into<String>,
        original_filename: impl Into<String>,
        size_bytes: u64,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            reference: reference.into(),
            original_filename: original_filename.into(),
            size_bytes,
            mime_type: mime_type.into(),
        }
    }
}

/// Raw submission for one field, before validation.
///
/// Callers populate exactly one channel; validation decides whether that
/// channel fits the field's declared type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldPayload {
    /// Scalar text channel.
    pub value: Option<String>,
    /// File channel.
    #[serde(default)]
    pub files: Vec<FileRef>,
    /// Structured data channel.
    pub json: Option<Value>,
    /// User reference channel.
    pub assignee: Option<UserId>,
}

impl FieldPayload {
    /// Creates a payload with no channel populated.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a scalar payload.
    #[must_use]
    pub fn scalar(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// Creates a file payload.
    #[must_use]
    pub fn files(files: impl IntoIterator<Item = FileRef>) -> Self {
        Self {
            files: files.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Creates a structured-data payload.
    #[must_use]
    pub fn json(value: Value) -> Self {
        Self {
            json: Some(value),
            ..Self::default()
        }
    }

    /// Creates a user-reference payload.
    #[must_use]
    pub fn assignee(user: UserId) -> Self {
        Self {
            assignee: Some(user),
            ..Self::default()
        }
    }

    /// Returns the scalar channel when it holds non-blank text.
    pub(crate) fn scalar_text(&self) -> Option<&str> {
        self.value
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    /// Returns the structured-data channel unless it is absent or `null`.
    pub(crate) fn json_value(&self) -> Option<&Value> {
        self.json.as_ref().filter(|value| !value.is_null())
    }

    /// Counts the populated channels.
    pub(crate) fn populated_channels(&self) -> usize {
        [
            self.scalar_text().is_some(),
            !self.files.is_empty(),
            self.json_value().is_some(),
            self.assignee.is_some(),
        ]
        .into_iter()
        .filter(|populated| *populated)
        .count()
    }
}

/// Scalar field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ScalarValue {
    /// Free text.
    Text(String),
    /// Finite number.
    Number(f64),
    /// Calendar date.
    Date(NaiveDate),
    /// Chosen SELECT option value.
    Select(String),
}

/// Normalized value of one task field.
///
/// Exactly one shape exists per field type, so a FILE field can never hold
/// a scalar and vice versa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum FieldValue {
    /// TEXT, NUMBER, DATE or SELECT value.
    Scalar(ScalarValue),
    /// One or more uploaded files.
    Files(Vec<FileRef>),
    /// Structured data.
    Json(Value),
    /// Referenced directory user.
    Assignee(UserId),
}

impl FieldValue {
    /// Returns the referenced user for ASSIGNEE values.
    #[must_use]
    pub const fn assignee(&self) -> Option<UserId> {
        match self {
            Self::Assignee(user) => Some(*user),
            Self::Scalar(_) | Self::Files(_) | Self::Json(_) => None,
        }
    }

    /// Returns the file references for FILE values.
    #[must_use]
    pub fn files(&self) -> &[FileRef] {
        match self {
            Self::Files(files) => files.as_slice(),
            Self::Scalar(_) | Self::Json(_) | Self::Assignee(_) => &[],
        }
    }

    /// Renders the value as text for condition comparisons.
    ///
    /// Files have no textual form.
    #[must_use]
    pub fn comparable_text(&self) -> Option<String> {
        match self {
            Self::Scalar(ScalarValue::Text(text) | ScalarValue::Select(text)) => {
                Some(text.clone())
            }
            Self::Scalar(ScalarValue::Number(number)) => Some(number.to_string()),
            Self::Scalar(ScalarValue::Date(date)) => Some(date.format("%Y-%m-%d").to_string()),
            Self::Json(value) => Some(value.to_string()),
            Self::Assignee(user) => Some(user.to_string()),
            Self::Files(_) => None,
        }
    }
}
