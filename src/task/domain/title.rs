//! Human-readable task titles such as `PR2403007`.

use crate::process::domain::ProcessPrefix;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique task title: process prefix, two-digit year and month, then the
/// zero-padded sequence of the task within that month.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskTitle(String);

impl TaskTitle {
    /// Returns the shared leading part of every title generated for
    /// `prefix` in the month of `at`.
    #[must_use]
    pub fn month_prefix(prefix: &ProcessPrefix, at: DateTime<Utc>) -> String {
        format!("{prefix}{}", at.format("%y%m"))
    }

    /// Builds the title following `existing` titles of the same month.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use taskflow::process::domain::ProcessPrefix;
    /// use taskflow::task::domain::TaskTitle;
    ///
    /// let prefix = ProcessPrefix::new("PR").expect("valid prefix");
    /// let at = Utc.with_ymd_and_hms(2024, 3, 9, 10, 0, 0).single().expect("valid time");
    /// let title = TaskTitle::generate(&prefix, at, 6, 3);
    /// assert_eq!(title.as_str(), "PR2403007");
    /// ```
    #[must_use]
    pub fn generate(
        prefix: &ProcessPrefix,
        at: DateTime<Utc>,
        existing: usize,
        width: usize,
    ) -> Self {
        let sequence = existing.saturating_add(1);
        Self(format!(
            "{}{sequence:0width$}",
            Self::month_prefix(prefix, at)
        ))
    }

    /// Wraps a title read from storage.
    #[must_use]
    pub const fn from_persisted(value: String) -> Self {
        Self(value)
    }

    /// Returns the title as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
