//! Engine-wide configuration.
//!
//! Tunables that shape permission resolution, task title generation and
//! field validation. Every field has a default, so partial documents
//! deserialize cleanly.

use serde::{Deserialize, Serialize};

/// Configuration shared by the task and authorization services.
///
/// # Examples
///
/// ```
/// use taskflow::config::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert!(config.enforce_field_conditions);
/// assert_eq!(config.department_head_role_pattern, "manager");
///
/// let lenient = EngineConfig::lenient();
/// assert!(!lenient.enforce_field_conditions);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Case-insensitive fragment a role name must contain for its holder to
    /// count as the head of their department.
    pub department_head_role_pattern: String,
    /// Zero-padded width of the monthly sequence in generated task titles.
    pub title_sequence_width: usize,
    /// Attempts made when a concurrent creation claims the same title.
    pub max_title_attempts: u32,
    /// Supervisor links followed when looking for an active manager of the
    /// requestor; `1` means the direct supervisor only.
    pub max_supervisor_hops: usize,
    /// Whether field conditions hide fields and reject values submitted for
    /// hidden fields.
    pub enforce_field_conditions: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            department_head_role_pattern: "manager".to_owned(),
            title_sequence_width: 3,
            max_title_attempts: 3,
            max_supervisor_hops: 1,
            enforce_field_conditions: true,
        }
    }
}

impl EngineConfig {
    /// Creates a configuration that stores field conditions as metadata only.
    ///
    /// Useful when migrating data authored before conditions were enforced.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            enforce_field_conditions: false,
            ..Self::default()
        }
    }

    /// Returns a copy using a different department-head role pattern.
    #[must_use]
    pub fn with_department_head_role_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.department_head_role_pattern = pattern.into();
        self
    }
}
