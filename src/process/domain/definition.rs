//! Process definition aggregate root.

use super::{
    Action, ActionId, ActionType, FieldId, FieldSpec, FieldType, ProcessActionRole,
    ProcessDomainError, ProcessField, ProcessId, RoleRule, RoleRuleId,
};
use crate::directory::domain::{DirectoryUser, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Maximum length of a task title prefix.
const MAX_PREFIX_LENGTH: usize = 8;

/// Validated task title prefix such as `PR` or `BT`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessPrefix(String);

impl ProcessPrefix {
    /// Creates a validated prefix.
    ///
    /// The input is trimmed and uppercased.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessDomainError::InvalidPrefix`] unless the prefix has
    /// 1-8 ASCII letters or digits.
    pub fn new(value: impl Into<String>) -> Result<Self, ProcessDomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_ascii_uppercase();
        let is_valid = !normalized.is_empty()
            && normalized.len() <= MAX_PREFIX_LENGTH
            && normalized.chars().all(|ch| ch.is_ascii_alphanumeric());
        if !is_valid {
            return Err(ProcessDomainError::InvalidPrefix(raw));
        }
        Ok(Self(normalized))
    }

    /// Returns the prefix as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProcessPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parameter object for defining a new process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProcess {
    /// Process name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Template version, starting at 1.
    pub version: u32,
    /// Task title prefix.
    pub prefix: ProcessPrefix,
}

/// Parameter object for reconstructing a persisted definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedProcessData {
    /// Persisted identifier.
    pub id: ProcessId,
    /// Persisted name.
    pub name: String,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted version.
    pub version: u32,
    /// Persisted title prefix.
    pub prefix: ProcessPrefix,
    /// Persisted activation flag.
    pub active: bool,
    /// Persisted publication flag.
    pub published: bool,
    /// Persisted creator allow-list.
    pub allowed_creators: BTreeSet<UserId>,
    /// Persisted fields, in any order.
    pub fields: Vec<ProcessField>,
    /// Persisted actions.
    pub actions: Vec<Action>,
    /// Persisted role rules.
    pub role_rules: Vec<ProcessActionRole>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Versioned process template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDefinition {
    id: ProcessId,
    name: String,
    description: Option<String>,
    version: u32,
    prefix: ProcessPrefix,
    active: bool,
    published: bool,
    allowed_creators: BTreeSet<UserId>,
    fields: Vec<ProcessField>,
    actions: Vec<Action>,
    role_rules: Vec<ProcessActionRole>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProcessDefinition {
    /// Creates an unpublished, inactive definition with no fields or actions.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessDomainError::EmptyProcessName`] or
    /// [`ProcessDomainError::InvalidVersion`] when validation fails.
    pub fn new(request: NewProcess, clock: &impl Clock) -> Result<Self, ProcessDomainError> {
        let name = request.name.trim().to_owned();
        if name.is_empty() {
            return Err(ProcessDomainError::EmptyProcessName);
        }
        if request.version == 0 {
            return Err(ProcessDomainError::InvalidVersion(request.version));
        }
        let timestamp = clock.utc();
        Ok(Self {
            id: ProcessId::new(),
            name,
            description: request.description,
            version: request.version,
            prefix: request.prefix,
            active: false,
            published: false,
            allowed_creators: BTreeSet::new(),
            fields: Vec::new(),
            actions: Vec::new(),
            role_rules: Vec::new(),
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a definition from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedProcessData) -> Self {
        let mut fields = data.fields;
        sort_fields(&mut fields);
        Self {
            id: data.id,
            name: data.name,
            description: data.description,
            version: data.version,
            prefix: data.prefix,
            active: data.active,
            published: data.published,
            allowed_creators: data.allowed_creators,
            fields,
            actions: data.actions,
            role_rules: data.role_rules,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the process identifier.
    #[must_use]
    pub const fn id(&self) -> ProcessId {
        self.id
    }

    /// Returns the process name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the template version.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Returns the task title prefix.
    #[must_use]
    pub const fn prefix(&self) -> &ProcessPrefix {
        &self.prefix
    }

    /// Returns whether new tasks may be created.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns whether the definition is locked.
    #[must_use]
    pub const fn is_published(&self) -> bool {
        self.published
    }

    /// Returns the users allowed to start this process.
    #[must_use]
    pub const fn allowed_creators(&self) -> &BTreeSet<UserId> {
        &self.allowed_creators
    }

    /// Returns the fields ordered by `order`, then name.
    #[must_use]
    pub fn fields(&self) -> &[ProcessField] {
        &self.fields
    }

    /// Returns the actions in authoring order.
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Returns the role rules in authoring order.
    #[must_use]
    pub fn role_rules(&self) -> &[ProcessActionRole] {
        &self.role_rules
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Finds a field of this process.
    #[must_use]
    pub fn field(&self, id: FieldId) -> Option<&ProcessField> {
        self.fields.iter().find(|field| field.id() == id)
    }

    /// Finds an action of this process.
    #[must_use]
    pub fn action(&self, id: ActionId) -> Option<&Action> {
        self.actions.iter().find(|action| action.id() == id)
    }

    /// Returns the rules governing `action`.
    pub fn rules_for(&self, action: ActionId) -> impl Iterator<Item = &ProcessActionRole> {
        self.role_rules
            .iter()
            .filter(move |rule| rule.action_id() == action)
    }

    /// Returns every action referenced by at least one role rule.
    #[must_use]
    pub fn governed_actions(&self) -> BTreeSet<ActionId> {
        self.role_rules
            .iter()
            .map(ProcessActionRole::action_id)
            .collect()
    }

    /// Returns the fields holding user references.
    pub fn assignee_fields(&self) -> impl Iterator<Item = &ProcessField> {
        self.fields
            .iter()
            .filter(|field| field.field_type() == FieldType::Assignee)
    }

    /// Returns whether `user` may start a task of this process.
    ///
    /// Staff bypass the allow-list; nobody may start an inactive process.
    #[must_use]
    pub fn can_be_started_by(&self, user: &DirectoryUser) -> bool {
        self.active && (user.is_staff() || self.allowed_creators.contains(&user.id()))
    }

    /// Adds a field.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessDomainError`] when the definition is locked, the
    /// name is blank or taken, options are supplied for a non-SELECT field,
    /// or the condition does not reference an earlier field of this process.
    pub fn add_field(
        &mut self,
        spec: FieldSpec,
        clock: &impl Clock,
    ) -> Result<FieldId, ProcessDomainError> {
        self.ensure_editable()?;
        let name = spec.name.trim().to_owned();
        if name.is_empty() {
            return Err(ProcessDomainError::EmptyFieldName);
        }
        if self.fields.iter().any(|field| field.name() == name) {
            return Err(ProcessDomainError::DuplicateFieldName(name));
        }
        if spec.options.is_some() && spec.field_type != FieldType::Select {
            return Err(ProcessDomainError::OptionsNotAllowed {
                field: name,
                field_type: spec.field_type,
            });
        }
        if let Some(condition) = spec.condition.as_ref() {
            let condition_field = self.field(condition.condition_field).ok_or_else(|| {
                ProcessDomainError::UnknownConditionField {
                    field: name.clone(),
                }
            })?;
            if condition_field.order() >= spec.order {
                return Err(ProcessDomainError::ConditionOrder {
                    field: name,
                    condition_field: condition_field.name().to_owned(),
                });
            }
        }

        let field = ProcessField::from_spec(self.id, FieldSpec { name, ..spec });
        let field_id = field.id();
        self.fields.push(field);
        sort_fields(&mut self.fields);
        self.touch(clock);
        Ok(field_id)
    }

    /// Adds an action.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessDomainError`] when the definition is locked or the
    /// name is blank or taken.
    pub fn add_action(
        &mut self,
        name: impl Into<String>,
        description: Option<String>,
        action_type: ActionType,
        clock: &impl Clock,
    ) -> Result<ActionId, ProcessDomainError> {
        self.ensure_editable()?;
        let raw = name.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ProcessDomainError::EmptyActionName);
        }
        if self.actions.iter().any(|action| action.name() == trimmed) {
            return Err(ProcessDomainError::DuplicateActionName(trimmed.to_owned()));
        }
        let action = Action::new(self.id, trimmed.to_owned(), description, action_type);
        let action_id = action.id();
        self.actions.push(action);
        self.touch(clock);
        Ok(action_id)
    }

    /// Adds a role rule for one of this process's actions.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessDomainError`] when the definition is locked, the
    /// action is foreign, or the same rule already governs the action.
    pub fn add_role_rule(
        &mut self,
        action_id: ActionId,
        rule: RoleRule,
        clock: &impl Clock,
    ) -> Result<RoleRuleId, ProcessDomainError> {
        self.ensure_editable()?;
        if self.action(action_id).is_none() {
            return Err(ProcessDomainError::UnknownAction {
                process_id: self.id,
                action_id,
            });
        }
        if self.rules_for(action_id).any(|existing| existing.rule() == rule) {
            return Err(ProcessDomainError::DuplicateRoleRule(action_id));
        }
        let role = ProcessActionRole::new(self.id, action_id, rule);
        let role_id = role.id();
        self.role_rules.push(role);
        self.touch(clock);
        Ok(role_id)
    }

    /// Allows a user to start tasks of this process.
    ///
    /// Returns `false` when the user was already allowed.
    pub fn allow_creator(&mut self, user: UserId, clock: &impl Clock) -> bool {
        let inserted = self.allowed_creators.insert(user);
        if inserted {
            self.touch(clock);
        }
        inserted
    }

    /// Locks the definition and activates it.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessDomainError::AlreadyPublished`] when called twice.
    pub fn publish(&mut self, clock: &impl Clock) -> Result<(), ProcessDomainError> {
        if self.published {
            return Err(ProcessDomainError::AlreadyPublished(self.id));
        }
        self.published = true;
        self.active = true;
        self.touch(clock);
        Ok(())
    }

    /// Toggles whether new tasks may be created.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessDomainError::NotPublished`] for drafts.
    pub fn set_active(&mut self, active: bool, clock: &impl Clock) -> Result<(), ProcessDomainError> {
        if !self.published {
            return Err(ProcessDomainError::NotPublished(self.id));
        }
        self.active = active;
        self.touch(clock);
        Ok(())
    }

    /// Fails when the definition has been published.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessDomainError::DefinitionLocked`] once published.
    pub const fn ensure_editable(&self) -> Result<(), ProcessDomainError> {
        if self.published {
            return Err(ProcessDomainError::DefinitionLocked(self.id));
        }
        Ok(())
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

fn sort_fields(fields: &mut [ProcessField]) {
    fields.sort_by(|left, right| {
        left.order()
            .cmp(&right.order())
            .then_with(|| left.name().cmp(right.name()))
    });
}
