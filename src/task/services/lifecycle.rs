//! Service layer for task creation, field edits and uploads.

use super::{TaskPorts, TaskServiceError, TaskServiceResult, dependencies::context_from};
use crate::authorization::{
    domain::TaskContext,
    ports::PermissionRepository,
    services::PermissionCacheService,
};
use crate::config::EngineConfig;
use crate::directory::{domain::UserId, ports::OrgDirectory};
use crate::process::{
    domain::{
        FieldId, FieldInput, FieldPayload, FieldType, FieldValidationError, FieldValue, FileRef,
        ProcessDefinition, ProcessField, ProcessId, is_field_visible, validate_field_value,
        validate_submission,
    },
    ports::ProcessRepository,
};
use crate::task::{
    domain::{Task, TaskData, TaskDataHistory, TaskId, TaskTitle},
    ports::{BlobStore, FieldUpdate, TaskCreation, TaskRepository, TaskRepositoryError},
};
use crate::workflow::{domain::StateId, ports::WorkflowRepository};
use mockable::Clock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTaskRequest {
    process_id: ProcessId,
    creator: UserId,
    fields: Vec<FieldInput>,
}

impl CreateTaskRequest {
    /// Creates a request without field values.
    #[must_use]
    pub const fn new(process_id: ProcessId, creator: UserId) -> Self {
        Self {
            process_id,
            creator,
            fields: Vec::new(),
        }
    }

    /// Adds one submitted field.
    #[must_use]
    pub fn with_field(mut self, field: FieldId, payload: FieldPayload) -> Self {
        self.fields.push(FieldInput::new(field, payload));
        self
    }

    /// Replaces the submitted fields.
    #[must_use]
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = FieldInput>) -> Self {
        self.fields = fields.into_iter().collect();
        self
    }
}

/// Creates tasks and edits their field values.
pub struct TaskLifecycleService<P, W, D, S, B, C>
where
    P: ProcessRepository,
    W: WorkflowRepository,
    D: OrgDirectory,
    S: TaskRepository + PermissionRepository,
    B: BlobStore,
    C: Clock + Send + Sync,
{
    ports: TaskPorts<P, W, D, S>,
    blobs: Arc<B>,
    permissions: PermissionCacheService<S, D, C>,
    config: EngineConfig,
    clock: Arc<C>,
}

impl<P, W, D, S, B, C> TaskLifecycleService<P, W, D, S, B, C>
where
    P: ProcessRepository,
    W: WorkflowRepository,
    D: OrgDirectory,
    S: TaskRepository + PermissionRepository,
    B: BlobStore,
    C: Clock + Send + Sync,
{
    /// Creates a lifecycle service.
    #[must_use]
    pub fn new(
        ports: TaskPorts<P, W, D, S>,
        blobs: Arc<B>,
        config: EngineConfig,
        clock: Arc<C>,
    ) -> Self {
        let permissions = ports.permission_cache(&config, Arc::clone(&clock));
        Self {
            ports,
            blobs,
            permissions,
            config,
            clock,
        }
    }

    /// Creates a task in its process's start state.
    ///
    /// The task, its field values and its permission rows are written in
    /// one atomic unit. A title claimed by a concurrent creation is retried
    /// up to [`EngineConfig::max_title_attempts`] times.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::InvalidProcess`] when the process is
    /// unknown, inactive or has no start state,
    /// [`TaskServiceError::Unauthorized`] when the creator may not start it,
    /// and [`TaskServiceError::Validation`] or
    /// [`TaskServiceError::InvalidField`] when the submission is rejected.
    #[tracing::instrument(
        skip(self, request),
        fields(process_id = %request.process_id, creator = %request.creator)
    )]
    pub async fn create_task(&self, request: CreateTaskRequest) -> TaskServiceResult<Task> {
        let CreateTaskRequest {
            process_id,
            creator: creator_id,
            fields,
        } = request;
        let definition = self.ports.load_definition(process_id).await?;
        if !definition.is_active() {
            return Err(TaskServiceError::InvalidProcess(definition.id()));
        }
        let creator = self
            .ports
            .directory
            .find_user(creator_id)
            .await?
            .ok_or(TaskServiceError::Unauthorized(creator_id))?;
        if !definition.can_be_started_by(&creator) {
            return Err(TaskServiceError::Unauthorized(creator_id));
        }

        let values = validate_submission(
            &definition,
            &fields,
            self.config.enforce_field_conditions,
        )?;
        for (field_id, value) in &values {
            if let Some(field) = definition.field(*field_id) {
                self.ensure_assignee_exists(field, value).await?;
            }
        }
        let initial_state = self.initial_state(&definition).await?;

        let attempts = self.config.max_title_attempts.max(1);
        let mut attempt = 1;
        loop {
            let creation = self
                .prepare_creation(&definition, creator_id, initial_state, &values)
                .await?;
            match self.ports.store.create(&creation).await {
                Ok(()) => {
                    let task = creation.task;
                    info!(
                        task_id = %task.id(),
                        title = %task.title(),
                        permissions = creation.permissions.len(),
                        "task created"
                    );
                    return Ok(task);
                }
                Err(TaskRepositoryError::DuplicateTitle(title)) if attempt < attempts => {
                    debug!(%title, attempt, "task title already taken, retrying");
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Replaces the value of one field.
    ///
    /// Returns the stored value, or `None` when the field was cleared. The
    /// superseded value is appended to the field history; editing an
    /// ASSIGNEE field also rebuilds the task's permission rows, all in one
    /// atomic unit.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Unauthorized`] when `editor` is neither
    /// the creator nor holds a permission on the task,
    /// [`TaskServiceError::TaskFinalized`] when the task reached a terminal
    /// state, [`TaskServiceError::Validation`] when the value is rejected,
    /// and [`TaskServiceError::ConcurrentModification`] when the task moved
    /// or the field changed after it was read.
    #[tracing::instrument(
        skip_all,
        fields(task_id = %task_id, field_id = %field_id, editor = %editor)
    )]
    pub async fn update_field(
        &self,
        task_id: TaskId,
        editor: UserId,
        field_id: FieldId,
        payload: &FieldPayload,
    ) -> TaskServiceResult<Option<TaskData>> {
        let task = self.ports.load_task(task_id).await?;
        let definition = self.ports.load_definition(task.process_id()).await?;
        let field = definition
            .field(field_id)
            .ok_or(TaskServiceError::InvalidField(field_id))?;
        self.ensure_may_edit(&task, editor).await?;
        self.ensure_not_finalized(&task).await?;

        let current = self.ports.store.find_data(task_id).await?;
        let mut values: BTreeMap<FieldId, FieldValue> = current
            .iter()
            .map(|data| (data.field_id(), data.value().clone()))
            .collect();
        let new_value = validate_field_value(field, payload)?;
        if new_value.is_some()
            && self.config.enforce_field_conditions
            && !is_field_visible(field, &values)
        {
            return Err(FieldValidationError::HiddenField {
                field: field.name().to_owned(),
            }
            .into());
        }
        if let Some(value) = new_value.as_ref() {
            self.ensure_assignee_exists(field, value).await?;
        }

        let previous = current.iter().find(|data| data.field_id() == field_id);
        if previous.map(TaskData::value) == new_value.as_ref() {
            return Ok(previous.cloned());
        }

        let now = self.clock.utc();
        let stored = new_value
            .clone()
            .map(|value| TaskData::new(task_id, field_id, value, editor, now));
        let permissions = if field.field_type() == FieldType::Assignee {
            values.remove(&field_id);
            if let Some(value) = new_value {
                values.insert(field_id, value);
            }
            let context = TaskContext::new(task_id, task.process_id(), task.created_by())
                .with_assignees(values.values().filter_map(FieldValue::assignee));
            Some(self.permissions.plan(&context, &definition).await?)
        } else {
            None
        };

        let update = FieldUpdate {
            task_id,
            field_id,
            expected_state: task.state_id(),
            expected_value: previous.map(|data| data.value().clone()),
            value: stored.clone(),
            history: previous.map(|data| TaskDataHistory::superseded(data, editor, now)),
            permissions,
            updated_at: now,
        };
        let outcome = self
            .ports
            .store
            .apply_field_update(&update)
            .await
            .map_err(|err| match err {
                TaskRepositoryError::ConcurrentModification { task_id: id, .. }
                | TaskRepositoryError::StaleFieldValue { task_id: id, .. } => {
                    TaskServiceError::ConcurrentModification(id)
                }
                TaskRepositoryError::NotFound(id) => TaskServiceError::NotFound(id),
                other => TaskServiceError::Repository(other),
            })?;
        info!(
            cleared = stored.is_none(),
            permissions_changed = outcome.is_some_and(|change| change.changed()),
            "task field updated"
        );
        Ok(stored)
    }

    /// Stores an uploaded file and returns its reference.
    ///
    /// The reference can then be submitted through a FILE field or attached
    /// to an action.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Blob`] when the blob store rejects the
    /// upload.
    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        mime_type: &str,
    ) -> TaskServiceResult<FileRef> {
        let file = self.blobs.store(bytes, filename, mime_type).await?;
        info!(reference = %file.reference, "file uploaded");
        Ok(file)
    }

    /// Retrieves a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Repository`] when the lookup fails.
    pub async fn find_by_id(&self, id: TaskId) -> TaskServiceResult<Option<Task>> {
        Ok(self.ports.store.find_by_id(id).await?)
    }

    async fn prepare_creation(
        &self,
        definition: &ProcessDefinition,
        creator: UserId,
        initial_state: StateId,
        values: &BTreeMap<FieldId, FieldValue>,
    ) -> TaskServiceResult<TaskCreation> {
        let month_prefix = TaskTitle::month_prefix(definition.prefix(), self.clock.utc());
        let existing = self
            .ports
            .store
            .count_titles_with_prefix(&month_prefix)
            .await?;
        let title = TaskTitle::generate(
            definition.prefix(),
            self.clock.utc(),
            existing,
            self.config.title_sequence_width,
        );
        let task = Task::new(definition.id(), title, creator, initial_state, &*self.clock);
        let data: Vec<TaskData> = values
            .iter()
            .map(|(field, value)| {
                TaskData::new(task.id(), *field, value.clone(), creator, task.created_at())
            })
            .collect();
        let context = context_from(&task, &data);
        let permissions = self.permissions.plan(&context, definition).await?;
        Ok(TaskCreation {
            task,
            data,
            permissions,
        })
    }

    async fn initial_state(&self, definition: &ProcessDefinition) -> TaskServiceResult<StateId> {
        let machine = self.ports.load_machine(definition.id()).await?;
        if let Some(state) = machine.initial_state() {
            return Ok(state.id());
        }
        self.ports
            .workflows
            .find_fallback_state()
            .await?
            .map(|state| state.id())
            .ok_or(TaskServiceError::InvalidProcess(definition.id()))
    }

    async fn ensure_assignee_exists(
        &self,
        field: &ProcessField,
        value: &FieldValue,
    ) -> TaskServiceResult<()> {
        let Some(user) = value.assignee() else {
            return Ok(());
        };
        if self.ports.directory.find_user(user).await?.is_some() {
            return Ok(());
        }
        Err(FieldValidationError::UnknownAssignee {
            field: field.name().to_owned(),
            user: user.to_string(),
        }
        .into())
    }

    async fn ensure_may_edit(&self, task: &Task, editor: UserId) -> TaskServiceResult<()> {
        if task.created_by() == editor {
            return Ok(());
        }
        let rows = self.ports.store.find_for_task(task.id()).await?;
        if rows.iter().any(|row| row.user_id() == editor) {
            Ok(())
        } else {
            Err(TaskServiceError::Unauthorized(editor))
        }
    }

    async fn ensure_not_finalized(&self, task: &Task) -> TaskServiceResult<()> {
        let state = self.ports.workflows.find_state(task.state_id()).await?;
        if state.is_some_and(|found| found.is_terminal()) {
            return Err(TaskServiceError::TaskFinalized(task.id()));
        }
        Ok(())
    }
}
