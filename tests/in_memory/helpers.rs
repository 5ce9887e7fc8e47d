//! Shared purchase-request world for in-memory integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use taskflow::config::EngineConfig;
use taskflow::directory::{
    adapters::memory::InMemoryOrgDirectory,
    domain::{Department, DirectoryUser, Role, UserId},
};
use taskflow::process::{
    adapters::memory::InMemoryProcessRepository,
    domain::{
        ActionId, ActionType, FieldId, FieldPayload, FieldSpec, FieldType, NewProcess, ProcessId,
        ProcessPrefix, RoleRule,
    },
    services::ProcessAuthoringService,
};
use taskflow::task::{
    adapters::memory::{
        InMemoryBlobStore, InMemoryLabelCatalog, InMemoryTaskStore, RecordingNotifier,
    },
    services::{
        CreateTaskRequest, PermissionMaintenanceService, TaskActionExecutor,
        TaskLifecycleService, TaskPorts, TaskQueryService,
    },
};
use taskflow::workflow::{
    adapters::memory::InMemoryWorkflowRepository,
    domain::{StateId, StateType},
};

/// Authoring service wired to in-memory adapters.
pub type Authoring = ProcessAuthoringService<
    InMemoryProcessRepository,
    InMemoryWorkflowRepository,
    InMemoryOrgDirectory,
    DefaultClock,
>;

/// Lifecycle service wired to in-memory adapters.
pub type Lifecycle = TaskLifecycleService<
    InMemoryProcessRepository,
    InMemoryWorkflowRepository,
    InMemoryOrgDirectory,
    InMemoryTaskStore,
    InMemoryBlobStore,
    DefaultClock,
>;

/// Executor wired to in-memory adapters and the recording notifier.
pub type Executor = TaskActionExecutor<
    InMemoryProcessRepository,
    InMemoryWorkflowRepository,
    InMemoryOrgDirectory,
    InMemoryTaskStore,
    RecordingNotifier,
    DefaultClock,
>;

/// Query service wired to in-memory adapters.
pub type Queries = TaskQueryService<
    InMemoryProcessRepository,
    InMemoryWorkflowRepository,
    InMemoryOrgDirectory,
    InMemoryTaskStore,
    InMemoryBlobStore,
    InMemoryLabelCatalog,
>;

/// Maintenance service wired to in-memory adapters.
pub type Maintenance = PermissionMaintenanceService<
    InMemoryProcessRepository,
    InMemoryWorkflowRepository,
    InMemoryOrgDirectory,
    InMemoryTaskStore,
    DefaultClock,
>;

/// Purchase request process authored through the public services.
///
/// Submit is open to the requestor, Approve to the "Manager" role and
/// Reject to the requestor's manager.
pub struct PurchaseWorld {
    pub directory: Arc<InMemoryOrgDirectory>,
    pub store: Arc<InMemoryTaskStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub authoring: Authoring,
    pub lifecycle: Lifecycle,
    pub executor: Executor,
    pub queries: Queries,
    pub maintenance: Maintenance,
    pub process: ProcessId,
    pub item: FieldId,
    pub amount: FieldId,
    pub submit: ActionId,
    pub approve: ActionId,
    pub reject: ActionId,
    pub start: StateId,
    pub pending: StateId,
    pub closed: StateId,
    pub denied: StateId,
    pub manager_role: Role,
    pub procurement: Department,
    /// Requestor reporting to `mark`.
    pub rina: UserId,
    /// Manager.
    pub mark: UserId,
    /// Colleague without a role.
    pub nick: UserId,
}

impl PurchaseWorld {
    /// Authors the process and registers its users.
    ///
    /// # Errors
    ///
    /// Returns an error when any authoring step fails.
    pub async fn new() -> eyre::Result<Self> {
        let clock = Arc::new(DefaultClock);
        let processes = Arc::new(InMemoryProcessRepository::new());
        let workflows = Arc::new(InMemoryWorkflowRepository::new());
        let directory = Arc::new(InMemoryOrgDirectory::new());
        let store = Arc::new(InMemoryTaskStore::new());
        let blobs = Arc::new(InMemoryBlobStore::new("https://files.example.test"));
        let labels = Arc::new(InMemoryLabelCatalog::new());
        let notifier = Arc::new(RecordingNotifier::new());

        let procurement = Department::new("Procurement")?;
        let manager_role = Role::new("Manager")?;
        directory.add_department(procurement.clone())?;
        directory.add_role(manager_role.clone())?;
        let mark = DirectoryUser::new("mark")?
            .with_department(procurement.id())
            .with_role(manager_role.id());
        let rina = DirectoryUser::new("rina")?
            .with_department(procurement.id())
            .with_supervisor(mark.id())?;
        let nick = DirectoryUser::new("nick")?.with_department(procurement.id());
        let (rina_id, mark_id, nick_id) = (rina.id(), mark.id(), nick.id());
        directory.add_user(mark)?;
        directory.add_user(rina)?;
        directory.add_user(nick)?;

        let authoring = ProcessAuthoringService::new(
            Arc::clone(&processes),
            Arc::clone(&workflows),
            Arc::clone(&directory),
            Arc::clone(&clock),
        );
        let process = authoring
            .define_process(NewProcess {
                name: "Purchase Request".to_owned(),
                description: None,
                version: 1,
                prefix: ProcessPrefix::new("PR")?,
            })
            .await?
            .id();
        let item = authoring
            .add_field(process, FieldSpec::new("Item", FieldType::Text, 1).required())
            .await?;
        let amount = authoring
            .add_field(process, FieldSpec::new("Amount", FieldType::Number, 2).required())
            .await?;
        let submit = authoring
            .add_action(process, "Submit", None, ActionType::Confirm)
            .await?;
        let approve = authoring
            .add_action(process, "Approve", None, ActionType::Approve)
            .await?;
        let reject = authoring
            .add_action(process, "Reject", None, ActionType::Reject)
            .await?;
        authoring
            .add_role_rule(process, submit, RoleRule::Requestor)
            .await?;
        authoring
            .add_role_rule(
                process,
                approve,
                RoleRule::SpecificRole {
                    role: manager_role.id(),
                },
            )
            .await?;
        authoring
            .add_role_rule(process, reject, RoleRule::RequestorManager)
            .await?;

        let start = authoring
            .register_state("START", None, StateType::Start)
            .await?
            .id();
        let pending = authoring
            .register_state("PENDING_APPROVE", None, StateType::PendingApprove)
            .await?
            .id();
        let closed = authoring
            .register_state("CLOSED", None, StateType::Closed)
            .await?
            .id();
        let denied = authoring
            .register_state("DENIED", None, StateType::Denied)
            .await?
            .id();
        let submitted = authoring.add_transition(process, start, pending).await?;
        let approved = authoring.add_transition(process, pending, closed).await?;
        let rejected = authoring.add_transition(process, pending, denied).await?;
        authoring.bind_action(process, submit, submitted).await?;
        authoring.bind_action(process, approve, approved).await?;
        authoring.bind_action(process, reject, rejected).await?;
        authoring.allow_creator(process, rina_id).await?;
        authoring.publish(process).await?;

        let ports = TaskPorts::new(
            processes,
            workflows,
            Arc::clone(&directory),
            Arc::clone(&store),
        );
        let config = EngineConfig::default();
        let lifecycle = TaskLifecycleService::new(
            ports.clone(),
            Arc::clone(&blobs),
            config.clone(),
            Arc::clone(&clock),
        );
        let executor = TaskActionExecutor::new(
            ports.clone(),
            Arc::clone(&notifier),
            &config,
            Arc::clone(&clock),
        );
        let queries = TaskQueryService::new(ports.clone(), blobs, labels);
        let maintenance = PermissionMaintenanceService::new(ports, &config, clock);

        Ok(Self {
            directory,
            store,
            notifier,
            authoring,
            lifecycle,
            executor,
            queries,
            maintenance,
            process,
            item,
            amount,
            submit,
            approve,
            reject,
            start,
            pending,
            closed,
            denied,
            manager_role,
            procurement,
            rina: rina_id,
            mark: mark_id,
            nick: nick_id,
        })
    }

    /// Request by rina for `item` at `amount`.
    #[must_use]
    pub fn request(&self, item: &str, amount: &str) -> CreateTaskRequest {
        CreateTaskRequest::new(self.process, self.rina)
            .with_field(self.item, FieldPayload::scalar(item))
            .with_field(self.amount, FieldPayload::scalar(amount))
    }
}
