//! Purchase-request process shared by the task service tests.
//!
//! `START --Submit--> PENDING_APPROVE --Approve--> CLOSED`, with a Reject
//! action leading to `DENIED`. Submit is open to the requestor; Approve and
//! Reject to holders of the "Purchasing Manager" role and to whoever is
//! named in the Reviewer field.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::directory::{
    adapters::memory::InMemoryOrgDirectory,
    domain::{DirectoryUser, Role, UserId},
};
use crate::process::{
    adapters::memory::InMemoryProcessRepository,
    domain::{
        ActionId, ActionType, ConditionOperator, FieldCondition, FieldId, FieldOptions,
        FieldPayload, FieldSpec, FieldType, NewProcess, ProcessDefinition, ProcessPrefix,
        RoleRule, SelectChoice,
    },
    ports::ProcessRepository,
};
use crate::task::{
    adapters::memory::{InMemoryBlobStore, InMemoryLabelCatalog, InMemoryTaskStore},
    ports::NotificationDispatcher,
    services::{
        CreateTaskRequest, PermissionMaintenanceService, TaskActionExecutor,
        TaskLifecycleService, TaskPorts, TaskQueryService,
    },
};
use crate::workflow::{
    adapters::memory::InMemoryWorkflowRepository,
    domain::{State, StateMachine, StateType},
    ports::WorkflowRepository,
};
use mockable::DefaultClock;

pub(super) type Ports = TaskPorts<
    InMemoryProcessRepository,
    InMemoryWorkflowRepository,
    InMemoryOrgDirectory,
    InMemoryTaskStore,
>;

pub(super) type Lifecycle = TaskLifecycleService<
    InMemoryProcessRepository,
    InMemoryWorkflowRepository,
    InMemoryOrgDirectory,
    InMemoryTaskStore,
    InMemoryBlobStore,
    DefaultClock,
>;

pub(super) type Executor<N> = TaskActionExecutor<
    InMemoryProcessRepository,
    InMemoryWorkflowRepository,
    InMemoryOrgDirectory,
    InMemoryTaskStore,
    N,
    DefaultClock,
>;

pub(super) type Queries = TaskQueryService<
    InMemoryProcessRepository,
    InMemoryWorkflowRepository,
    InMemoryOrgDirectory,
    InMemoryTaskStore,
    InMemoryBlobStore,
    InMemoryLabelCatalog,
>;

pub(super) type Maintenance = PermissionMaintenanceService<
    InMemoryProcessRepository,
    InMemoryWorkflowRepository,
    InMemoryOrgDirectory,
    InMemoryTaskStore,
    DefaultClock,
>;

/// Fully wired purchase-request process plus its users.
pub(super) struct Purchase {
    pub(super) processes: Arc<InMemoryProcessRepository>,
    pub(super) workflows: Arc<InMemoryWorkflowRepository>,
    pub(super) directory: Arc<InMemoryOrgDirectory>,
    pub(super) store: Arc<InMemoryTaskStore>,
    pub(super) blobs: Arc<InMemoryBlobStore>,
    pub(super) labels: Arc<InMemoryLabelCatalog>,
    pub(super) definition: ProcessDefinition,
    pub(super) category: FieldId,
    pub(super) amount: FieldId,
    pub(super) justification: FieldId,
    pub(super) reviewer: FieldId,
    pub(super) quote: FieldId,
    pub(super) submit: ActionId,
    pub(super) approve: ActionId,
    pub(super) reject: ActionId,
    pub(super) start: State,
    pub(super) pending: State,
    pub(super) closed: State,
    pub(super) denied: State,
    /// Requestor, allowed to start the process.
    pub(super) alice: UserId,
    /// Purchasing manager.
    pub(super) mike: UserId,
    /// Plain employee, used as a reviewer.
    pub(super) rick: UserId,
    /// Employee with no link to the process.
    pub(super) olga: UserId,
}

impl Purchase {
    pub(super) async fn new() -> Self {
        let clock = DefaultClock;
        let directory = Arc::new(InMemoryOrgDirectory::new());
        let manager_role = Role::new("Purchasing Manager").expect("valid role");
        directory
            .add_role(manager_role.clone())
            .expect("role stored");
        let mike = DirectoryUser::new("mike")
            .expect("valid user")
            .with_role(manager_role.id());
        let alice = DirectoryUser::new("alice")
            .expect("valid user")
            .with_supervisor(mike.id())
            .expect("distinct supervisor");
        let rick = DirectoryUser::new("rick").expect("valid user");
        let olga = DirectoryUser::new("olga").expect("valid user");
        let (alice_id, mike_id, rick_id, olga_id) = (alice.id(), mike.id(), rick.id(), olga.id());
        for user in [alice, mike, rick, olga] {
            directory.add_user(user).expect("user stored");
        }

        let mut definition = ProcessDefinition::new(
            NewProcess {
                name: "Purchase Request".to_owned(),
                description: Some("Buy equipment".to_owned()),
                version: 1,
                prefix: ProcessPrefix::new("PR").expect("valid prefix"),
            },
            &clock,
        )
        .expect("valid process");
        let category = definition
            .add_field(
                FieldSpec::new("Category", FieldType::Select, 1)
                    .required()
                    .with_options(FieldOptions::with_choices([
                        SelectChoice::new("opex", "Operating"),
                        SelectChoice::new("capex", "Capital"),
                    ])),
                &clock,
            )
            .expect("field added");
        let amount = definition
            .add_field(FieldSpec::new("Amount", FieldType::Number, 2).required(), &clock)
            .expect("field added");
        let justification = definition
            .add_field(
                FieldSpec::new("Justification", FieldType::Text, 3).with_condition(
                    FieldCondition::new(
                        category,
                        ConditionOperator::Equals,
                        Some("capex".to_owned()),
                    ),
                ),
                &clock,
            )
            .expect("field added");
        let reviewer = definition
            .add_field(FieldSpec::new("Reviewer", FieldType::Assignee, 4), &clock)
            .expect("field added");
        let quote = definition
            .add_field(FieldSpec::new("Quote", FieldType::File, 5), &clock)
            .expect("field added");

        let submit = definition
            .add_action("Submit", None, ActionType::Confirm, &clock)
            .expect("action added");
        let approve = definition
            .add_action("Approve", None, ActionType::Approve, &clock)
            .expect("action added");
        let reject = definition
            .add_action("Reject", None, ActionType::Reject, &clock)
            .expect("action added");
        definition
            .add_role_rule(submit, RoleRule::Requestor, &clock)
            .expect("rule added");
        for action in [approve, reject] {
            definition
                .add_role_rule(
                    action,
                    RoleRule::SpecificRole {
                        role: manager_role.id(),
                    },
                    &clock,
                )
                .expect("rule added");
            definition
                .add_role_rule(action, RoleRule::Assignee, &clock)
                .expect("rule added");
        }
        definition.allow_creator(alice_id, &clock);
        definition.publish(&clock).expect("published");

        let processes = Arc::new(InMemoryProcessRepository::new());
        processes.store(&definition).await.expect("process stored");

        let workflows = Arc::new(InMemoryWorkflowRepository::new());
        let start = State::new("START", None, StateType::Start).expect("valid state");
        let pending =
            State::new("PENDING_APPROVE", None, StateType::PendingApprove).expect("valid state");
        let closed = State::new("CLOSED", None, StateType::Closed).expect("valid state");
        let denied = State::new("DENIED", None, StateType::Denied).expect("valid state");
        for state in [&start, &pending, &closed, &denied] {
            workflows.store_state(state).await.expect("state stored");
        }
        let mut machine = StateMachine::new(definition.id());
        let submitted = machine
            .add_transition(&start, &pending)
            .expect("transition added");
        let approved = machine
            .add_transition(&pending, &closed)
            .expect("transition added");
        let rejected = machine
            .add_transition(&pending, &denied)
            .expect("transition added");
        machine.bind_action(submit, submitted).expect("bound");
        machine.bind_action(approve, approved).expect("bound");
        machine.bind_action(reject, rejected).expect("bound");
        workflows.save_machine(&machine).await.expect("machine saved");

        Self {
            processes,
            workflows,
            directory,
            store: Arc::new(InMemoryTaskStore::new()),
            blobs: Arc::new(InMemoryBlobStore::default()),
            labels: Arc::new(InMemoryLabelCatalog::new()),
            definition,
            category,
            amount,
            justification,
            reviewer,
            quote,
            submit,
            approve,
            reject,
            start,
            pending,
            closed,
            denied,
            alice: alice_id,
            mike: mike_id,
            rick: rick_id,
            olga: olga_id,
        }
    }

    pub(super) fn ports(&self) -> Ports {
        TaskPorts::new(
            Arc::clone(&self.processes),
            Arc::clone(&self.workflows),
            Arc::clone(&self.directory),
            Arc::clone(&self.store),
        )
    }

    pub(super) fn lifecycle(&self) -> Lifecycle {
        self.lifecycle_with(EngineConfig::default())
    }

    pub(super) fn lifecycle_with(&self, config: EngineConfig) -> Lifecycle {
        TaskLifecycleService::new(
            self.ports(),
            Arc::clone(&self.blobs),
            config,
            Arc::new(DefaultClock),
        )
    }

    pub(super) fn executor<N>(&self, notifier: N) -> Executor<N>
    where
        N: NotificationDispatcher,
    {
        TaskActionExecutor::new(
            self.ports(),
            Arc::new(notifier),
            &EngineConfig::default(),
            Arc::new(DefaultClock),
        )
    }

    pub(super) fn queries(&self) -> Queries {
        TaskQueryService::new(self.ports(), Arc::clone(&self.blobs), Arc::clone(&self.labels))
    }

    pub(super) fn maintenance(&self) -> Maintenance {
        PermissionMaintenanceService::new(
            self.ports(),
            &EngineConfig::default(),
            Arc::new(DefaultClock),
        )
    }

    /// Operating-expense request for 120 created by alice.
    pub(super) fn opex_request(&self) -> CreateTaskRequest {
        CreateTaskRequest::new(self.definition.id(), self.alice)
            .with_field(self.category, FieldPayload::scalar("opex"))
            .with_field(self.amount, FieldPayload::scalar("120"))
    }
}
