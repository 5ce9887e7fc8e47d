//! `PostgreSQL` task store: atomic writes, compare-and-swap guards, the
//! permission projection and log ordering.

use chrono::{DateTime, TimeZone, Utc};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use std::collections::BTreeSet;
use taskflow::authorization::{
    domain::{PermissionKey, ReconcileOutcome, TaskPermission},
    ports::PermissionRepository,
};
use taskflow::directory::domain::UserId;
use taskflow::process::domain::{ActionId, FieldId, FieldValue, ProcessId, RoleType, ScalarValue};
use taskflow::task::{
    domain::{
        ActionLogId, PersistedActionLogData, Task, TaskActionLog, TaskData, TaskDataHistory,
        TaskTitle,
    },
    ports::{FieldUpdate, TaskCreation, TaskRepository, TaskRepositoryError, TransitionCommit},
};
use taskflow::workflow::domain::StateId;

use crate::postgres::helpers::{StoreContext, store_context};

#[fixture]
fn granted_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn task_titled(title: &str, creator: UserId, state: StateId) -> Task {
    Task::new(
        ProcessId::new(),
        TaskTitle::from_persisted(title.to_owned()),
        creator,
        state,
        &DefaultClock,
    )
}

fn text(value: &str) -> FieldValue {
    FieldValue::Scalar(ScalarValue::Text(value.to_owned()))
}

fn grant(task: &Task, action: ActionId, user: UserId, at: DateTime<Utc>) -> TaskPermission {
    let key = PermissionKey {
        task_id: task.id(),
        action_id: action,
        user_id: user,
    };
    TaskPermission::new(key, RoleType::SpecificUser, at)
}

fn hop(
    task: &Task,
    actor: UserId,
    from: StateId,
    to: StateId,
    at: DateTime<Utc>,
) -> TransitionCommit {
    TransitionCommit {
        task_id: task.id(),
        expected_state: from,
        next_state: to,
        updated_at: at,
        log: TaskActionLog::from_persisted(PersistedActionLogData {
            id: ActionLogId::new(),
            task_id: task.id(),
            user_id: actor,
            action_id: ActionId::new(),
            from_state: from,
            to_state: to,
            comment: None,
            attachment: None,
            created_at: at,
        }),
    }
}

async fn stored(
    context: &StoreContext,
    task: &Task,
    data: Vec<TaskData>,
    permissions: Vec<TaskPermission>,
) -> eyre::Result<()> {
    context
        .store
        .create(&TaskCreation {
            task: task.clone(),
            data,
            permissions,
        })
        .await?;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn creation_writes_data_and_permissions_together(
    store_context: eyre::Result<Option<StoreContext>>,
    granted_at: DateTime<Utc>,
) -> eyre::Result<()> {
    let Some(context) = store_context? else {
        return Ok(());
    };
    let creator = UserId::new();
    let task = task_titled("PR2610001", creator, StateId::new());
    let field = FieldId::new();
    let action = ActionId::new();

    stored(
        &context,
        &task,
        vec![TaskData::new(task.id(), field, text("desk"), creator, granted_at)],
        vec![grant(&task, action, creator, granted_at)],
    )
    .await?;

    let found = context
        .store
        .find_by_id(task.id())
        .await?
        .ok_or_else(|| eyre::eyre!("task not stored"))?;
    eyre::ensure!(found.title() == task.title());
    eyre::ensure!(found.state_id() == task.state_id());
    let data = context.store.find_data(task.id()).await?;
    eyre::ensure!(data.iter().map(TaskData::value).eq([&text("desk")]));
    let rows = context.store.find_for_task(task.id()).await?;
    eyre::ensure!(rows.iter().map(TaskPermission::key).eq([PermissionKey {
        task_id: task.id(),
        action_id: action,
        user_id: creator,
    }]));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn taken_title_is_reported_and_nothing_is_written(
    store_context: eyre::Result<Option<StoreContext>>,
    granted_at: DateTime<Utc>,
) -> eyre::Result<()> {
    let Some(context) = store_context? else {
        return Ok(());
    };
    let creator = UserId::new();
    let first = task_titled("PR2610001", creator, StateId::new());
    stored(&context, &first, Vec::new(), Vec::new()).await?;
    let clash = task_titled("PR2610001", creator, StateId::new());
    let grantee = UserId::new();

    let result = context
        .store
        .create(&TaskCreation {
            task: clash.clone(),
            data: Vec::new(),
            permissions: vec![grant(&clash, ActionId::new(), grantee, granted_at)],
        })
        .await;

    eyre::ensure!(
        matches!(&result, Err(TaskRepositoryError::DuplicateTitle(title)) if title == clash.title()),
        "unexpected result {result:?}"
    );
    eyre::ensure!(context.store.find_by_id(clash.id()).await?.is_none());
    eyre::ensure!(context.store.find_for_user(grantee).await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stale_transition_is_refused_without_a_log_row(
    store_context: eyre::Result<Option<StoreContext>>,
) -> eyre::Result<()> {
    let Some(context) = store_context? else {
        return Ok(());
    };
    let actor = UserId::new();
    let (start, approved, denied) = (StateId::new(), StateId::new(), StateId::new());
    let task = task_titled("PR2610001", actor, start);
    stored(&context, &task, Vec::new(), Vec::new()).await?;

    let moved = context
        .store
        .commit_transition(&hop(&task, actor, start, approved, Utc::now()))
        .await?;
    let stale = context
        .store
        .commit_transition(&hop(&task, actor, start, denied, Utc::now()))
        .await;

    eyre::ensure!(moved.state_id() == approved);
    eyre::ensure!(
        matches!(
            stale,
            Err(TaskRepositoryError::ConcurrentModification { task_id, expected })
                if task_id == task.id() && expected == start
        ),
        "unexpected result {stale:?}"
    );
    let logs = context.store.find_logs(task.id()).await?;
    eyre::ensure!(logs.iter().map(TaskActionLog::to_state).eq([approved]));
    let current = context
        .store
        .find_by_id(task.id())
        .await?
        .ok_or_else(|| eyre::eyre!("task vanished"))?;
    eyre::ensure!(current.state_id() == approved);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn logs_sharing_a_timestamp_keep_commit_order(
    store_context: eyre::Result<Option<StoreContext>>,
    granted_at: DateTime<Utc>,
) -> eyre::Result<()> {
    let Some(context) = store_context? else {
        return Ok(());
    };
    let actor = UserId::new();
    let (open, parked) = (StateId::new(), StateId::new());
    let task = task_titled("PR2610001", actor, open);
    stored(&context, &task, Vec::new(), Vec::new()).await?;

    for (from, to) in [(open, parked), (parked, open), (open, parked), (parked, open)] {
        context
            .store
            .commit_transition(&hop(&task, actor, from, to, granted_at))
            .await?;
    }

    let logs = context.store.find_logs(task.id()).await?;
    let reached: Vec<StateId> = logs.iter().map(TaskActionLog::to_state).collect();
    eyre::ensure!(
        reached == [parked, open, parked, open],
        "logs out of commit order: {reached:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn inserting_known_permission_rows_is_a_no_op(
    store_context: eyre::Result<Option<StoreContext>>,
    granted_at: DateTime<Utc>,
) -> eyre::Result<()> {
    let Some(context) = store_context? else {
        return Ok(());
    };
    let creator = UserId::new();
    let task = task_titled("PR2610001", creator, StateId::new());
    stored(&context, &task, Vec::new(), Vec::new()).await?;
    let action = ActionId::new();
    let rows = vec![
        grant(&task, action, creator, granted_at),
        grant(&task, action, UserId::new(), granted_at),
    ];

    let first = context.store.insert_missing(&rows).await?;
    let second = context.store.insert_missing(&rows).await?;

    eyre::ensure!((first, second) == (2, 0), "inserted {first} then {second}");
    eyre::ensure!(context.store.find_for_task(task.id()).await?.len() == 2);
    eyre::ensure!(context.store.exists(task.id(), action, creator).await?);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reconcile_keeps_shared_rows_and_swaps_the_rest(
    store_context: eyre::Result<Option<StoreContext>>,
    granted_at: DateTime<Utc>,
) -> eyre::Result<()> {
    let Some(context) = store_context? else {
        return Ok(());
    };
    let (kept, dropped, added) = (UserId::new(), UserId::new(), UserId::new());
    let task = task_titled("PR2610001", kept, StateId::new());
    let action = ActionId::new();
    stored(
        &context,
        &task,
        Vec::new(),
        vec![
            grant(&task, action, kept, granted_at),
            grant(&task, action, dropped, granted_at),
        ],
    )
    .await?;
    let later = Utc::now();

    let outcome = context
        .store
        .reconcile(
            task.id(),
            &[grant(&task, action, kept, later), grant(&task, action, added, later)],
        )
        .await?;

    eyre::ensure!(
        outcome
            == ReconcileOutcome {
                inserted: 1,
                removed: 1,
            },
        "unexpected outcome {outcome:?}"
    );
    let rows = context.store.find_for_task(task.id()).await?;
    let holders: BTreeSet<UserId> = rows.iter().map(TaskPermission::user_id).collect();
    eyre::ensure!(holders == BTreeSet::from([kept, added]));
    let kept_row = rows
        .iter()
        .find(|row| row.user_id() == kept)
        .ok_or_else(|| eyre::eyre!("kept row missing"))?;
    eyre::ensure!(kept_row.granted_at() == granted_at);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn field_update_from_a_stale_read_changes_nothing(
    store_context: eyre::Result<Option<StoreContext>>,
    granted_at: DateTime<Utc>,
) -> eyre::Result<()> {
    let Some(context) = store_context? else {
        return Ok(());
    };
    let (author, editor) = (UserId::new(), UserId::new());
    let state = StateId::new();
    let task = task_titled("PR2610001", author, state);
    let field = FieldId::new();
    let original = TaskData::new(task.id(), field, text("desk"), author, granted_at);
    stored(&context, &task, vec![original.clone()], Vec::new()).await?;
    let now = Utc::now();
    let edit = |expected: &str, value: &str| FieldUpdate {
        task_id: task.id(),
        field_id: field,
        expected_state: state,
        expected_value: Some(text(expected)),
        value: Some(TaskData::new(task.id(), field, text(value), editor, now)),
        history: Some(TaskDataHistory::superseded(&original, editor, now)),
        permissions: None,
        updated_at: now,
    };

    let stale = context.store.apply_field_update(&edit("lamp", "chair")).await;
    let untouched = context.store.find_data(task.id()).await?;
    let accepted = context.store.apply_field_update(&edit("desk", "chair")).await;

    eyre::ensure!(
        matches!(
            stale,
            Err(TaskRepositoryError::StaleFieldValue { task_id, field_id })
                if task_id == task.id() && field_id == field
        ),
        "unexpected result {stale:?}"
    );
    eyre::ensure!(untouched.iter().map(TaskData::value).eq([&text("desk")]));
    eyre::ensure!(matches!(accepted, Ok(None)), "unexpected result {accepted:?}");
    let history = context.store.find_history(task.id(), field).await?;
    eyre::ensure!(history.iter().map(TaskDataHistory::old_value).eq([&text("desk")]));
    Ok(())
}
