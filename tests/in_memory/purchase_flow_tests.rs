//! End-to-end purchase request flow through the public services.

use super::helpers::PurchaseWorld;
use std::collections::BTreeSet;
use taskflow::authorization::ports::PermissionRepository;
use taskflow::process::domain::{FieldPayload, RoleType};
use taskflow::task::{ports::TaskRepository, services::TaskServiceError};

#[tokio::test(flavor = "multi_thread")]
async fn request_is_submitted_and_approved_by_a_manager() -> eyre::Result<()> {
    let world = PurchaseWorld::new().await?;

    let task = world
        .lifecycle
        .create_task(world.request("Laptop", "1499.90"))
        .await?;
    let submitted = world
        .executor
        .execute(task.id(), world.rina, world.submit, Some("for the new hire".to_owned()), None)
        .await?;
    let closed = world
        .executor
        .execute(task.id(), world.mark, world.approve, None, None)
        .await?;

    eyre::ensure!(task.state_id() == world.start);
    eyre::ensure!(task.title().as_str().starts_with("PR"));
    eyre::ensure!(submitted.state_id() == world.pending);
    eyre::ensure!(closed.state_id() == world.closed);
    let logs = world.store.find_logs(task.id()).await?;
    eyre::ensure!(
        logs.iter()
            .map(|entry| (entry.from_state(), entry.to_state()))
            .eq([(world.start, world.pending), (world.pending, world.closed)])
    );
    eyre::ensure!(logs.first().and_then(|entry| entry.comment()) == Some("for the new hire"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn colleagues_without_the_manager_role_cannot_approve() -> eyre::Result<()> {
    let world = PurchaseWorld::new().await?;
    let task = world
        .lifecycle
        .create_task(world.request("Chair", "220"))
        .await?;
    world
        .executor
        .execute(task.id(), world.rina, world.submit, None, None)
        .await?;

    let by_colleague = world
        .executor
        .execute(task.id(), world.nick, world.approve, None, None)
        .await;
    let by_requestor = world
        .executor
        .execute(task.id(), world.rina, world.approve, None, None)
        .await;

    eyre::ensure!(matches!(by_colleague, Err(TaskServiceError::Unauthorized(id)) if id == world.nick));
    eyre::ensure!(matches!(by_requestor, Err(TaskServiceError::Unauthorized(id)) if id == world.rina));
    let current = world
        .lifecycle
        .find_by_id(task.id())
        .await?
        .ok_or_else(|| eyre::eyre!("task vanished"))?;
    eyre::ensure!(current.state_id() == world.pending);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn the_requestors_manager_may_reject() -> eyre::Result<()> {
    let world = PurchaseWorld::new().await?;
    let task = world
        .lifecycle
        .create_task(world.request("Standing desk", "640"))
        .await?;

    let rows = world.store.find_for_action(task.id(), world.reject).await?;
    world
        .executor
        .execute(task.id(), world.rina, world.submit, None, None)
        .await?;
    let denied = world
        .executor
        .execute(task.id(), world.mark, world.reject, Some("over budget".to_owned()), None)
        .await?;

    eyre::ensure!(
        rows.iter()
            .map(|row| (row.user_id(), row.role_type()))
            .eq([(world.mark, RoleType::RequestorManager)])
    );
    eyre::ensure!(denied.state_id() == world.denied);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn approvers_are_notified_when_the_request_arrives() -> eyre::Result<()> {
    let world = PurchaseWorld::new().await?;
    let task = world
        .lifecycle
        .create_task(world.request("Monitor", "310"))
        .await?;

    world
        .executor
        .execute(task.id(), world.rina, world.submit, None, None)
        .await?;
    world
        .executor
        .execute(task.id(), world.mark, world.approve, None, None)
        .await?;

    let sent = world.notifier.sent()?;
    let [delivery] = sent.as_slice() else {
        eyre::bail!("expected one delivery, got {}", sent.len());
    };
    eyre::ensure!(delivery.task_id == task.id());
    eyre::ensure!(delivery.state_id == world.pending);
    eyre::ensure!(delivery.recipients == BTreeSet::from([world.mark]));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn field_history_is_appended_on_every_change() -> eyre::Result<()> {
    let world = PurchaseWorld::new().await?;
    let task = world
        .lifecycle
        .create_task(world.request("Keyboard", "80"))
        .await?;

    for amount in ["85", "90", "90", "95"] {
        world
            .lifecycle
            .update_field(task.id(), world.rina, world.amount, &FieldPayload::scalar(amount))
            .await?;
    }

    let history = world.store.find_history(task.id(), world.amount).await?;
    let old_values: Vec<_> = history
        .iter()
        .filter_map(|entry| entry.old_value().comparable_text())
        .collect();
    eyre::ensure!(old_values == ["80", "85", "90"], "got {old_values:?}");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn deactivated_processes_stop_accepting_requests() -> eyre::Result<()> {
    let world = PurchaseWorld::new().await?;
    world.authoring.set_active(world.process, false).await?;

    let result = world
        .lifecycle
        .create_task(world.request("Phone", "700"))
        .await;

    eyre::ensure!(matches!(result, Err(TaskServiceError::InvalidProcess(id)) if id == world.process));
    Ok(())
}
