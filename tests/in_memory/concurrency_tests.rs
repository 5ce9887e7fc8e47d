//! Competing requests against the same task or month.

use super::helpers::PurchaseWorld;
use std::collections::BTreeSet;
use taskflow::task::{ports::TaskRepository, services::TaskServiceError};

#[tokio::test(flavor = "multi_thread")]
async fn a_decision_on_an_already_decided_task_is_refused() -> eyre::Result<()> {
    let world = PurchaseWorld::new().await?;
    let task = world
        .lifecycle
        .create_task(world.request("Projector", "900"))
        .await?;
    world
        .executor
        .execute(task.id(), world.rina, world.submit, None, None)
        .await?;

    let (approved, rejected) = tokio::join!(
        world
            .executor
            .execute(task.id(), world.mark, world.approve, None, None),
        world
            .executor
            .execute(task.id(), world.mark, world.reject, None, None),
    );

    let succeeded = [approved.is_ok(), rejected.is_ok()]
        .into_iter()
        .filter(|ok| *ok)
        .count();
    eyre::ensure!(succeeded == 1, "exactly one decision wins");
    // In-memory calls finish within one poll, so the second decision reads
    // the already moved task.
    let loser = approved.err().or_else(|| rejected.err());
    eyre::ensure!(
        matches!(loser, Some(TaskServiceError::InvalidTransition { .. })),
        "unexpected loser error: {loser:?}"
    );

    let logs = world.store.find_logs(task.id()).await?;
    eyre::ensure!(logs.len() == 2, "submit plus one decision");
    let final_state = logs
        .last()
        .map(|entry| entry.to_state())
        .ok_or_else(|| eyre::eyre!("empty log"))?;
    let stored = world
        .store
        .find_by_id(task.id())
        .await?
        .ok_or_else(|| eyre::eyre!("task vanished"))?;
    eyre::ensure!(stored.state_id() == final_state);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn simultaneous_creations_receive_distinct_titles() -> eyre::Result<()> {
    let world = PurchaseWorld::new().await?;

    let (first, second, third) = tokio::join!(
        world.lifecycle.create_task(world.request("Mouse", "25")),
        world.lifecycle.create_task(world.request("Cable", "9")),
        world.lifecycle.create_task(world.request("Dock", "180")),
    );

    let titles: BTreeSet<String> = [first?, second?, third?]
        .iter()
        .map(|task| task.title().as_str().to_owned())
        .collect();
    eyre::ensure!(titles.len() == 3, "titles collided: {titles:?}");
    Ok(())
}
