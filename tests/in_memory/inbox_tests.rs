//! Sent and received inboxes plus task detail.

use super::helpers::PurchaseWorld;
use taskflow::process::domain::Action;

#[tokio::test(flavor = "multi_thread")]
async fn inboxes_follow_the_task_through_its_workflow() -> eyre::Result<()> {
    let world = PurchaseWorld::new().await?;
    let task = world
        .lifecycle
        .create_task(world.request("Headset", "150"))
        .await?;

    let rina_todo = world.queries.received_by(world.rina).await?;
    world
        .executor
        .execute(task.id(), world.rina, world.submit, None, None)
        .await?;
    let mark_todo = world.queries.received_by(world.mark).await?;
    let nick_todo = world.queries.received_by(world.nick).await?;
    let sent = world.queries.sent_by(world.rina).await?;

    eyre::ensure!(rina_todo.iter().map(|entry| entry.action.name()).eq(["Submit"]));
    eyre::ensure!(mark_todo.iter().map(|entry| entry.action.name()).eq(["Approve"]));
    eyre::ensure!(nick_todo.is_empty());
    let [mine] = sent.as_slice() else {
        eyre::bail!("expected one sent task, got {}", sent.len());
    };
    eyre::ensure!(mine.recipient == Some(world.mark));
    eyre::ensure!(mine.state.as_ref().map(|state| state.name()) == Some("PENDING_APPROVE"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn detail_lists_actions_the_viewer_may_take() -> eyre::Result<()> {
    let world = PurchaseWorld::new().await?;
    let task = world
        .lifecycle
        .create_task(world.request("Webcam", "95"))
        .await?;
    world
        .executor
        .execute(task.id(), world.rina, world.submit, None, None)
        .await?;

    let for_mark = world.queries.detail(task.id(), world.mark, "en").await?;
    let for_rina = world.queries.detail(task.id(), world.rina, "en").await?;

    let names = |actions: &[Action]| -> Vec<String> {
        actions.iter().map(|action| action.name().to_owned()).collect()
    };
    eyre::ensure!(names(&for_mark.available_actions) == ["Approve", "Reject"]);
    eyre::ensure!(for_rina.available_actions.is_empty());
    eyre::ensure!(for_mark.state_label == "PENDING_APPROVE");
    eyre::ensure!(
        for_mark
            .fields
            .iter()
            .map(|field| field.name.as_str())
            .eq(["Item", "Amount"])
    );
    eyre::ensure!(for_mark.log.len() == 1);
    Ok(())
}
