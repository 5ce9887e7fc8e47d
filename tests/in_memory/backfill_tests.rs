//! Permission repair after organization changes.

use super::helpers::PurchaseWorld;
use taskflow::directory::{domain::DirectoryUser, ports::OrgDirectory};
use taskflow::task::services::BackfillReport;

#[tokio::test(flavor = "multi_thread")]
async fn new_managers_gain_access_to_existing_requests() -> eyre::Result<()> {
    let world = PurchaseWorld::new().await?;
    let first = world
        .lifecycle
        .create_task(world.request("Printer", "420"))
        .await?;
    world
        .lifecycle
        .create_task(world.request("Toner", "60"))
        .await?;
    world
        .executor
        .execute(first.id(), world.rina, world.submit, None, None)
        .await?;
    let maya = DirectoryUser::new("maya")?
        .with_department(world.procurement.id())
        .with_role(world.manager_role.id());
    let maya_id = maya.id();
    world.directory.add_user(maya)?;

    let before = world
        .executor
        .execute(first.id(), maya_id, world.approve, None, None)
        .await;
    let report = world.maintenance.backfill(Some(world.process)).await?;
    let after = world
        .executor
        .execute(first.id(), maya_id, world.approve, None, None)
        .await?;

    eyre::ensure!(before.is_err(), "rows are not refreshed implicitly");
    eyre::ensure!(
        report
            == BackfillReport {
                processed: 2,
                succeeded: 2,
                failed: 0,
                inserted: 2,
                removed: 0,
            },
        "unexpected report {report:?}"
    );
    eyre::ensure!(after.state_id() == world.closed);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn departed_managers_lose_access() -> eyre::Result<()> {
    let world = PurchaseWorld::new().await?;
    let task = world
        .lifecycle
        .create_task(world.request("Tablet", "520"))
        .await?;
    world
        .executor
        .execute(task.id(), world.rina, world.submit, None, None)
        .await?;
    let mark = world
        .directory
        .find_user(world.mark)
        .await?
        .ok_or_else(|| eyre::eyre!("mark is registered"))?;
    world.directory.replace_user(mark.deactivated())?;

    let outcome = world.maintenance.reconcile_task(task.id()).await?;

    let result = world
        .executor
        .execute(task.id(), world.mark, world.approve, None, None)
        .await;

    eyre::ensure!(outcome.removed == 2, "approve and reject rows dropped");
    eyre::ensure!(result.is_err());
    Ok(())
}
