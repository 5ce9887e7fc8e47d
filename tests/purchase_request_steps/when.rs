//! When steps for purchase request BDD scenarios.

use super::world::{PurchaseRequestWorld, run_async};
use rstest_bdd_macros::when;

#[when(r#"{user} performs "{action}""#)]
fn user_performs(
    world: &mut PurchaseRequestWorld,
    user: String,
    action: String,
) -> Result<(), eyre::Report> {
    let user_id = world.user(&user)?;
    let action_id = world.action(&action)?;
    let purchase = world.purchase()?;
    let task_id = world.task()?.id();

    let result = run_async(
        purchase
            .executor
            .execute(task_id, user_id, action_id, None, None),
    );
    world.last_result = Some(result);
    Ok(())
}
