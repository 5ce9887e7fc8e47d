//! Given steps for purchase request BDD scenarios.

use super::world::{PurchaseRequestWorld, run_async};
use crate::helpers::PurchaseWorld;
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given("a published purchase request process")]
fn published_process(world: &mut PurchaseRequestWorld) -> Result<(), eyre::Report> {
    let purchase = run_async(PurchaseWorld::new()).wrap_err("author purchase process")?;
    world.purchase = Some(purchase);
    Ok(())
}

#[given(r#"rina has requested "{item}" for {amount:u32}"#)]
fn rina_requested(
    world: &mut PurchaseRequestWorld,
    item: String,
    amount: u32,
) -> Result<(), eyre::Report> {
    let purchase = world.purchase()?;
    let request = purchase.request(&item, &amount.to_string());
    let created =
        run_async(purchase.lifecycle.create_task(request)).wrap_err("create purchase request")?;
    world.task = Some(created);
    Ok(())
}

#[given("rina has submitted the request")]
fn rina_submitted(world: &mut PurchaseRequestWorld) -> Result<(), eyre::Report> {
    let purchase = world.purchase()?;
    let task = world.task()?;
    let submitted = run_async(purchase.executor.execute(
        task.id(),
        purchase.rina,
        purchase.submit,
        None,
        None,
    ))
    .wrap_err("submit purchase request")?;
    world.task = Some(submitted);
    Ok(())
}
