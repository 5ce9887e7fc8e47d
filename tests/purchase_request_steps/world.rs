//! Shared world state for purchase request BDD scenarios.

use crate::helpers::PurchaseWorld;
use rstest::fixture;
use taskflow::directory::domain::UserId;
use taskflow::process::domain::ActionId;
use taskflow::task::{domain::Task, services::TaskServiceError};

/// Scenario world for purchase request behaviour tests.
#[derive(Default)]
pub struct PurchaseRequestWorld {
    pub purchase: Option<PurchaseWorld>,
    pub task: Option<Task>,
    pub last_result: Option<Result<Task, TaskServiceError>>,
}

impl PurchaseRequestWorld {
    /// Returns the authored process, failing when the background step did
    /// not run.
    pub fn purchase(&self) -> eyre::Result<&PurchaseWorld> {
        self.purchase
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing purchase process in scenario world"))
    }

    /// Returns the request created by a previous step.
    pub fn task(&self) -> eyre::Result<&Task> {
        self.task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing request in scenario world"))
    }

    /// Maps a scenario user name to its directory identifier.
    pub fn user(&self, name: &str) -> eyre::Result<UserId> {
        let purchase = self.purchase()?;
        match name {
            "rina" => Ok(purchase.rina),
            "mark" => Ok(purchase.mark),
            "nick" => Ok(purchase.nick),
            other => Err(eyre::eyre!("unknown scenario user {other}")),
        }
    }

    /// Maps a scenario action name to its identifier.
    pub fn action(&self, name: &str) -> eyre::Result<ActionId> {
        let purchase = self.purchase()?;
        match name {
            "Submit" => Ok(purchase.submit),
            "Approve" => Ok(purchase.approve),
            "Reject" => Ok(purchase.reject),
            other => Err(eyre::eyre!("unknown scenario action {other}")),
        }
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> PurchaseRequestWorld {
    PurchaseRequestWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
