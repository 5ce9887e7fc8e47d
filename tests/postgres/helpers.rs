//! Task store fixtures backed by one cloned database per test.

pub use super::cluster::{BoxError, PostgresCluster, postgres_cluster};
use super::cluster::{ManagedCluster, TemporaryDatabase};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use rstest::fixture;
use taskflow::task::adapters::postgres::{PostgresTaskStore, TaskPgPool};
use tokio::runtime::Runtime;
use uuid::Uuid;

/// Task store schema.
pub const CREATE_TASK_STORE_SQL: &str =
    include_str!("../../migrations/2026-10-01-000000_create_task_store/up.sql");

/// Template database name for the pre-migrated schema.
pub const TEMPLATE_DB: &str = "taskflow_test_template";

/// Builds the runtime that drives the embedded cluster.
///
/// # Errors
///
/// Returns an error if the runtime cannot be built.
pub fn test_runtime() -> Result<Runtime, BoxError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| Box::new(err) as BoxError)
}

/// Ensures the template database exists with the schema applied.
///
/// # Errors
///
/// Returns an error if template creation or migration fails.
pub fn ensure_template(cluster: &ManagedCluster) -> Result<(), BoxError> {
    let connection = cluster.connection();
    cluster.ensure_template_exists(TEMPLATE_DB, move |db_name| {
        let url = connection.database_url(db_name);
        let mut conn = PgConnection::establish(&url).map_err(|err| Box::new(err) as BoxError)?;
        conn.batch_execute(CREATE_TASK_STORE_SQL)
            .map_err(|err| Box::new(err) as BoxError)
    })
}

/// Store over a database that is dropped with the context.
pub struct StoreContext {
    pub store: PostgresTaskStore,
    _database: TemporaryDatabase,
}

/// Prepares a migrated database and a store over it.
///
/// Yields `None` when no cluster can be started on this machine.
///
/// # Errors
///
/// Returns an error if the template, the database or the pool cannot be
/// set up on a running cluster.
#[fixture]
pub fn store_context(
    postgres_cluster: Result<PostgresCluster, BoxError>,
) -> eyre::Result<Option<StoreContext>> {
    let cluster = match postgres_cluster {
        Ok(cluster) => cluster,
        Err(err) => {
            report_skip(&err);
            return Ok(None);
        }
    };
    ensure_template(cluster).map_err(|err| eyre::eyre!(err))?;
    let database = cluster
        .temporary_database_from_template(&format!("task_store_{}", Uuid::new_v4()), TEMPLATE_DB)
        .map_err(|err| eyre::eyre!(err))?;
    let pool: TaskPgPool = Pool::builder()
        .max_size(1)
        .build(ConnectionManager::<PgConnection>::new(database.url()))?;
    Ok(Some(StoreContext {
        store: PostgresTaskStore::new(pool),
        _database: database,
    }))
}

#[expect(
    clippy::print_stderr,
    reason = "a skipped test names the reason on the test output"
)]
fn report_skip(err: &BoxError) {
    eprintln!("SKIP-TEST-CLUSTER: PostgreSQL unavailable: {err}");
}
