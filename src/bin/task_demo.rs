//! Runs the reference task flow against a configured `PostgreSQL` database.
//!
//! Usage:
//!
//! ```text
//! TASKSTORE_DB_HOST=localhost TASKSTORE_DB_PASSWORD=secret task_demo
//! ```
//!
//! Connection settings come from `TASKSTORE_CONFIG` (a TOML file) and the
//! `TASKSTORE_DB_*` variables. Log filtering follows `TASKSTORE_LOG`, falling
//! back to `RUST_LOG`.
//!
//! The flow creates a task named `Jump`, lists the table, marks the task
//! completed and deletes it. The first failure is logged and the process exits
//! with status 1.

use std::process::ExitCode;
use std::sync::Arc;

use taskstore::config::DatabaseConfig;
use taskstore::task::{
    adapters::postgres::PostgresTaskRepository,
    services::TaskStore,
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const LOG_ENV: &str = "TASKSTORE_LOG";
const DEFAULT_FILTER: &str = "taskstore=info,task_demo=info";
const DEMO_TASK: &str = "Jump";

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "task demo failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn run() -> Result<(), BoxError> {
    let config = DatabaseConfig::load()?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.host,
        port = config.port,
        database = %config.database,
        "starting task demo"
    );

    let repository = PostgresTaskRepository::connect(&config).await?;
    let store = TaskStore::new(Arc::new(repository));
    store.ensure_schema().await?;

    let affected = store.create_task(DEMO_TASK, false).await?;
    info!(rows = affected, name = DEMO_TASK, "created task");

    let tasks = store.get_tasks().await?;
    for task in &tasks {
        info!(id = %task.id(), name = %task.name(), completed = task.completed(), "task");
    }

    let task = tasks
        .into_iter()
        .find(|task| task.name().as_str() == DEMO_TASK)
        .ok_or_else(|| format!("task {DEMO_TASK} missing after creation"))?;

    store.update_task(task.id(), true).await?;
    info!(id = %task.id(), "marked task completed");

    store.delete_task(task.id()).await?;
    info!(id = %task.id(), "deleted task");
    Ok(())
}
