//! Shared world state for task store BDD scenarios.

use std::sync::Arc;

use taskstore::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::Task,
    services::{TaskStore, TaskStoreResult},
};
use rstest::fixture;

/// Store type used by the BDD world.
pub type TestTaskStore = TaskStore<InMemoryTaskRepository>;

/// Scenario world for task store behaviour tests.
pub struct TaskStoreWorld {
    pub store: TestTaskStore,
    pub last_create_result: Option<TaskStoreResult<usize>>,
}

impl TaskStoreWorld {
    /// Creates a world around an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: TaskStore::new(Arc::new(InMemoryTaskRepository::new())),
            last_create_result: None,
        }
    }

    /// Returns the stored task with `name`.
    pub fn task_named(&self, name: &str) -> Result<Task, eyre::Report> {
        let tasks = run_async(self.store.get_tasks())?;
        tasks
            .into_iter()
            .find(|task| task.name().as_str() == name)
            .ok_or_else(|| eyre::eyre!("no task named {name}"))
    }
}

impl Default for TaskStoreWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskStoreWorld {
    TaskStoreWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
