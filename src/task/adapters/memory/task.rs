//! In-memory repository for task store tests.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{NewTask, Task, TaskId},
    ports::{TaskOperation, TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
///
/// Behaves like the `PostgreSQL` adapter: the table must be created with
/// [`TaskRepository::ensure_schema`] first, identifiers come from a sequence
/// starting at 1, and names are unique.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    schema_ready: bool,
    last_id: i32,
    tasks: BTreeMap<TaskId, Task>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository without a task table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(
        &self,
        operation: TaskOperation,
    ) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        let state = self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(operation, std::io::Error::other(err.to_string()))
        })?;
        require_schema(&state, operation)?;
        Ok(state)
    }

    fn write(
        &self,
        operation: TaskOperation,
    ) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        let state = self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(operation, std::io::Error::other(err.to_string()))
        })?;
        require_schema(&state, operation)?;
        Ok(state)
    }
}

fn require_schema(state: &InMemoryTaskState, operation: TaskOperation) -> TaskRepositoryResult<()> {
    if state.schema_ready {
        return Ok(());
    }
    Err(TaskRepositoryError::persistence(
        operation,
        std::io::Error::other("relation \"task\" does not exist"),
    ))
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn ensure_schema(&self) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(
                TaskOperation::EnsureSchema,
                std::io::Error::other(err.to_string()),
            )
        })?;
        state.schema_ready = true;
        Ok(())
    }

    async fn create(&self, task: &NewTask) -> TaskRepositoryResult<usize> {
        let mut state = self.write(TaskOperation::CreateTask)?;

        // A failed insert still consumes an identifier, as with `SERIAL`.
        let next_id = state.last_id.checked_add(1).ok_or_else(|| {
            TaskRepositoryError::persistence(
                TaskOperation::CreateTask,
                std::io::Error::other("task identifier sequence exhausted"),
            )
        })?;
        state.last_id = next_id;

        if state.tasks.values().any(|stored| stored.name() == task.name()) {
            return Err(TaskRepositoryError::DuplicateName(task.name().clone()));
        }

        let id = TaskId::new(next_id);
        state.tasks.insert(
            id,
            Task::from_persisted(id, task.name().clone(), task.completed()),
        );
        Ok(1)
    }

    async fn list(&self) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read(TaskOperation::GetTasks)?;
        Ok(state.tasks.values().cloned().collect())
    }

    async fn set_completed(&self, id: TaskId, completed: bool) -> TaskRepositoryResult<()> {
        let mut state = self.write(TaskOperation::UpdateTask)?;
        if let Some(stored) = state.tasks.get_mut(&id) {
            *stored = Task::from_persisted(id, stored.name().clone(), completed);
        }
        Ok(())
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        let mut state = self.write(TaskOperation::DeleteTask)?;
        state.tasks.remove(&id);
        Ok(())
    }
}
