//! Task store: schema setup and CRUD operations over a repository.

use crate::task::{
    domain::{NewTask, Task, TaskDomainError, TaskId, TaskName},
    ports::{TaskRepository, TaskRepositoryError},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Service-level errors for task store operations.
#[derive(Debug, Error)]
pub enum TaskStoreError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
}

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Entry point for task tracking.
///
/// Owns the repository, and through it the connection handle, for its whole
/// lifetime.
#[derive(Debug)]
pub struct TaskStore<R>
where
    R: TaskRepository,
{
    repository: Arc<R>,
}

impl<R> Clone for TaskStore<R>
where
    R: TaskRepository,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R> TaskStore<R>
where
    R: TaskRepository,
{
    /// Creates a store backed by `repository`.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Returns the backing repository.
    #[must_use]
    pub const fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Creates the task table if it is missing.
    ///
    /// Safe to call on every startup.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Repository`] when the schema statement fails.
    pub async fn ensure_schema(&self) -> TaskStoreResult<()> {
        self.repository.ensure_schema().await?;
        Ok(())
    }

    /// Creates a task and returns the number of rows inserted.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Domain`] when `name` is longer than the column,
    /// and [`TaskStoreError::Repository`] when the name is already taken or
    /// storage fails.
    pub async fn create_task(
        &self,
        name: impl Into<String>,
        completed: bool,
    ) -> TaskStoreResult<usize> {
        let new_task = NewTask::new(TaskName::new(name)?).with_completed(completed);
        let affected = self.repository.create(&new_task).await?;
        debug!(name = %new_task.name(), affected, "created task");
        Ok(affected)
    }

    /// Returns every task ordered by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Repository`] when the query or row decoding
    /// fails.
    pub async fn get_tasks(&self) -> TaskStoreResult<Vec<Task>> {
        Ok(self.repository.list().await?)
    }

    /// Sets the completion flag of task `id`.
    ///
    /// Updating a missing task is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Repository`] when the transaction cannot be
    /// started, executed or committed.
    pub async fn update_task(&self, id: TaskId, completed: bool) -> TaskStoreResult<()> {
        self.repository.set_completed(id, completed).await?;
        Ok(())
    }

    /// Deletes task `id`.
    ///
    /// Deleting a missing task is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Repository`] when the statement fails.
    pub async fn delete_task(&self, id: TaskId) -> TaskStoreResult<()> {
        self.repository.delete(id).await?;
        Ok(())
    }
}
