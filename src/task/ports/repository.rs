//! Repository port for task persistence.

use crate::task::domain::{NewTask, Task, TaskId, TaskName};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Creates the task table when it does not exist yet.
    ///
    /// Calling this repeatedly never fails and never alters stored tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Persistence`] when the schema statement
    /// fails.
    async fn ensure_schema(&self) -> TaskRepositoryResult<()>;

    /// Inserts a new task and returns the number of rows inserted.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateName`] when a task with the same
    /// name already exists.
    async fn create(&self, task: &NewTask) -> TaskRepositoryResult<usize>;

    /// Returns every stored task ordered by identifier.
    ///
    /// No partial results are returned on failure.
    async fn list(&self) -> TaskRepositoryResult<Vec<Task>>;

    /// Sets the completion flag of the task with the given identifier.
    ///
    /// A missing identifier affects nothing and is not an error.
    async fn set_completed(&self, id: TaskId, completed: bool) -> TaskRepositoryResult<()>;

    /// Deletes the task with the given identifier.
    ///
    /// A missing identifier affects nothing and is not an error.
    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()>;
}

/// Store operation that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskOperation {
    /// Opening and checking the database connection.
    Connect,
    /// Creating the task table.
    EnsureSchema,
    /// Inserting a task.
    CreateTask,
    /// Listing tasks.
    GetTasks,
    /// Updating the completion flag.
    UpdateTask,
    /// Deleting a task.
    DeleteTask,
}

impl TaskOperation {
    /// Returns the operation name used as error prefix.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "Connect",
            Self::EnsureSchema => "EnsureSchema",
            Self::CreateTask => "CreateTask",
            Self::GetTasks => "GetTasks",
            Self::UpdateTask => "UpdateTask",
            Self::DeleteTask => "DeleteTask",
        }
    }
}

impl fmt::Display for TaskOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same name already exists.
    #[error("CreateTask: duplicate task name: {0}")]
    DuplicateName(TaskName),

    /// Persistence-layer failure.
    #[error("{operation}: {source}")]
    Persistence {
        /// Operation that failed.
        operation: TaskOperation,
        /// Underlying driver, pool or decoding error.
        source: Arc<dyn std::error::Error + Send + Sync>,
    },
}

impl TaskRepositoryError {
    /// Wraps a persistence error raised by `operation`.
    pub fn persistence(
        operation: TaskOperation,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Persistence {
            operation,
            source: Arc::new(err),
        }
    }

    /// Returns the operation that produced this error.
    #[must_use]
    pub const fn operation(&self) -> TaskOperation {
        match self {
            Self::DuplicateName(_) => TaskOperation::CreateTask,
            Self::Persistence { operation, .. } => *operation,
        }
    }
}
