//! Domain model for task tracking.
//!
//! A task is a named, completable unit of work. Names are validated here;
//! uniqueness and identifier assignment belong to storage.

mod error;
mod ids;
mod task;

pub use error::TaskDomainError;
pub use ids::{TaskId, TaskName};
pub use task::{NewTask, Task};
