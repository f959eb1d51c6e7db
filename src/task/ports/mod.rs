//! Port contracts for task storage.
//!
//! Ports define infrastructure-agnostic interfaces used by the task store.

pub mod repository;

pub use repository::{TaskOperation, TaskRepository, TaskRepositoryError, TaskRepositoryResult};
