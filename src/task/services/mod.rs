//! Application services for task tracking.

mod store;

pub use store::{TaskStore, TaskStoreError, TaskStoreResult};
