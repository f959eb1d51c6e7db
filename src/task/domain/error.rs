//! Error types for task domain validation.

use thiserror::Error;

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task name exceeds the persisted column width.
    #[error("task name is {length} characters long, limit is {limit}")]
    NameTooLong {
        /// Length of the rejected name in characters.
        length: usize,
        /// Maximum accepted length in characters.
        limit: usize,
    },
}
