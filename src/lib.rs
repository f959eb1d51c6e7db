//! Taskstore: a minimal task tracker backed by `PostgreSQL`.
//!
//! The crate creates a single `task` table on demand and offers create, list,
//! update and delete operations on named, completable tasks.
//!
//! # Architecture
//!
//! Taskstore follows hexagonal architecture principles:
//!
//! - **Domain**: Pure task types with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for storage
//! - **Adapters**: Concrete implementations of ports (`PostgreSQL`, in-memory)
//!
//! # Modules
//!
//! - [`config`]: Connection settings from defaults, file and environment
//! - [`task`]: Task domain, storage port, adapters and the task store

pub mod config;
pub mod task;
