//! Task tracking over a single relational table.
//!
//! The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - The task store service in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
