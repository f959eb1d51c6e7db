//! Diesel row models for task persistence.

use super::schema::task;
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Database-assigned task identifier.
    pub id: i32,
    /// Unique task name.
    pub name: String,
    /// Completion flag.
    pub completed: bool,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task)]
pub struct NewTaskRow {
    /// Unique task name.
    pub name: String,
    /// Initial completion flag.
    pub completed: bool,
}
