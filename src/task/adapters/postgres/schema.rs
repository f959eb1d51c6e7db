//! Diesel schema for task persistence.

/// DDL creating the task table when it is missing.
pub const CREATE_TASK_TABLE_SQL: &str = concat!(
    "CREATE TABLE IF NOT EXISTS task (\n",
    "  id SERIAL PRIMARY KEY,\n",
    "  name VARCHAR(255) UNIQUE NOT NULL,\n",
    "  completed BOOLEAN NOT NULL DEFAULT FALSE\n",
    ")",
);

/// Constraint `PostgreSQL` generates for the unique `name` column.
pub const TASK_NAME_UNIQUE_CONSTRAINT: &str = "task_name_key";

diesel::table! {
    /// Task records.
    task (id) {
        /// Database-assigned task identifier.
        id -> Int4,
        /// Unique task name.
        #[max_length = 255]
        name -> Varchar,
        /// Completion flag.
        completed -> Bool,
    }
}
