//! `PostgreSQL` repository implementation for task storage.

use super::{
    models::{NewTaskRow, TaskRow},
    schema::{CREATE_TASK_TABLE_SQL, TASK_NAME_UNIQUE_CONSTRAINT, task},
};
use crate::config::DatabaseConfig;
use crate::task::{
    domain::{NewTask, Task, TaskId, TaskName},
    ports::{TaskOperation, TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use tracing::{debug, info};

/// `PostgreSQL` connection pool type used by the task adapter.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool for `config` and checks the database answers.
    ///
    /// The pool uses the driver defaults for size and timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Persistence`] tagged with
    /// [`TaskOperation::Connect`] when the URL cannot be built, the pool
    /// cannot be created, or the ping fails.
    pub async fn connect(config: &DatabaseConfig) -> TaskRepositoryResult<Self> {
        let url = config
            .connection_url()
            .map_err(|err| TaskRepositoryError::persistence(TaskOperation::Connect, err))?;
        let host = config.host.clone();
        let database = config.database.clone();

        let pool = tokio::task::spawn_blocking(move || {
            let manager = ConnectionManager::<PgConnection>::new(url.as_str());
            Pool::builder()
                .build(manager)
                .map_err(|err| TaskRepositoryError::persistence(TaskOperation::Connect, err))
        })
        .await
        .map_err(|err| TaskRepositoryError::persistence(TaskOperation::Connect, err))??;

        let repository = Self::new(pool);
        repository.ping().await?;
        info!(%host, %database, "connected to PostgreSQL");
        Ok(repository)
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub const fn pool(&self) -> &TaskPgPool {
        &self.pool
    }

    /// Runs a trivial statement to confirm the database is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Persistence`] tagged with
    /// [`TaskOperation::Connect`] when no connection can be used.
    pub async fn ping(&self) -> TaskRepositoryResult<()> {
        self.run_blocking(TaskOperation::Connect, |connection| {
            diesel::sql_query("SELECT 1")
                .execute(connection)
                .map_err(|err| TaskRepositoryError::persistence(TaskOperation::Connect, err))?;
            Ok(())
        })
        .await
    }

    async fn run_blocking<F, T>(&self, operation: TaskOperation, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool
                .get()
                .map_err(|err| TaskRepositoryError::persistence(operation, err))?;
            f(&mut connection)
        })
        .await
        .map_err(|err| TaskRepositoryError::persistence(operation, err))?
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn ensure_schema(&self) -> TaskRepositoryResult<()> {
        self.run_blocking(TaskOperation::EnsureSchema, |connection| {
            diesel::sql_query(CREATE_TASK_TABLE_SQL)
                .execute(connection)
                .map_err(|err| TaskRepositoryError::persistence(TaskOperation::EnsureSchema, err))?;
            info!("task table is ready");
            Ok(())
        })
        .await
    }

    async fn create(&self, new_task: &NewTask) -> TaskRepositoryResult<usize> {
        let name = new_task.name().clone();
        let new_row = NewTaskRow {
            name: name.as_str().to_owned(),
            completed: new_task.completed(),
        };

        self.run_blocking(TaskOperation::CreateTask, move |connection| {
            let affected = diesel::insert_into(task::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_name_unique_violation(info.as_ref()) =>
                    {
                        TaskRepositoryError::DuplicateName(name.clone())
                    }
                    _ => TaskRepositoryError::persistence(TaskOperation::CreateTask, err),
                })?;
            debug!(name = %name, affected, "inserted task");
            Ok(affected)
        })
        .await
    }

    async fn list(&self) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(TaskOperation::GetTasks, |connection| {
            let rows = task::table
                .select(TaskRow::as_select())
                .order(task::id.asc())
                .load::<TaskRow>(connection)
                .map_err(|err| TaskRepositoryError::persistence(TaskOperation::GetTasks, err))?;
            debug!(count = rows.len(), "loaded tasks");
            Ok(rows.into_iter().map(row_to_task).collect())
        })
        .await
    }

    async fn set_completed(&self, id: TaskId, completed: bool) -> TaskRepositoryResult<()> {
        self.run_blocking(TaskOperation::UpdateTask, move |connection| {
            // Commits when the closure returns `Ok`; any error rolls back.
            let affected = connection
                .transaction::<_, DieselError, _>(|tx_conn| {
                    diesel::update(task::table.filter(task::id.eq(id.value())))
                        .set(task::completed.eq(completed))
                        .execute(tx_conn)
                })
                .map_err(|err| TaskRepositoryError::persistence(TaskOperation::UpdateTask, err))?;
            debug!(%id, completed, affected, "updated task completion");
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        self.run_blocking(TaskOperation::DeleteTask, move |connection| {
            let affected = diesel::delete(task::table.filter(task::id.eq(id.value())))
                .execute(connection)
                .map_err(|err| TaskRepositoryError::persistence(TaskOperation::DeleteTask, err))?;
            debug!(%id, affected, "deleted task");
            Ok(())
        })
        .await
    }
}

fn row_to_task(row: TaskRow) -> Task {
    Task::from_persisted(
        TaskId::new(row.id),
        TaskName::from_persisted(row.name),
        row.completed,
    )
}

fn is_name_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|constraint| constraint == TASK_NAME_UNIQUE_CONSTRAINT)
}
