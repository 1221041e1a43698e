//! `PostgreSQL` repository implementation for the ordered task list.
//!
//! Every mutating operation runs in one `SERIALIZABLE` transaction. A
//! serialization failure surfaces as [`TaskRepositoryError::Conflict`] for
//! the caller to retry.

use super::{
    models::{NewTaskRow, TaskDetailsChangeset, TaskRow},
    schema::tarefas,
};
use crate::config::StoreConfig;
use crate::task::{
    domain::{
        Cost, MoveDirection, NewTask, OrderPosition, PersistedTaskData, PositionWrite, Task,
        TaskDetails, TaskId, TaskName,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

const ORDER_UNIQUE_CONSTRAINT: &str = "tarefas_ordem_apresentacao_unique";
const NAME_UNIQUE_INDEX: &str = "idx_tarefas_nome_lower_unique";

/// Builds a connection pool sized from `config`.
///
/// # Errors
///
/// Returns [`TaskRepositoryError::Persistence`] when the pool cannot open its
/// initial connections.
pub fn build_pool(config: &StoreConfig) -> TaskRepositoryResult<TaskPgPool> {
    let manager = ConnectionManager::<PgConnection>::new(config.database_url());
    Pool::builder()
        .max_size(config.pool_size())
        .build(manager)
        .map_err(TaskRepositoryError::persistence)
}

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

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

impl From<DieselError> for TaskRepositoryError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => {
                Self::conflict(err)
            }
            _ => Self::persistence(err),
        }
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn insert_last(&self, task: NewTask) -> TaskRepositoryResult<Task> {
        self.run_blocking(move |connection| {
            serializable(connection, |tx| {
                let name = task.details().name();
                if find_row_by_name(tx, name, None)?.is_some() {
                    return Err(TaskRepositoryError::DuplicateName(name.clone()));
                }

                let max = select_max_order(tx)?;
                let position =
                    OrderPosition::after(max).map_err(TaskRepositoryError::persistence)?;
                let new_row = to_new_row(&task, position)?;
                let row = diesel::insert_into(tarefas::table)
                    .values(&new_row)
                    .returning(TaskRow::as_returning())
                    .get_result::<TaskRow>(tx)
                    .map_err(|err| map_unique_violation(err, name, position))?;
                row_to_task(row)
            })
        })
        .await
    }

    async fn update_details(
        &self,
        id: TaskId,
        details: TaskDetails,
        updated_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Task> {
        self.run_blocking(move |connection| {
            serializable(connection, |tx| {
                let stored_position = tarefas::table
                    .find(id.value())
                    .select(tarefas::ordem_apresentacao)
                    .first::<i64>(tx)
                    .optional()?
                    .map(OrderPosition::new)
                    .ok_or(TaskRepositoryError::NotFound(id))?;
                let name = details.name();
                if find_row_by_name(tx, name, Some(id))?.is_some() {
                    return Err(TaskRepositoryError::DuplicateName(name.clone()));
                }

                let changeset = to_changeset(&details, updated_at)?;
                let row = diesel::update(tarefas::table.find(id.value()))
                    .set(&changeset)
                    .returning(TaskRow::as_returning())
                    .get_result::<TaskRow>(tx)
                    .map_err(|err| map_unique_violation(err, name, stored_position))?;
                row_to_task(row)
            })
        })
        .await
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let affected = diesel::delete(tarefas::table.find(id.value())).execute(connection)?;
            if affected == 0 {
                return Err(TaskRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tarefas::table
                .find(id.value())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn list_ordered(&self) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(|connection| {
            let rows = tarefas::table
                .order(tarefas::ordem_apresentacao.asc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn find_max_order(&self) -> TaskRepositoryResult<Option<OrderPosition>> {
        self.run_blocking(select_max_order).await
    }

    async fn find_adjacent(
        &self,
        position: OrderPosition,
        direction: MoveDirection,
    ) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let value = position.value();
            let row = match direction {
                MoveDirection::Up => tarefas::table
                    .filter(tarefas::ordem_apresentacao.lt(value))
                    .order(tarefas::ordem_apresentacao.desc())
                    .select(TaskRow::as_select())
                    .first::<TaskRow>(connection)
                    .optional()?,
                MoveDirection::Down => tarefas::table
                    .filter(tarefas::ordem_apresentacao.gt(value))
                    .order(tarefas::ordem_apresentacao.asc())
                    .select(TaskRow::as_select())
                    .first::<TaskRow>(connection)
                    .optional()?,
            };
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find_by_name_case_insensitive(
        &self,
        name: &TaskName,
        exclude: Option<TaskId>,
    ) -> TaskRepositoryResult<Option<Task>> {
        let lookup_name = name.clone();
        self.run_blocking(move |connection| {
            let row = find_row_by_name(connection, &lookup_name, exclude)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn run_in_transaction(&self, writes: Vec<PositionWrite>) -> TaskRepositoryResult<()> {
        if writes.is_empty() {
            return Ok(());
        }
        self.run_blocking(move |connection| {
            serializable(connection, |tx| {
                debug!(writes = writes.len(), "applying position writes");
                writes
                    .iter()
                    .try_for_each(|write| apply_position_write(tx, *write))
            })
        })
        .await
    }
}

fn serializable<T, F>(connection: &mut PgConnection, f: F) -> TaskRepositoryResult<T>
where
    F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T>,
{
    connection.build_transaction().serializable().run(f)
}

fn apply_position_write(
    connection: &mut PgConnection,
    write: PositionWrite,
) -> TaskRepositoryResult<()> {
    let task_id = write.task_id();
    let position = write.position();
    let affected = diesel::update(tarefas::table.find(task_id.value()))
        .set(tarefas::ordem_apresentacao.eq(position.value()))
        .execute(connection)
        .map_err(|err| match violated_constraint(&err).as_deref() {
            Some(ORDER_UNIQUE_CONSTRAINT) => TaskRepositoryError::OrderCollision(position),
            _ => TaskRepositoryError::from(err),
        })?;
    if affected == 0 {
        return Err(TaskRepositoryError::NotFound(task_id));
    }
    Ok(())
}

fn select_max_order(connection: &mut PgConnection) -> TaskRepositoryResult<Option<OrderPosition>> {
    let max = tarefas::table
        .select(diesel::dsl::max(tarefas::ordem_apresentacao))
        .get_result::<Option<i64>>(connection)?;
    Ok(max.map(OrderPosition::new))
}

fn find_row_by_name(
    connection: &mut PgConnection,
    name: &TaskName,
    exclude: Option<TaskId>,
) -> TaskRepositoryResult<Option<TaskRow>> {
    let query = diesel::sql_query(concat!(
        "SELECT id, nome, custo_centavos, data_limite, ordem_apresentacao, created_at, ",
        "updated_at FROM tarefas ",
        "WHERE lower(nome) = lower($1) ",
        "AND ($2::BIGINT IS NULL OR id <> $2) ",
        "LIMIT 1",
    ))
    .bind::<diesel::sql_types::Text, _>(name.as_str())
    .bind::<diesel::sql_types::Nullable<diesel::sql_types::BigInt>, _>(
        exclude.map(TaskId::value),
    );

    Ok(query.get_result::<TaskRow>(connection).optional()?)
}

fn violated_constraint(err: &DieselError) -> Option<String> {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            info.constraint_name().map(str::to_owned)
        }
        _ => None,
    }
}

fn map_unique_violation(
    err: DieselError,
    name: &TaskName,
    position: OrderPosition,
) -> TaskRepositoryError {
    match violated_constraint(&err).as_deref() {
        Some(NAME_UNIQUE_INDEX) => TaskRepositoryError::DuplicateName(name.clone()),
        Some(ORDER_UNIQUE_CONSTRAINT) => TaskRepositoryError::OrderCollision(position),
        _ => TaskRepositoryError::from(err),
    }
}

fn to_new_row(task: &NewTask, position: OrderPosition) -> TaskRepositoryResult<NewTaskRow> {
    let details = task.details();
    Ok(NewTaskRow {
        nome: details.name().as_str().to_owned(),
        custo_centavos: cost_to_column(details.cost())?,
        data_limite: details.due_date(),
        ordem_apresentacao: position.value(),
        created_at: task.created_at(),
        updated_at: task.created_at(),
    })
}

fn to_changeset(
    details: &TaskDetails,
    updated_at: DateTime<Utc>,
) -> TaskRepositoryResult<TaskDetailsChangeset> {
    Ok(TaskDetailsChangeset {
        nome: details.name().as_str().to_owned(),
        custo_centavos: cost_to_column(details.cost())?,
        data_limite: details.due_date(),
        updated_at,
    })
}

fn cost_to_column(cost: Cost) -> TaskRepositoryResult<i64> {
    i64::try_from(cost.cents()).map_err(TaskRepositoryError::persistence)
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id: persisted_id,
        nome: persisted_name,
        custo_centavos: persisted_cost,
        data_limite,
        ordem_apresentacao,
        created_at,
        updated_at,
    } = row;

    let id = TaskId::new(persisted_id).map_err(TaskRepositoryError::persistence)?;
    let name = TaskName::new(persisted_name).map_err(TaskRepositoryError::persistence)?;
    let cents = u64::try_from(persisted_cost).map_err(TaskRepositoryError::persistence)?;
    let cost = Cost::from_cents(cents).map_err(TaskRepositoryError::persistence)?;

    Ok(Task::from_persisted(PersistedTaskData {
        id,
        details: TaskDetails::new(name, cost, data_limite),
        position: OrderPosition::new(ordem_apresentacao),
        created_at,
        updated_at,
    }))
}
