//! Service layer maintaining the presentation order of tasks.

use crate::task::{
    domain::{
        Cost, MoveDirection, NewTask, OrderingPolicy, PositionWrite, ReorderPlan, SwapPlan,
        Task, TaskDetails, TaskDomainError, TaskId, TaskName,
    },
    ports::{TaskRepository, TaskRepositoryError},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Request payload carrying raw task attributes for create and edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDetailsRequest {
    name: String,
    cost: String,
    due_date: DateTime<Utc>,
}

impl TaskDetailsRequest {
    /// Creates a request from raw attribute values.
    ///
    /// `cost` is decimal text such as `"19.90"`.
    #[must_use]
    pub fn new(name: impl Into<String>, cost: impl Into<String>, due_date: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            cost: cost.into(),
            due_date,
        }
    }

    fn into_details(self) -> Result<TaskDetails, TaskDomainError> {
        let name = TaskName::new(self.name)?;
        let cost = Cost::parse(&self.cost)?;
        Ok(TaskDetails::new(name, cost, self.due_date))
    }
}

/// Final positions of the two tasks exchanged by an adjacent move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapOutcome {
    moved: PositionWrite,
    displaced: PositionWrite,
}

impl SwapOutcome {
    /// Returns the moved task and its new position.
    #[must_use]
    pub const fn moved(&self) -> PositionWrite {
        self.moved
    }

    /// Returns the displaced neighbour and its new position.
    #[must_use]
    pub const fn displaced(&self) -> PositionWrite {
        self.displaced
    }
}

/// Failure kinds surfaced to request handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderedTaskErrorKind {
    /// Malformed input reached the store.
    ValidationFailure,
    /// Case-insensitive name collision.
    DuplicateName,
    /// Referenced task does not exist.
    NotFound,
    /// Move requested at the top or bottom of the list.
    NoOp,
    /// Concurrent update detected; the caller may retry.
    Conflict,
    /// The store could not commit.
    StorageFailure,
}

/// Service-level errors for ordered task operations.
#[derive(Debug, Error)]
pub enum OrderedTaskError {
    /// Input validation or order arithmetic failed.
    #[error(transparent)]
    Validation(#[from] TaskDomainError),

    /// Another task already carries the name.
    #[error("a task named '{0}' already exists")]
    DuplicateName(TaskName),

    /// The task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The task already sits at the boundary the move points to.
    #[error("task {id} cannot move {}: it is already at the boundary", .direction.as_str())]
    AlreadyAtBoundary {
        /// Task that was asked to move.
        id: TaskId,
        /// Requested direction.
        direction: MoveDirection,
    },

    /// The store aborted the transaction because of a concurrent update.
    #[error("concurrent update, retry the operation: {0}")]
    Conflict(TaskRepositoryError),

    /// The store failed.
    #[error(transparent)]
    Storage(TaskRepositoryError),
}

impl OrderedTaskError {
    /// Classifies the error for callers mapping failures to responses.
    #[must_use]
    pub const fn kind(&self) -> OrderedTaskErrorKind {
        match self {
            Self::Validation(_) => OrderedTaskErrorKind::ValidationFailure,
            Self::DuplicateName(_) => OrderedTaskErrorKind::DuplicateName,
            Self::NotFound(_) => OrderedTaskErrorKind::NotFound,
            Self::AlreadyAtBoundary { .. } => OrderedTaskErrorKind::NoOp,
            Self::Conflict(_) => OrderedTaskErrorKind::Conflict,
            Self::Storage(_) => OrderedTaskErrorKind::StorageFailure,
        }
    }
}

impl From<TaskRepositoryError> for OrderedTaskError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::DuplicateName(name) => Self::DuplicateName(name),
            TaskRepositoryError::NotFound(id) => Self::NotFound(id),
            conflict @ TaskRepositoryError::Conflict(_) => Self::Conflict(conflict),
            other => Self::Storage(other),
        }
    }
}

/// Result type for ordered task operations.
pub type OrderedTaskResult<T> = Result<T, OrderedTaskError>;

/// Owner of the presentation order.
///
/// Every write to a task's position goes through [`OrderedTaskStore::create_task`],
/// [`OrderedTaskStore::move_up`], [`OrderedTaskStore::move_down`] or
/// [`OrderedTaskStore::reorder`]. No operation retries on failure.
pub struct OrderedTaskStore<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    policy: OrderingPolicy,
}

impl<R, C> Clone for OrderedTaskStore<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
            policy: self.policy,
        }
    }
}

impl<R, C> OrderedTaskStore<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a store with the default ordering policy.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            repository,
            clock,
            policy: OrderingPolicy::default(),
        }
    }

    /// Replaces the ordering policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: OrderingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Creates a task at the end of the presentation order.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedTaskError::Validation`] for malformed attributes,
    /// [`OrderedTaskError::DuplicateName`] when the name is taken, and
    /// [`OrderedTaskError::Storage`] when the insert cannot commit.
    #[instrument(skip(self, request), fields(task_name = %request.name))]
    pub async fn create_task(&self, request: TaskDetailsRequest) -> OrderedTaskResult<Task> {
        let details = request.into_details()?;
        self.ensure_name_available(details.name(), None).await?;

        let task = self
            .repository
            .insert_last(NewTask::new(details, &*self.clock))
            .await?;
        info!(task_id = %task.id(), position = %task.position(), "task appended");
        Ok(task)
    }

    /// Returns every task in presentation order.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedTaskError::Storage`] when the lookup fails.
    pub async fn list_tasks(&self) -> OrderedTaskResult<Vec<Task>> {
        Ok(self.repository.list_ordered().await?)
    }

    /// Returns one task.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedTaskError::NotFound`] when the task does not exist.
    pub async fn get_task(&self, id: TaskId) -> OrderedTaskResult<Task> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(OrderedTaskError::NotFound(id))
    }

    /// Replaces the name, cost and due date of a task. The position is
    /// preserved.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedTaskError::Validation`] for malformed attributes,
    /// [`OrderedTaskError::NotFound`] when the task does not exist, and
    /// [`OrderedTaskError::DuplicateName`] when another task has the name.
    #[instrument(skip(self, request), fields(task_id = %id))]
    pub async fn edit_task(
        &self,
        id: TaskId,
        request: TaskDetailsRequest,
    ) -> OrderedTaskResult<Task> {
        let details = request.into_details()?;
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(OrderedTaskError::NotFound(id))?;
        self.ensure_name_available(details.name(), Some(id)).await?;

        let task = self
            .repository
            .update_details(id, details, self.clock.utc())
            .await?;
        info!(position = %task.position(), "task edited");
        Ok(task)
    }

    /// Deletes a task. Remaining positions keep their gaps.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedTaskError::NotFound`] when the task does not exist.
    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn delete_task(&self, id: TaskId) -> OrderedTaskResult<()> {
        self.repository.delete(id).await?;
        info!("task deleted");
        Ok(())
    }

    /// Swaps a task with its predecessor in presentation order.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedTaskError::NotFound`] when the task does not exist,
    /// [`OrderedTaskError::AlreadyAtBoundary`] when it is already first, and
    /// [`OrderedTaskError::Conflict`] or [`OrderedTaskError::Storage`] when
    /// the swap cannot commit. A failed swap leaves every position intact.
    pub async fn move_up(&self, id: TaskId) -> OrderedTaskResult<SwapOutcome> {
        self.move_adjacent(id, MoveDirection::Up).await
    }

    /// Swaps a task with its successor in presentation order.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedTaskError::NotFound`] when the task does not exist,
    /// [`OrderedTaskError::AlreadyAtBoundary`] when it is already last, and
    /// [`OrderedTaskError::Conflict`] or [`OrderedTaskError::Storage`] when
    /// the swap cannot commit. A failed swap leaves every position intact.
    pub async fn move_down(&self, id: TaskId) -> OrderedTaskResult<SwapOutcome> {
        self.move_adjacent(id, MoveDirection::Down).await
    }

    /// Renumbers the whole collection to `1..=N` following `ids`.
    ///
    /// `ids` must list every stored task exactly once. De-collision and final
    /// assignment run as two ordered write batches inside one transaction.
    /// Applying the same list twice yields the same positions.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedTaskError::Validation`] when `ids` is not a
    /// permutation of the stored tasks, and [`OrderedTaskError::Conflict`] or
    /// [`OrderedTaskError::Storage`] when the transaction cannot commit.
    #[instrument(skip(self, ids), fields(requested = ids.len()))]
    pub async fn reorder(&self, ids: &[TaskId]) -> OrderedTaskResult<()> {
        let stored = self.repository.list_ordered().await?;
        let plan = ReorderPlan::new(ids, &stored, self.policy)
            .inspect_err(|err| warn!(%err, "reorder rejected"))?;
        if plan.is_empty() {
            return Ok(());
        }

        debug!(
            decollide = plan.decollide().len(),
            assign = plan.assign().len(),
            "reorder planned"
        );
        self.repository.run_in_transaction(plan.into_writes()).await?;
        info!("tasks reordered");
        Ok(())
    }

    #[instrument(skip(self), fields(task_id = %id, direction = direction.as_str()))]
    async fn move_adjacent(
        &self,
        id: TaskId,
        direction: MoveDirection,
    ) -> OrderedTaskResult<SwapOutcome> {
        let moving = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(OrderedTaskError::NotFound(id))?;
        let Some(neighbour) = self
            .repository
            .find_adjacent(moving.position(), direction)
            .await?
        else {
            warn!(position = %moving.position(), "task already at boundary");
            return Err(OrderedTaskError::AlreadyAtBoundary { id, direction });
        };

        let floor = moving.position().max(neighbour.position());
        let current_max = self
            .repository
            .find_max_order()
            .await?
            .map_or(floor, |max| max.max(floor));
        let plan = SwapPlan::new(&moving, &neighbour, current_max, self.policy)?;
        debug!(?plan, "swap planned");

        self.repository
            .run_in_transaction(plan.writes().to_vec())
            .await?;
        info!(
            neighbour_id = %neighbour.id(),
            position = %plan.moved().position(),
            "task moved"
        );
        Ok(SwapOutcome {
            moved: plan.moved(),
            displaced: plan.displaced(),
        })
    }

    async fn ensure_name_available(
        &self,
        name: &TaskName,
        exclude: Option<TaskId>,
    ) -> OrderedTaskResult<()> {
        let holder = self
            .repository
            .find_by_name_case_insensitive(name, exclude)
            .await?;
        if let Some(existing) = holder {
            warn!(existing_id = %existing.id(), "task name already taken");
            return Err(OrderedTaskError::DuplicateName(name.clone()));
        }
        Ok(())
    }
}
