//! Repository port for task persistence and order-position writes.

use crate::task::domain::{
    MoveDirection, NewTask, OrderPosition, PositionWrite, Task, TaskDetails, TaskId, TaskName,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// Implementations enforce the same constraints as the relational schema:
/// order positions are unique after every individual write, and names are
/// unique under case-insensitive comparison.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Inserts a task at the end of the presentation order.
    ///
    /// The name check, the maximum-position read and the insert run in one
    /// transaction, so the new task receives `max + 1` (or
    /// [`OrderPosition::FIRST`] in an empty collection).
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateName`] when another task
    /// already carries the name under case-insensitive comparison.
    async fn insert_last(&self, task: NewTask) -> TaskRepositoryResult<Task>;

    /// Replaces the name, cost and due date of an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist
    /// or [`TaskRepositoryError::DuplicateName`] when another task carries
    /// the new name.
    async fn update_details(
        &self,
        id: TaskId,
        details: TaskDetails,
        updated_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Task>;

    /// Deletes a task. Surviving positions are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns every task in presentation order.
    async fn list_ordered(&self) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns the largest stored position, or `None` for an empty
    /// collection.
    async fn find_max_order(&self) -> TaskRepositoryResult<Option<OrderPosition>>;

    /// Returns the task adjacent to `position` in the given direction: the
    /// greatest position strictly below it for [`MoveDirection::Up`], the
    /// smallest strictly above it for [`MoveDirection::Down`].
    async fn find_adjacent(
        &self,
        position: OrderPosition,
        direction: MoveDirection,
    ) -> TaskRepositoryResult<Option<Task>>;

    /// Finds a task whose name matches case-insensitively, ignoring
    /// `exclude` when given.
    async fn find_by_name_case_insensitive(
        &self,
        name: &TaskName,
        exclude: Option<TaskId>,
    ) -> TaskRepositoryResult<Option<Task>>;

    /// Applies position writes in order inside one transaction.
    ///
    /// Either every write is applied or none is.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when a write targets a
    /// missing task, [`TaskRepositoryError::OrderCollision`] when a write
    /// would duplicate a position, and [`TaskRepositoryError::Conflict`]
    /// when the store aborts the transaction to preserve serializability.
    async fn run_in_transaction(&self, writes: Vec<PositionWrite>) -> TaskRepositoryResult<()>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// Another task already carries the name.
    #[error("duplicate task name: {0}")]
    DuplicateName(TaskName),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// A write would leave two tasks on the same position.
    #[error("order position {0} is already taken")]
    OrderCollision(OrderPosition),

    /// The store aborted the transaction because of a concurrent update.
    #[error("transaction conflict: {0}")]
    Conflict(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Wraps a serialization conflict reported by the store.
    pub fn conflict(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Conflict(Arc::new(err))
    }
}
