//! Error types for task domain validation and order arithmetic.

use super::{OrderPosition, TaskId};
use thiserror::Error;

/// Errors returned while constructing domain task values or computing order
/// plans.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task identifier is not a positive integer.
    #[error("invalid task identifier {0}, expected a positive integer")]
    InvalidTaskId(i64),

    /// The task name is empty after trimming.
    #[error("task name must not be empty")]
    EmptyTaskName,

    /// The task name exceeds the persisted column width.
    #[error("task name has {actual} characters, exceeds limit of {max}")]
    TaskNameTooLong {
        /// Maximum number of characters accepted.
        max: usize,
        /// Number of characters supplied.
        actual: usize,
    },

    /// The cost text is not a non-negative decimal with at most two
    /// fractional digits.
    #[error("invalid cost '{0}', expected a non-negative decimal such as 12.50")]
    InvalidCost(String),

    /// The cost exceeds the schema-backed maximum.
    #[error("cost of {0} cents exceeds the storable maximum")]
    CostOutOfRange(u64),

    /// Order arithmetic left the representable range.
    #[error("order position overflow while deriving a value from {0}")]
    PositionOverflow(OrderPosition),

    /// A de-collision value could not be derived for the task.
    #[error("de-collision value for task {0} overflows the order range")]
    DecollisionOverflow(TaskId),

    /// The ordering policy holds a non-positive constant.
    #[error("ordering constant '{name}' must be positive, got {value}")]
    InvalidOrderingConstant {
        /// Constant name.
        name: &'static str,
        /// Rejected value.
        value: i64,
    },

    /// A reorder request lists the same task more than once.
    #[error("task {0} appears more than once in the reorder list")]
    DuplicateReorderEntry(TaskId),

    /// A reorder request lists a task that does not exist.
    #[error("task {0} in the reorder list does not exist")]
    UnknownReorderEntry(TaskId),

    /// A reorder request omits stored tasks.
    #[error("reorder list omits {} stored task(s), first missing is {}", .missing.len(), first_missing(.missing))]
    IncompleteReorder {
        /// Stored tasks absent from the request.
        missing: Vec<TaskId>,
    },
}

fn first_missing(missing: &[TaskId]) -> String {
    missing
        .first()
        .map_or_else(|| "none".to_owned(), ToString::to_string)
}
