//! Identifier and ordering scalar types for the task domain.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned identifier for a task record.
///
/// Identifiers are strictly positive so that scaling them by a positive
/// multiplier yields pairwise distinct values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(i64);

impl TaskId {
    /// Creates a validated task identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTaskId`] when the value is zero or
    /// negative.
    pub const fn new(value: i64) -> Result<Self, TaskDomainError> {
        if value <= 0 {
            return Err(TaskDomainError::InvalidTaskId(value));
        }
        Ok(Self(value))
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of a task in presentation order (`ordem_apresentacao`).
///
/// Positions are compared numerically; gaps between consecutive tasks are
/// permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderPosition(i64);

impl OrderPosition {
    /// Position assigned to the first task of an empty collection.
    pub const FIRST: Self = Self(1);

    /// Wraps a raw position value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Returns the position a task appended after `max` receives.
    ///
    /// An empty collection (`None`) yields [`OrderPosition::FIRST`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::PositionOverflow`] when `max` is already the
    /// largest representable position.
    pub fn after(max: Option<Self>) -> Result<Self, TaskDomainError> {
        max.map_or(Ok(Self::FIRST), |current| current.offset_by(1))
    }

    /// Returns this position shifted by `delta`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::PositionOverflow`] on arithmetic overflow.
    pub fn offset_by(self, delta: i64) -> Result<Self, TaskDomainError> {
        self.0
            .checked_add(delta)
            .map(Self)
            .ok_or(TaskDomainError::PositionOverflow(self))
    }
}

impl fmt::Display for OrderPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
