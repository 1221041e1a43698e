//! Task aggregate and the pending-insert value handed to repositories.

use super::{Cost, OrderPosition, TaskDetails, TaskId, TaskName};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A task awaiting insertion. The store assigns its identifier and its
/// position at the end of the presentation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    details: TaskDetails,
    created_at: DateTime<Utc>,
}

impl NewTask {
    /// Prepares a task for insertion, stamping the creation time.
    #[must_use]
    pub fn new(details: TaskDetails, clock: &impl Clock) -> Self {
        Self {
            details,
            created_at: clock.utc(),
        }
    }

    /// Returns the task attributes.
    #[must_use]
    pub const fn details(&self) -> &TaskDetails {
        &self.details
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Materializes the stored task once the store has assigned its
    /// identifier and position.
    #[must_use]
    pub fn into_task(self, id: TaskId, position: OrderPosition) -> Task {
        Task {
            id,
            details: self.details,
            position,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    #[serde(flatten)]
    details: TaskDetails,
    position: OrderPosition,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted name, cost and due date.
    pub details: TaskDetails,
    /// Persisted presentation position.
    pub position: OrderPosition,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest edit timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            details: data.details,
            position: data.position,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the name, cost and due date.
    #[must_use]
    pub const fn details(&self) -> &TaskDetails {
        &self.details
    }

    /// Returns the task name.
    #[must_use]
    pub const fn name(&self) -> &TaskName {
        self.details.name()
    }

    /// Returns the task cost.
    #[must_use]
    pub const fn cost(&self) -> Cost {
        self.details.cost()
    }

    /// Returns the task due date.
    #[must_use]
    pub const fn due_date(&self) -> DateTime<Utc> {
        self.details.due_date()
    }

    /// Returns the presentation position.
    #[must_use]
    pub const fn position(&self) -> OrderPosition {
        self.position
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest edit timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replaces the editable attributes, leaving the position untouched.
    pub fn revise(&mut self, details: TaskDetails, updated_at: DateTime<Utc>) {
        self.details = details;
        self.updated_at = updated_at;
    }

    /// Moves the task to `position`.
    ///
    /// Only repositories applying an ordering write call this; services
    /// express position changes as [`super::PositionWrite`] batches.
    pub const fn reposition(&mut self, position: OrderPosition) {
        self.position = position;
    }
}
