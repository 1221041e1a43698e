//! Order-value computation for adjacent moves and bulk reorders.
//!
//! Every plan is a sequence of [`PositionWrite`]s that a repository applies
//! in the given order inside one transaction. The order-position column is
//! unique at every statement (no deferred checking), so each plan routes
//! values through a de-collision range strictly above every stored position
//! before assigning final values.

use super::{OrderPosition, Task, TaskDomainError, TaskId};
use std::collections::HashSet;

/// Direction of an adjacent move in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveDirection {
    /// Towards the start of the list (smaller positions).
    Up,
    /// Towards the end of the list (larger positions).
    Down,
}

impl MoveDirection {
    /// Returns the canonical textual representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

/// A single assignment of a position to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositionWrite {
    task_id: TaskId,
    position: OrderPosition,
}

impl PositionWrite {
    /// Creates a write assigning `position` to `task_id`.
    #[must_use]
    pub const fn new(task_id: TaskId, position: OrderPosition) -> Self {
        Self { task_id, position }
    }

    /// Returns the task being repositioned.
    #[must_use]
    pub const fn task_id(self) -> TaskId {
        self.task_id
    }

    /// Returns the position being assigned.
    #[must_use]
    pub const fn position(self) -> OrderPosition {
        self.position
    }
}

/// Constants steering de-collision values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderingPolicy {
    move_offset: i64,
    reorder_multiplier: i64,
}

impl OrderingPolicy {
    /// Default distance of the temporary value used by adjacent moves.
    pub const DEFAULT_MOVE_OFFSET: i64 = 1000;
    /// Default identifier multiplier used by bulk reorders.
    pub const DEFAULT_REORDER_MULTIPLIER: i64 = 1000;

    /// Creates a policy from positive constants.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidOrderingConstant`] when either
    /// constant is zero or negative.
    pub const fn new(move_offset: i64, reorder_multiplier: i64) -> Result<Self, TaskDomainError> {
        if move_offset <= 0 {
            return Err(TaskDomainError::InvalidOrderingConstant {
                name: "move_offset",
                value: move_offset,
            });
        }
        if reorder_multiplier <= 0 {
            return Err(TaskDomainError::InvalidOrderingConstant {
                name: "reorder_multiplier",
                value: reorder_multiplier,
            });
        }
        Ok(Self {
            move_offset,
            reorder_multiplier,
        })
    }

    /// Returns the adjacent-move offset.
    #[must_use]
    pub const fn move_offset(self) -> i64 {
        self.move_offset
    }

    /// Returns the bulk-reorder multiplier floor.
    #[must_use]
    pub const fn reorder_multiplier(self) -> i64 {
        self.reorder_multiplier
    }
}

impl Default for OrderingPolicy {
    fn default() -> Self {
        Self {
            move_offset: Self::DEFAULT_MOVE_OFFSET,
            reorder_multiplier: Self::DEFAULT_REORDER_MULTIPLIER,
        }
    }
}

/// Three-write exchange of positions between a task and its neighbour.
///
/// Writes, in order:
///
/// 1. the moving task parks on a temporary value above every stored position;
/// 2. the neighbour takes the moving task's original position;
/// 3. the moving task takes the neighbour's original position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapPlan {
    writes: [PositionWrite; 3],
}

impl SwapPlan {
    /// Plans the exchange of `moving` with its adjacent `neighbour`.
    ///
    /// `current_max` is the largest stored position. The temporary value is
    /// `max(original + move_offset, current_max + 1)`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::PositionOverflow`] when the temporary value
    /// cannot be represented.
    pub fn new(
        moving: &Task,
        neighbour: &Task,
        current_max: OrderPosition,
        policy: OrderingPolicy,
    ) -> Result<Self, TaskDomainError> {
        let original = moving.position();
        let target = neighbour.position();
        let temporary = original
            .offset_by(policy.move_offset())?
            .max(current_max.offset_by(1)?);

        Ok(Self {
            writes: [
                PositionWrite::new(moving.id(), temporary),
                PositionWrite::new(neighbour.id(), original),
                PositionWrite::new(moving.id(), target),
            ],
        })
    }

    /// Returns the writes in execution order.
    #[must_use]
    pub const fn writes(&self) -> &[PositionWrite] {
        &self.writes
    }

    /// Returns the final write for the moving task.
    #[must_use]
    pub const fn moved(&self) -> PositionWrite {
        self.writes[2]
    }

    /// Returns the final write for the displaced neighbour.
    #[must_use]
    pub const fn displaced(&self) -> PositionWrite {
        self.writes[1]
    }
}

/// Two-phase renumbering of the whole collection.
///
/// Phase one moves every task to `id * M`, phase two assigns `1..=N` in the
/// requested order. `M` is the larger of the policy multiplier and
/// `floor(F / min_id) + 1` with `F = max(current_max, N)`, which keeps every
/// phase-one value above every stored value and every phase-two value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderPlan {
    decollide: Vec<PositionWrite>,
    assign: Vec<PositionWrite>,
}

impl ReorderPlan {
    /// Plans the reorder of `stored` into the sequence given by `requested`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::DuplicateReorderEntry`],
    /// [`TaskDomainError::UnknownReorderEntry`] or
    /// [`TaskDomainError::IncompleteReorder`] unless `requested` is a
    /// permutation of the stored identifiers, and
    /// [`TaskDomainError::DecollisionOverflow`] when a phase-one value cannot
    /// be represented.
    pub fn new(
        requested: &[TaskId],
        stored: &[Task],
        policy: OrderingPolicy,
    ) -> Result<Self, TaskDomainError> {
        ensure_permutation(requested, stored)?;
        let current_max = stored.iter().map(Task::position).max();
        let multiplier = decollision_multiplier(requested, current_max, policy)?;

        let decollide = requested
            .iter()
            .map(|&id| {
                id.value()
                    .checked_mul(multiplier)
                    .map(|value| PositionWrite::new(id, OrderPosition::new(value)))
                    .ok_or(TaskDomainError::DecollisionOverflow(id))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let assign = requested
            .iter()
            .zip(OrderPosition::FIRST.value()..)
            .map(|(&id, rank)| PositionWrite::new(id, OrderPosition::new(rank)))
            .collect();

        Ok(Self { decollide, assign })
    }

    /// Returns the phase-one writes.
    #[must_use]
    pub fn decollide(&self) -> &[PositionWrite] {
        &self.decollide
    }

    /// Returns the phase-two writes.
    #[must_use]
    pub fn assign(&self) -> &[PositionWrite] {
        &self.assign
    }

    /// Returns `true` when the plan touches no task.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assign.is_empty()
    }

    /// Returns both phases as one ordered batch.
    #[must_use]
    pub fn into_writes(self) -> Vec<PositionWrite> {
        let mut writes = self.decollide;
        writes.extend(self.assign);
        writes
    }
}

fn ensure_permutation(requested: &[TaskId], stored: &[Task]) -> Result<(), TaskDomainError> {
    let stored_ids: HashSet<TaskId> = stored.iter().map(Task::id).collect();
    let mut seen = HashSet::with_capacity(requested.len());
    for &id in requested {
        if !stored_ids.contains(&id) {
            return Err(TaskDomainError::UnknownReorderEntry(id));
        }
        if !seen.insert(id) {
            return Err(TaskDomainError::DuplicateReorderEntry(id));
        }
    }

    let mut missing: Vec<TaskId> = stored_ids.difference(&seen).copied().collect();
    if missing.is_empty() {
        return Ok(());
    }
    missing.sort_unstable();
    Err(TaskDomainError::IncompleteReorder { missing })
}

fn decollision_multiplier(
    requested: &[TaskId],
    current_max: Option<OrderPosition>,
    policy: OrderingPolicy,
) -> Result<i64, TaskDomainError> {
    let Some(min_id) = requested.iter().copied().min() else {
        return Ok(policy.reorder_multiplier());
    };
    let count = i64::try_from(requested.len())
        .map_err(|_| TaskDomainError::DecollisionOverflow(min_id))?;
    let ceiling = current_max.map_or(0, OrderPosition::value).max(count);
    let minimum = ceiling
        .checked_div(min_id.value())
        .and_then(|quotient| quotient.checked_add(1))
        .ok_or(TaskDomainError::DecollisionOverflow(min_id))?;
    Ok(policy.reorder_multiplier().max(minimum))
}
