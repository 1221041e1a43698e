//! In-memory repository for the ordered task list.
//!
//! Mirrors the relational constraints: positions are unique after every
//! individual write and names are unique case-insensitively. Transactions
//! run against a copy of the state that replaces the live state only when
//! every write succeeds.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{
        MoveDirection, NewTask, OrderPosition, PositionWrite, Task, TaskDetails, TaskId, TaskName,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Clone, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    positions: BTreeMap<OrderPosition, TaskId>,
    names: HashMap<String, TaskId>,
    last_id: i64,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

impl InMemoryTaskState {
    fn name_holder(&self, name: &TaskName, exclude: Option<TaskId>) -> Option<&Task> {
        self.names
            .get(&name.comparison_key())
            .filter(|id| Some(**id) != exclude)
            .and_then(|id| self.tasks.get(id))
    }

    fn next_id(&mut self) -> TaskRepositoryResult<TaskId> {
        let next = self.last_id.checked_add(1).ok_or_else(|| {
            TaskRepositoryError::persistence(std::io::Error::other("task identifiers exhausted"))
        })?;
        let id = TaskId::new(next).map_err(TaskRepositoryError::persistence)?;
        self.last_id = next;
        Ok(id)
    }

    fn apply(&mut self, write: PositionWrite) -> TaskRepositoryResult<()> {
        let task = self
            .tasks
            .get_mut(&write.task_id())
            .ok_or(TaskRepositoryError::NotFound(write.task_id()))?;
        let previous = task.position();
        if previous == write.position() {
            return Ok(());
        }
        if self.positions.contains_key(&write.position()) {
            return Err(TaskRepositoryError::OrderCollision(write.position()));
        }

        task.reposition(write.position());
        self.positions.remove(&previous);
        self.positions.insert(write.position(), write.task_id());
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn insert_last(&self, task: NewTask) -> TaskRepositoryResult<Task> {
        let mut state = self.write()?;
        let name = task.details().name();
        if state.name_holder(name, None).is_some() {
            return Err(TaskRepositoryError::DuplicateName(name.clone()));
        }

        let max = state.positions.keys().next_back().copied();
        let position = OrderPosition::after(max).map_err(TaskRepositoryError::persistence)?;
        let id = state.next_id()?;
        let stored = task.into_task(id, position);

        state.names.insert(stored.name().comparison_key(), id);
        state.positions.insert(position, id);
        state.tasks.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_details(
        &self,
        id: TaskId,
        details: TaskDetails,
        updated_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Task> {
        let mut state = self.write()?;
        let previous_key = state
            .tasks
            .get(&id)
            .ok_or(TaskRepositoryError::NotFound(id))?
            .name()
            .comparison_key();
        if state.name_holder(details.name(), Some(id)).is_some() {
            return Err(TaskRepositoryError::DuplicateName(details.name().clone()));
        }

        state.names.remove(&previous_key);
        state.names.insert(details.name().comparison_key(), id);
        let task = state
            .tasks
            .get_mut(&id)
            .ok_or(TaskRepositoryError::NotFound(id))?;
        task.revise(details, updated_at);
        Ok(task.clone())
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let removed = state
            .tasks
            .remove(&id)
            .ok_or(TaskRepositoryError::NotFound(id))?;
        state.positions.remove(&removed.position());
        state.names.remove(&removed.name().comparison_key());
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn list_ordered(&self) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        Ok(state
            .positions
            .values()
            .filter_map(|id| state.tasks.get(id).cloned())
            .collect())
    }

    async fn find_max_order(&self) -> TaskRepositoryResult<Option<OrderPosition>> {
        let state = self.read()?;
        Ok(state.positions.keys().next_back().copied())
    }

    async fn find_adjacent(
        &self,
        position: OrderPosition,
        direction: MoveDirection,
    ) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read()?;
        let adjacent = match direction {
            MoveDirection::Up => state.positions.range(..position).next_back(),
            MoveDirection::Down => state
                .positions
                .range((Bound::Excluded(position), Bound::Unbounded))
                .next(),
        };
        Ok(adjacent.and_then(|(_, id)| state.tasks.get(id).cloned()))
    }

    async fn find_by_name_case_insensitive(
        &self,
        name: &TaskName,
        exclude: Option<TaskId>,
    ) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read()?;
        Ok(state.name_holder(name, exclude).cloned())
    }

    async fn run_in_transaction(&self, writes: Vec<PositionWrite>) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let mut staged = (*state).clone();
        for write in writes {
            staged.apply(write)?;
        }
        *state = staged;
        Ok(())
    }
}
