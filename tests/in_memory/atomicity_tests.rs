//! All-or-nothing behaviour of ordering transactions.
//!
//! A decorating repository sabotages one write of each transaction by
//! pointing it at the position the preceding write just claimed, which the
//! position uniqueness check rejects mid-batch.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::DefaultClock;
use rstest::rstest;
use tasklist::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{
        MoveDirection, NewTask, OrderPosition, PositionWrite, Task, TaskDetails, TaskId, TaskName,
    },
    ports::{TaskRepository, TaskRepositoryResult},
    services::{OrderedTaskErrorKind, OrderedTaskStore},
};

use super::helpers::{MemoryStore, layout, seed};

struct CollidingWriteRepository {
    inner: InMemoryTaskRepository,
    sabotaged_write: usize,
}

#[async_trait]
impl TaskRepository for CollidingWriteRepository {
    async fn insert_last(&self, task: NewTask) -> TaskRepositoryResult<Task> {
        self.inner.insert_last(task).await
    }

    async fn update_details(
        &self,
        id: TaskId,
        details: TaskDetails,
        updated_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Task> {
        self.inner.update_details(id, details, updated_at).await
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        self.inner.delete(id).await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.inner.find_by_id(id).await
    }

    async fn list_ordered(&self) -> TaskRepositoryResult<Vec<Task>> {
        self.inner.list_ordered().await
    }

    async fn find_max_order(&self) -> TaskRepositoryResult<Option<OrderPosition>> {
        self.inner.find_max_order().await
    }

    async fn find_adjacent(
        &self,
        position: OrderPosition,
        direction: MoveDirection,
    ) -> TaskRepositoryResult<Option<Task>> {
        self.inner.find_adjacent(position, direction).await
    }

    async fn find_by_name_case_insensitive(
        &self,
        name: &TaskName,
        exclude: Option<TaskId>,
    ) -> TaskRepositoryResult<Option<Task>> {
        self.inner.find_by_name_case_insensitive(name, exclude).await
    }

    async fn run_in_transaction(&self, writes: Vec<PositionWrite>) -> TaskRepositoryResult<()> {
        let occupied = self
            .sabotaged_write
            .checked_sub(1)
            .and_then(|previous| writes.get(previous))
            .map(|write| write.position());
        let sabotaged = writes
            .into_iter()
            .enumerate()
            .map(|(index, write)| match occupied {
                Some(position) if index == self.sabotaged_write => {
                    PositionWrite::new(write.task_id(), position)
                }
                _ => write,
            })
            .collect();
        self.inner.run_in_transaction(sabotaged).await
    }
}

fn sabotaged_store(sabotaged_write: usize) -> MemoryStore<CollidingWriteRepository> {
    let repository = CollidingWriteRepository {
        inner: InMemoryTaskRepository::new(),
        sabotaged_write,
    };
    OrderedTaskStore::new(Arc::new(repository), Arc::new(DefaultClock))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_second_swap_write_leaves_the_list_untouched() -> eyre::Result<()> {
    let store = sabotaged_store(1);
    let ids = seed(&store, &["A", "B", "C"]).await?;
    let before = layout(&store).await?;

    let result = store.move_up(ids[2]).await;

    let kind = result.err().map(|err| err.kind());
    eyre::ensure!(
        kind == Some(OrderedTaskErrorKind::StorageFailure),
        "expected storage failure, got {kind:?}"
    );
    eyre::ensure!(layout(&store).await? == before, "no write may persist");
    Ok(())
}

#[rstest]
#[case::second_phase_one_write(1)]
#[case::first_phase_two_write(3)]
#[case::last_write(5)]
#[tokio::test(flavor = "multi_thread")]
async fn failed_reorder_write_leaves_the_list_untouched(
    #[case] sabotaged_write: usize,
) -> eyre::Result<()> {
    let store = sabotaged_store(sabotaged_write);
    let ids = seed(&store, &["A", "B", "C"]).await?;
    let before = layout(&store).await?;

    let result = store.reorder(&[ids[1], ids[2], ids[0]]).await;

    eyre::ensure!(result.is_err(), "sabotaged reorder should fail");
    eyre::ensure!(layout(&store).await? == before, "no phase may persist");
    Ok(())
}
