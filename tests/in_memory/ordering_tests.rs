//! Adjacent move and bulk reorder behaviour over the in-memory repository.

use std::collections::HashSet;

use super::helpers::{MemoryStore, ensure_unique_positions, layout, request, seed, store};
use rstest::rstest;
use tasklist::task::services::OrderedTaskErrorKind;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn move_up_exchanges_only_the_adjacent_pair(store: MemoryStore) -> eyre::Result<()> {
    let ids = seed(&store, &["A", "B", "C", "D"]).await?;

    store
        .move_up(ids[2])
        .await
        .map_err(|err| eyre::eyre!("move failed: {err}"))?;

    eyre::ensure!(
        layout(&store).await? == vec![(ids[0], 1), (ids[2], 2), (ids[1], 3), (ids[3], 4)],
        "only B and C should exchange positions"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn boundary_moves_report_no_op(store: MemoryStore) -> eyre::Result<()> {
    let ids = seed(&store, &["first", "last"]).await?;
    let before = layout(&store).await?;

    let up = store.move_up(ids[0]).await.err().map(|err| err.kind());
    let down = store.move_down(ids[1]).await.err().map(|err| err.kind());

    eyre::ensure!(up == Some(OrderedTaskErrorKind::NoOp), "move up should be a no-op");
    eyre::ensure!(down == Some(OrderedTaskErrorKind::NoOp), "move down should be a no-op");
    eyre::ensure!(layout(&store).await? == before, "boundary moves must not write");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn moving_a_task_to_the_top_walks_past_each_neighbour(
    store: MemoryStore,
) -> eyre::Result<()> {
    let ids = seed(&store, &["A", "B", "C", "D", "E"]).await?;

    for _ in 0..4 {
        store
            .move_up(ids[4])
            .await
            .map_err(|err| eyre::eyre!("move failed: {err}"))?;
        ensure_unique_positions(&store).await?;
    }

    let order: Vec<_> = layout(&store).await?.into_iter().map(|(id, _)| id).collect();
    eyre::ensure!(
        order == vec![ids[4], ids[0], ids[1], ids[2], ids[3]],
        "E should reach the top with the rest in original order"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reorder_assigns_sequential_positions(store: MemoryStore) -> eyre::Result<()> {
    let ids = seed(&store, &["A", "B", "C"]).await?;
    store
        .move_down(ids[0])
        .await
        .map_err(|err| eyre::eyre!("move failed: {err}"))?;

    store
        .reorder(&[ids[2], ids[0], ids[1]])
        .await
        .map_err(|err| eyre::eyre!("reorder failed: {err}"))?;

    eyre::ensure!(
        layout(&store).await? == vec![(ids[2], 1), (ids[0], 2), (ids[1], 3)],
        "positions should follow the requested sequence"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reorder_reapplied_yields_identical_positions(store: MemoryStore) -> eyre::Result<()> {
    let ids = seed(&store, &["A", "B", "C", "D"]).await?;
    let requested = [ids[3], ids[1], ids[0], ids[2]];

    store
        .reorder(&requested)
        .await
        .map_err(|err| eyre::eyre!("first reorder failed: {err}"))?;
    let first = layout(&store).await?;
    store
        .reorder(&requested)
        .await
        .map_err(|err| eyre::eyre!("second reorder failed: {err}"))?;

    eyre::ensure!(layout(&store).await? == first, "reorder must be idempotent");
    Ok(())
}

#[rstest]
#[case::duplicate(true)]
#[case::unknown(false)]
#[tokio::test(flavor = "multi_thread")]
async fn reorder_rejects_lists_that_are_not_permutations(
    store: MemoryStore,
    #[case] duplicate: bool,
) -> eyre::Result<()> {
    let ids = seed(&store, &["A", "B"]).await?;
    let before = layout(&store).await?;
    let stray = store
        .create_task(request("C"))
        .await
        .map_err(|err| eyre::eyre!("create failed: {err}"))?;
    store
        .delete_task(stray.id())
        .await
        .map_err(|err| eyre::eyre!("delete failed: {err}"))?;
    let requested = if duplicate {
        vec![ids[0], ids[0]]
    } else {
        vec![ids[0], ids[1], stray.id()]
    };

    let kind = store.reorder(&requested).await.err().map(|err| err.kind());

    eyre::ensure!(
        kind == Some(OrderedTaskErrorKind::ValidationFailure),
        "expected validation failure, got {kind:?}"
    );
    eyre::ensure!(layout(&store).await? == before, "rejected reorder must not write");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_moves_never_duplicate_positions(store: MemoryStore) -> eyre::Result<()> {
    let ids = seed(&store, &["A", "B", "C", "D", "E", "F"]).await?;

    let mut handles = Vec::new();
    for round in 0..24_usize {
        let worker = store.clone();
        let id = ids[round.rem_euclid(ids.len())];
        handles.push(tokio::spawn(async move {
            if round.rem_euclid(2) == 0 {
                worker.move_up(id).await.map(|_| ())
            } else {
                worker.move_down(id).await.map(|_| ())
            }
        }));
    }
    for handle in handles {
        // Individual moves may lose a race; only the committed state matters.
        let _outcome = handle.await?;
    }

    ensure_unique_positions(&store).await?;
    let stored: HashSet<_> = layout(&store).await?.into_iter().map(|(id, _)| id).collect();
    let expected: HashSet<_> = ids.into_iter().collect();
    eyre::ensure!(stored == expected, "no task may be lost");
    Ok(())
}
