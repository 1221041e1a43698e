//! Create, edit and delete behaviour against `PostgreSQL`.

use crate::postgres::helpers::{BoxError, PgContextResult, layout, pg_context, request, seed};
use mockable::{Clock, DefaultClock};
use rstest::rstest;
use tasklist::task::{
    domain::{NewTask, TaskDetails, TaskId},
    ports::{TaskRepository, TaskRepositoryError},
    services::{OrderedTaskErrorKind, TaskDetailsRequest},
};

#[rstest]
fn postgres_create_appends_and_round_trips_details(
    pg_context: PgContextResult,
) -> Result<(), BoxError> {
    let context = pg_context?;
    context.block_on(async {
        let ids = seed(&context.store, &["first", "second"]).await?;

        let created = context
            .store
            .create_task(TaskDetailsRequest::new(
                "  Third ",
                "1234,5",
                DefaultClock.utc(),
            ))
            .await?;
        let fetched = context.store.get_task(created.id()).await?;

        assert_eq!(fetched.name().as_str(), "Third");
        assert_eq!(fetched.cost().cents(), 123_450);
        assert_eq!(fetched.position().value(), 3);
        assert_eq!(fetched.due_date().timestamp(), created.due_date().timestamp());
        assert_eq!(
            layout(&context.store).await?,
            vec![(ids[0], 1), (ids[1], 2), (created.id(), 3)]
        );
        Ok::<(), BoxError>(())
    })
}

#[rstest]
fn postgres_rejects_case_insensitive_duplicates(
    pg_context: PgContextResult,
) -> Result<(), BoxError> {
    let context = pg_context?;
    context.block_on(async {
        seed(&context.store, &["Quarterly Review"]).await?;

        let result = context.store.create_task(request("quarterly review")).await;

        assert_eq!(
            result.err().map(|err| err.kind()),
            Some(OrderedTaskErrorKind::DuplicateName)
        );
        assert_eq!(layout(&context.store).await?.len(), 1);
        Ok::<(), BoxError>(())
    })
}

#[rstest]
fn postgres_repository_enforces_name_uniqueness_on_insert(
    pg_context: PgContextResult,
) -> Result<(), BoxError> {
    let context = pg_context?;
    context.block_on(async {
        seed(&context.store, &["Unique"]).await?;
        let existing = context.store.list_tasks().await?;
        let details: TaskDetails = existing
            .first()
            .map(|task| task.details().clone())
            .ok_or("seeded task missing")?;

        let result = context
            .repository
            .insert_last(NewTask::new(details, &DefaultClock))
            .await;

        assert!(matches!(result, Err(TaskRepositoryError::DuplicateName(_))));
        Ok::<(), BoxError>(())
    })
}

#[rstest]
fn postgres_edit_keeps_the_position(pg_context: PgContextResult) -> Result<(), BoxError> {
    let context = pg_context?;
    context.block_on(async {
        let ids = seed(&context.store, &["a", "b", "c"]).await?;

        let edited = context.store.edit_task(ids[1], request("B")).await?;

        assert_eq!(edited.name().as_str(), "B");
        assert_eq!(edited.position().value(), 2);
        assert!(edited.updated_at() >= edited.created_at());

        let clash = context.store.edit_task(ids[2], request("a")).await;
        assert_eq!(
            clash.err().map(|err| err.kind()),
            Some(OrderedTaskErrorKind::DuplicateName)
        );
        Ok::<(), BoxError>(())
    })
}

#[rstest]
fn postgres_delete_leaves_gaps_and_reports_missing(
    pg_context: PgContextResult,
) -> Result<(), BoxError> {
    let context = pg_context?;
    context.block_on(async {
        let ids = seed(&context.store, &["a", "b", "c"]).await?;

        context.store.delete_task(ids[1]).await?;
        let again = context.store.delete_task(ids[1]).await;
        let appended = seed(&context.store, &["d"]).await?;

        assert_eq!(
            again.err().map(|err| err.kind()),
            Some(OrderedTaskErrorKind::NotFound)
        );
        assert_eq!(
            layout(&context.store).await?,
            vec![(ids[0], 1), (ids[2], 3), (appended[0], 4)]
        );
        let missing = TaskId::new(i64::MAX)?;
        assert!(context.store.get_task(missing).await.is_err());
        Ok::<(), BoxError>(())
    })
}

#[rstest]
fn postgres_edit_of_missing_task_is_not_found(pg_context: PgContextResult) -> Result<(), BoxError> {
    let context = pg_context?;
    context.block_on(async {
        seed(&context.store, &["Taken"]).await?;
        let missing = TaskId::new(i64::MAX)?;

        let result = context.store.edit_task(missing, request("taken")).await;

        assert_eq!(
            result.err().map(|err| err.kind()),
            Some(OrderedTaskErrorKind::NotFound)
        );
        Ok::<(), BoxError>(())
    })
}
