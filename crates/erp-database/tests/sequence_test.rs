//! Integration tests for sequence allocation and CRUD.

mod helpers;

use std::collections::HashSet;

use erp_core::error::ErrorKind;
use erp_core::traits::Repository;
use erp_core::types::filter::FilterField;
use erp_core::types::id::{SequenceId, UserId};
use erp_core::types::query::ListQuery;
use erp_core::types::sorting::SortField;
use erp_database::repositories::SequenceRepository;
use erp_entity::sequence::{CreateSequence, Sequence, UpdateSequence};

#[tokio::test]
async fn test_next_value_is_padded_and_gap_free() {
    let Some(pool) = helpers::maybe_pool("test_next_value_is_padded_and_gap_free").await else {
        return;
    };
    let repo = SequenceRepository::new(pool);
    let struct_name = helpers::unique("order");
    let prefix = helpers::unique("SO");

    repo.create(
        &CreateSequence::new(helpers::unique("seq"), prefix.clone(), struct_name.clone())
            .with_padding(6)
            .with_current(41),
        Some(UserId::new(1)),
    )
    .await
    .expect("create should succeed");

    assert_eq!(
        repo.preview_next(&struct_name).await.expect("preview"),
        format!("{prefix}000042")
    );

    for expected in 42..47 {
        let value = repo.next_value(&struct_name).await.expect("allocate");
        assert_eq!(value, format!("{prefix}{expected:06}"));
        assert_eq!(value.len(), prefix.len() + 6);
    }
}

#[tokio::test]
async fn test_concurrent_allocations_are_unique() {
    let Some(pool) = helpers::maybe_pool("test_concurrent_allocations_are_unique").await else {
        return;
    };
    let repo = SequenceRepository::new(pool);
    let struct_name = helpers::unique("invoice");
    repo.create(
        &CreateSequence::new(helpers::unique("seq"), helpers::unique("INV"), struct_name.clone()),
        None,
    )
    .await
    .expect("create should succeed");

    let tasks = (0..32).map(|_| {
        let repo = repo.clone();
        let struct_name = struct_name.clone();
        tokio::spawn(async move { repo.next_value(&struct_name).await })
    });
    let values: Vec<String> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.expect("task should not panic").expect("allocate"))
        .collect();

    let distinct: HashSet<&String> = values.iter().collect();
    assert_eq!(distinct.len(), 32);

    let counter = repo
        .find_default(&struct_name)
        .await
        .expect("default counter");
    assert_eq!(counter.current, 32);
}

#[tokio::test]
async fn test_allocation_inside_rolled_back_transaction() {
    let Some(pool) = helpers::maybe_pool("test_allocation_inside_rolled_back_transaction").await
    else {
        return;
    };
    let repo = SequenceRepository::new(pool.clone());
    let struct_name = helpers::unique("delivery");
    repo.create(
        &CreateSequence::new(helpers::unique("seq"), helpers::unique("DN"), struct_name.clone()),
        None,
    )
    .await
    .expect("create should succeed");

    let mut tx = pool.begin().await.expect("begin");
    SequenceRepository::next_value_with(&mut *tx, &struct_name)
        .await
        .expect("allocate in transaction");
    tx.rollback().await.expect("rollback");

    let counter = repo.find_default(&struct_name).await.expect("default counter");
    assert_eq!(counter.current, 0);
}

#[tokio::test]
async fn test_next_value_without_default_is_not_found() {
    let Some(pool) = helpers::maybe_pool("test_next_value_without_default_is_not_found").await
    else {
        return;
    };
    let repo = SequenceRepository::new(pool);
    let struct_name = helpers::unique("quote");

    let mut inactive =
        CreateSequence::new(helpers::unique("seq"), helpers::unique("Q"), struct_name.clone());
    inactive.active = false;
    repo.create(&inactive, None).await.expect("create should succeed");

    let err = repo.next_value(&struct_name).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_second_default_for_struct_conflicts() {
    let Some(pool) = helpers::maybe_pool("test_second_default_for_struct_conflicts").await else {
        return;
    };
    let repo = SequenceRepository::new(pool.clone());
    let struct_name = helpers::unique("receipt");
    repo.create(
        &CreateSequence::new(helpers::unique("seq"), helpers::unique("RC"), struct_name.clone()),
        None,
    )
    .await
    .expect("create should succeed");

    let name = helpers::unique("seq");
    let err = repo
        .create(
            &CreateSequence::new(name.clone(), helpers::unique("RD"), struct_name),
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(helpers::count_named(&pool, "sequences", &name).await, 0);
}

#[tokio::test]
async fn test_duplicate_name_rolls_back() {
    let Some(pool) = helpers::maybe_pool("test_duplicate_name_rolls_back").await else {
        return;
    };
    let repo = SequenceRepository::new(pool.clone());
    let name = helpers::unique("seq");
    repo.create(
        &CreateSequence::new(name.clone(), helpers::unique("A"), helpers::unique("a")),
        None,
    )
    .await
    .expect("create should succeed");

    let err = repo
        .create(
            &CreateSequence::new(name.clone(), helpers::unique("B"), helpers::unique("b")),
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(helpers::count_named(&pool, "sequences", &name).await, 1);
}

#[tokio::test]
async fn test_update_and_delete() {
    let Some(pool) = helpers::maybe_pool("test_update_and_delete").await else {
        return;
    };
    let logs = helpers::LogCapture::default();
    let _guard = logs.install();
    let repo = SequenceRepository::new(pool);
    let created = repo
        .create(
            &CreateSequence::new(helpers::unique("seq"), helpers::unique("U"), helpers::unique("u")),
            Some(UserId::new(7)),
        )
        .await
        .expect("create should succeed");

    let updated = repo
        .update_by_id(
            created.id,
            &UpdateSequence {
                padding: Some(3),
                ..Default::default()
            },
            Some(UserId::new(8)),
        )
        .await
        .expect("update should succeed");
    assert_eq!(updated.padding, 3);
    assert_eq!(updated.prefix, created.prefix);
    assert_eq!(updated.create_user_id, Some(UserId::new(7)));
    assert_eq!(updated.update_user_id, Some(UserId::new(8)));

    repo.delete_by_id(created.id).await.expect("delete should succeed");
    let err = repo.find_by_id(created.id).await.unwrap_err();
    assert!(err.is_not_found());

    for message in ["Updated sequence", "Deleted sequence"] {
        let lines = logs.lines_with(message);
        assert_eq!(lines.len(), 1, "{}", logs.contents());
        assert!(lines[0].contains("rows_affected=1"), "{}", lines[0]);
    }
}

#[tokio::test]
async fn test_missing_rows_are_not_found() {
    let Some(pool) = helpers::maybe_pool("test_missing_rows_are_not_found").await else {
        return;
    };
    let repo = SequenceRepository::new(pool);
    let known = repo
        .create(
            &CreateSequence::new(
                helpers::unique("known"),
                helpers::unique("KN"),
                helpers::unique("known_struct"),
            )
            .with_padding(5)
            .with_current(12),
            Some(UserId::new(3)),
        )
        .await
        .expect("create should succeed");
    let missing = SequenceId::new(i64::MAX);

    let err = repo
        .update_by_id(
            missing,
            &UpdateSequence {
                name: Some(helpers::unique("ghost")),
                current: Some(99),
                ..Default::default()
            },
            Some(UserId::new(4)),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = repo.delete_by_id(missing).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = repo.find_by_name(&helpers::unique("ghost")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let reread = repo.find_by_id(known.id).await.expect("known row survives");
    assert_eq!(reread.name, known.name);
    assert_eq!(reread.prefix, known.prefix);
    assert_eq!(reread.struct_name, known.struct_name);
    assert_eq!(reread.current, 12);
    assert_eq!(reread.padding, 5);
    assert_eq!(reread.update_user_id, Some(UserId::new(3)));
    assert_eq!(reread.updated_at, known.updated_at);
}

#[tokio::test]
async fn test_exhausted_counter_is_a_conflict() {
    let Some(pool) = helpers::maybe_pool("test_exhausted_counter_is_a_conflict").await else {
        return;
    };
    let repo = SequenceRepository::new(pool);
    let struct_name = helpers::unique("full");
    let created = repo
        .create(
            &CreateSequence::new(helpers::unique("full"), helpers::unique("FU"), struct_name.clone())
                .with_current(i64::MAX),
            None,
        )
        .await
        .expect("i64::MAX is a storable counter");

    let err = repo.preview_next(&struct_name).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    let err = repo.next_value(&struct_name).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    let reread = repo.find_by_id(created.id).await.expect("find");
    assert_eq!(reread.current, i64::MAX);
}

#[tokio::test]
async fn test_list_filters_and_sorts() {
    let Some(pool) = helpers::maybe_pool("test_list_filters_and_sorts").await else {
        return;
    };
    let repo = SequenceRepository::new(pool);
    let tag = helpers::unique("list");
    for (i, padding) in [4, 9, 6].into_iter().enumerate() {
        let mut data = CreateSequence::new(
            format!("{tag}-{i}"),
            helpers::unique("L"),
            format!("{tag}-struct-{i}"),
        )
        .with_padding(padding);
        data.is_default = i != 1;
        repo.create(&data, None).await.expect("create should succeed");
    }

    let page = repo
        .list(
            &ListQuery::new()
                .filter(FilterField::parse("name__startswith", &tag).expect("filter"))
                .sort_by(SortField::desc("padding")),
        )
        .await
        .expect("list should succeed");
    assert_eq!(page.paginator.total_count, 3);
    let paddings: Vec<i64> = page.items.iter().map(|s| s.padding).collect();
    assert_eq!(paddings, vec![9, 6, 4]);

    let page = repo
        .list(
            &ListQuery::new()
                .filter(FilterField::parse("name__startswith", &tag).expect("filter"))
                .filter(FilterField::eq("is_default", true))
                .sort_by(SortField::asc("padding")),
        )
        .await
        .expect("list should succeed");
    let paddings: Vec<i64> = page.items.iter().map(|s| s.padding).collect();
    assert_eq!(paddings, vec![4, 6]);
}

#[tokio::test]
async fn test_repository_trait_object() {
    let Some(pool) = helpers::maybe_pool("test_repository_trait_object").await else {
        return;
    };
    let repo: Box<
        dyn Repository<Sequence, SequenceId, Create = CreateSequence, Update = UpdateSequence>,
    > = Box::new(SequenceRepository::new(pool));

    let name = helpers::unique("seq");
    let created = repo
        .create(
            &CreateSequence::new(name.clone(), helpers::unique("T"), helpers::unique("t")),
            None,
        )
        .await
        .expect("create should succeed");
    assert_eq!(repo.find_by_name(&name).await.expect("find").id, created.id);
    assert!(repo.count().await.expect("count") >= 1);
}
