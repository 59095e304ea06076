//! Integration tests for pagination, projection and condition groups.

mod helpers;

use erp_core::error::ErrorKind;
use erp_core::types::filter::{ConditionGroup, FieldPath, FilterField};
use erp_core::types::query::{ListParams, ListQuery};
use erp_database::repositories::SequenceRepository;
use erp_entity::sequence::CreateSequence;

async fn seed(repo: &SequenceRepository, tag: &str, rows: usize) {
    for i in 0..rows {
        repo.create(
            &CreateSequence::new(
                format!("{tag}-{i:03}"),
                helpers::unique("P"),
                format!("{tag}-struct-{i:03}"),
            )
            .with_padding((i % 10) as i64),
            None,
        )
        .await
        .expect("create should succeed");
    }
}

fn by_tag(tag: &str) -> ListQuery {
    ListQuery::new().filter(FilterField::parse("name__startswith", tag).expect("filter"))
}

#[tokio::test]
async fn test_zero_limit_uses_default_page_size() {
    let Some(pool) = helpers::maybe_pool("test_zero_limit_uses_default_page_size").await else {
        return;
    };
    let repo = SequenceRepository::new(pool);
    let tag = helpers::unique("page");
    seed(&repo, &tag, 25).await;

    let page = repo.list(&by_tag(&tag).page(0, 0)).await.expect("list");
    assert_eq!(page.items.len(), 20);
    assert_eq!(page.paginator.total_count, 25);
    assert_eq!(page.paginator.total_pages, 2);
    assert!(page.paginator.has_next);

    let last = repo.list(&by_tag(&tag).page(20, 0)).await.expect("list");
    assert_eq!(last.items.len(), 5);
    assert_eq!(last.paginator.current_page, 2);
    assert!(!last.paginator.has_next);

    // Default order is by id, so both pages together cover every row once.
    let mut names: Vec<String> = page.items.into_iter().chain(last.items).map(|s| s.name).collect();
    names.dedup();
    assert_eq!(names.len(), 25);
}

#[tokio::test]
async fn test_projection_zeroes_unloaded_columns() {
    let Some(pool) = helpers::maybe_pool("test_projection_zeroes_unloaded_columns").await else {
        return;
    };
    let repo = SequenceRepository::new(pool);
    let tag = helpers::unique("proj");
    seed(&repo, &tag, 2).await;

    let page = repo
        .list(&by_tag(&tag).fields(vec![FieldPath::column("name")]))
        .await
        .expect("list");
    assert_eq!(page.items.len(), 2);
    for item in &page.items {
        assert!(item.name.starts_with(&tag));
        assert!(item.prefix.is_empty());
        assert_eq!(item.padding, 0);
        assert!(!item.active);
        assert!(item.id.get() > 0);
    }
}

#[tokio::test]
async fn test_or_group_and_exclude() {
    let Some(pool) = helpers::maybe_pool("test_or_group_and_exclude").await else {
        return;
    };
    let repo = SequenceRepository::new(pool);
    let tag = helpers::unique("cond");
    seed(&repo, &tag, 6).await;

    let query = by_tag(&tag)
        .condition(ConditionGroup::any(vec![
            FilterField::eq("padding", 1i64),
            FilterField::eq("padding", 4i64),
            FilterField::eq("padding", 5i64),
        ]))
        .exclude(FilterField::eq("name", format!("{tag}-004")));
    let page = repo.list(&query).await.expect("list");

    let mut names: Vec<String> = page.items.into_iter().map(|s| s.name).collect();
    names.sort();
    assert_eq!(names, vec![format!("{tag}-001"), format!("{tag}-005")]);
}

#[tokio::test]
async fn test_params_sort_and_unknown_field() {
    let Some(pool) = helpers::maybe_pool("test_params_sort_and_unknown_field").await else {
        return;
    };
    let repo = SequenceRepository::new(pool);
    let tag = helpers::unique("params");
    seed(&repo, &tag, 3).await;

    let mut params = ListParams::default();
    params.query.insert("name__startswith".into(), tag.clone());
    params.sortby = vec!["padding".into()];
    params.order = vec!["desc".into()];
    let page = repo
        .list(&ListQuery::from_params(&params).expect("params"))
        .await
        .expect("list");
    let paddings: Vec<i64> = page.items.iter().map(|s| s.padding).collect();
    assert_eq!(paddings, vec![2, 1, 0]);

    let err = repo
        .list(&ListQuery::new().filter(FilterField::eq("colour", "red")))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}
