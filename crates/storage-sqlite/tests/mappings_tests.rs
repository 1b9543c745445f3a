//! Integration tests for category mapping persistence and scope resolution.

mod common;

use posbridge_core::errors::{DatabaseError, Error};
use posbridge_core::mappings::{
    CategoryMappingRepositoryTrait, CategoryMappingUpdate, NewCategoryMapping,
};
use posbridge_storage_sqlite::mappings::CategoryMappingRepository;

fn mapping(group: &str, category: &str, store: Option<&str>) -> NewCategoryMapping {
    NewCategoryMapping {
        id: None,
        external_group_id: group.to_string(),
        external_group_name: Some(format!("{} group", group)),
        local_category_id: category.to_string(),
        store_id: store.map(str::to_string),
    }
}

#[tokio::test]
async fn test_store_scoped_row_shadows_global() {
    let (_dir, pool, writer) = common::setup_db();
    let repo = CategoryMappingRepository::new(pool, writer);

    repo.create(mapping("g-coffee", "cat-default", None)).await.unwrap();
    repo.create(mapping("g-coffee", "cat-store1", Some("store-1")))
        .await
        .unwrap();

    let scoped = repo.find_for_group("g-coffee", Some("store-1")).unwrap().unwrap();
    assert_eq!(scoped.local_category_id, "cat-store1");

    // A store without its own row falls back to the global one.
    let fallback = repo.find_for_group("g-coffee", Some("store-2")).unwrap().unwrap();
    assert_eq!(fallback.local_category_id, "cat-default");

    let global = repo.find_for_group("g-coffee", None).unwrap().unwrap();
    assert_eq!(global.local_category_id, "cat-default");

    assert!(repo.find_for_group("g-unknown", Some("store-1")).unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_group_in_same_scope_is_rejected() {
    let (_dir, pool, writer) = common::setup_db();
    let repo = CategoryMappingRepository::new(pool, writer);

    repo.create(mapping("g-coffee", "cat-a", None)).await.unwrap();
    let err = repo
        .create(mapping("g-coffee", "cat-b", None))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Database(DatabaseError::UniqueViolation(_))
    ));

    // The same group may be mapped again in a different store scope.
    repo.create(mapping("g-coffee", "cat-c", Some("store-1")))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_list_scopes_to_store_plus_global() {
    let (_dir, pool, writer) = common::setup_db();
    let repo = CategoryMappingRepository::new(pool, writer);

    repo.create(mapping("g-a", "cat-1", None)).await.unwrap();
    repo.create(mapping("g-b", "cat-2", Some("store-1"))).await.unwrap();
    repo.create(mapping("g-c", "cat-3", Some("store-2"))).await.unwrap();

    let all = repo.list(None).unwrap();
    assert_eq!(all.len(), 3);

    let store1 = repo.list(Some("store-1")).unwrap();
    let groups: Vec<&str> = store1.iter().map(|m| m.external_group_id.as_str()).collect();
    assert_eq!(groups, vec!["g-a", "g-b"]);
}

#[tokio::test]
async fn test_update_and_delete() {
    let (_dir, pool, writer) = common::setup_db();
    let repo = CategoryMappingRepository::new(pool, writer);

    let created = repo
        .create(mapping("g-coffee", "cat-a", Some("store-1")))
        .await
        .unwrap();

    let updated = repo
        .update(
            &created.id,
            CategoryMappingUpdate {
                local_category_id: Some("cat-z".to_string()),
                store_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.local_category_id, "cat-z");
    assert!(updated.store_id.is_none());

    assert_eq!(repo.delete(&created.id).await.unwrap(), 1);
    assert!(repo.get_by_id(&created.id).is_err());
}
