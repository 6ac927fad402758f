//! Integration tests for transactional reordering.

use assert_matches::assert_matches;
use cadre_core::error::CoreError;
use cadre_core::reorder::ReorderItem;
use cadre_db::error::DbError;
use cadre_db::models::module::CreateModule;
use cadre_db::models::topic::CreateTopic;
use cadre_db::repositories::{ModuleRepo, TopicRepo};
use sqlx::PgPool;

const ADMIN: i64 = 1;

async fn seed_modules(pool: &PgPool, names: &[&str]) -> Vec<i64> {
    let mut ids = Vec::new();
    for (i, name) in names.iter().enumerate() {
        let input = CreateModule {
            name: name.to_string(),
            description: None,
            display_order: Some(i as i32),
            is_active: None,
        };
        ids.push(ModuleRepo::create(pool, &input, ADMIN).await.unwrap().id);
    }
    ids
}

async fn display_orders(pool: &PgPool) -> Vec<(i64, i32)> {
    sqlx::query_as("SELECT id, display_order FROM modules ORDER BY id")
        .fetch_all(pool)
        .await
        .unwrap()
}

fn item(id: i64, display_order: i32) -> ReorderItem {
    ReorderItem { id, display_order }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_reorder_applies_batch_and_returns_new_order(pool: PgPool) {
    let ids = seed_modules(&pool, &["A", "B", "C"]).await;
    let batch = vec![item(ids[0], 2), item(ids[1], 0), item(ids[2], 1)];

    let rows = ModuleRepo::reorder(&pool, &batch, 9).await.unwrap();

    let names: Vec<&str> = rows.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["B", "C", "A"]);
    assert!(rows.iter().all(|m| m.updated_by == Some(9)));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_empty_batch_changes_nothing(pool: PgPool) {
    seed_modules(&pool, &["A", "B"]).await;
    let before = display_orders(&pool).await;

    let rows = ModuleRepo::reorder(&pool, &[], ADMIN).await.unwrap();

    assert!(rows.is_empty());
    assert_eq!(display_orders(&pool).await, before);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_missing_id_rolls_back_whole_batch(pool: PgPool) {
    let ids = seed_modules(&pool, &["A", "B"]).await;
    let before = display_orders(&pool).await;
    let batch = vec![item(ids[0], 10), item(ids[1], 11), item(987_654, 12)];

    let result = ModuleRepo::reorder(&pool, &batch, ADMIN).await;

    assert_matches!(
        result,
        Err(DbError::Core(CoreError::NotFound {
            entity: "Module",
            id: 987_654,
        }))
    );
    assert_eq!(display_orders(&pool).await, before);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_ids_rejected_before_writing(pool: PgPool) {
    let ids = seed_modules(&pool, &["A"]).await;
    let before = display_orders(&pool).await;
    let batch = vec![item(ids[0], 3), item(ids[0], 4)];

    let result = ModuleRepo::reorder(&pool, &batch, ADMIN).await;

    assert_matches!(result, Err(DbError::Core(CoreError::Validation(_))));
    assert_eq!(display_orders(&pool).await, before);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_topic_reorder_is_scoped_to_module(pool: PgPool) {
    let modules = seed_modules(&pool, &["Mine", "Theirs"]).await;
    let mut topic_ids = Vec::new();
    for module_id in &modules {
        let input = CreateTopic {
            module_id: *module_id,
            name: "Topic".to_string(),
            description: None,
            display_order: None,
            is_active: None,
        };
        topic_ids.push(TopicRepo::create(&pool, &input, ADMIN).await.unwrap().id);
    }

    // The second topic belongs to another module and aborts the batch.
    let batch = vec![item(topic_ids[0], 4), item(topic_ids[1], 5)];
    let result = TopicRepo::reorder(&pool, modules[0], &batch, ADMIN).await;
    assert_matches!(result, Err(DbError::Core(CoreError::NotFound { .. })));

    let untouched = TopicRepo::find_by_id(&pool, topic_ids[0])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(untouched.display_order, 0);
}
