//! CRUD tests for the `PostgreSQL` task store.

use super::helpers::{
    CleanupGuard, database_config, ensure_template, setup_store, test_runtime, unique_db_name,
};
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use std::sync::Arc;
use taskstore::task::{
    adapters::postgres::PostgresTaskRepository, domain::TaskId, services::TaskStore,
};

/// r2d2's default `max_size`.
const DEFAULT_POOL_SIZE: u32 = 10;

#[rstest]
fn create_and_list_task(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = unique_db_name("task_create");
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let store = setup_store(shared_test_cluster, &db_name).expect("store setup");

    let rt = test_runtime();
    let (affected, tasks) = rt.block_on(async {
        store.ensure_schema().await.expect("schema");
        let affected = store.create_task("Jump", false).await.expect("create");
        let tasks = store.get_tasks().await.expect("list");
        (affected, tasks)
    });

    assert_eq!(affected, 1);
    assert_eq!(tasks.len(), 1);
    let jump = tasks.first().expect("one task");
    assert_eq!(jump.name().as_str(), "Jump");
    assert!(!jump.completed());
    assert!(jump.id().value() >= 1);
}

#[rstest]
fn tasks_are_listed_in_identifier_order(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = unique_db_name("task_order");
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let store = setup_store(shared_test_cluster, &db_name).expect("store setup");

    let rt = test_runtime();
    let tasks = rt.block_on(async {
        store.ensure_schema().await.expect("schema");
        for name in ["Walk", "Run", "Jump"] {
            store.create_task(name, false).await.expect("create");
        }
        // Rewriting the first row would move it to the end of an unordered heap scan.
        let first = store.get_tasks().await.expect("list").first().expect("task").id();
        store.update_task(first, true).await.expect("update");
        store.get_tasks().await.expect("list")
    });

    let names: Vec<&str> = tasks.iter().map(|task| task.name().as_str()).collect();
    assert_eq!(names, vec!["Walk", "Run", "Jump"]);
    assert!(
        tasks
            .windows(2)
            .all(|pair| matches!(pair, [a, b] if a.id() < b.id()))
    );
}

#[rstest]
fn update_task_sets_completed_and_is_idempotent(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = unique_db_name("task_update");
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let store = setup_store(shared_test_cluster, &db_name).expect("store setup");

    let rt = test_runtime();
    let tasks = rt.block_on(async {
        store.ensure_schema().await.expect("schema");
        store.create_task("Jump", false).await.expect("create");
        let id = store.get_tasks().await.expect("list").first().expect("task").id();
        store.update_task(id, true).await.expect("first update");
        store.update_task(id, true).await.expect("second update");
        store.get_tasks().await.expect("list")
    });

    assert_eq!(tasks.len(), 1);
    assert!(tasks.first().expect("task").completed());
}

#[rstest]
fn missing_identifiers_are_ignored(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = unique_db_name("task_missing");
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let store = setup_store(shared_test_cluster, &db_name).expect("store setup");

    let rt = test_runtime();
    let (before, after) = rt.block_on(async {
        store.ensure_schema().await.expect("schema");
        store.create_task("Jump", false).await.expect("create");
        let before = store.get_tasks().await.expect("list");
        store
            .update_task(TaskId::new(999), true)
            .await
            .expect("update of missing task");
        store
            .delete_task(TaskId::new(999))
            .await
            .expect("delete of missing task");
        (before, store.get_tasks().await.expect("list"))
    });

    assert_eq!(before, after);
}

#[rstest]
fn full_lifecycle_through_connected_store(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = unique_db_name("task_lifecycle");
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    shared_test_cluster
        .create_database_from_template(db_name.as_str(), super::helpers::TEMPLATE_DB)
        .expect("database from template");
    let config = database_config(shared_test_cluster, &db_name).expect("config");

    let rt = test_runtime();
    rt.block_on(async {
        let repository = PostgresTaskRepository::connect(&config)
            .await
            .expect("connect");
        let store = TaskStore::new(Arc::new(repository));
        assert_eq!(store.repository().pool().max_size(), DEFAULT_POOL_SIZE);
        store.repository().ping().await.expect("ping");
        store.ensure_schema().await.expect("schema");

        store.create_task("Jump", false).await.expect("create");
        let tasks = store.get_tasks().await.expect("list after create");
        assert_eq!(tasks.len(), 1);
        let jump = tasks.first().expect("task").clone();
        assert_eq!(jump.name().as_str(), "Jump");
        assert!(!jump.completed());

        store.update_task(jump.id(), true).await.expect("update");
        let updated = store.get_tasks().await.expect("list after update");
        assert_eq!(updated.len(), 1);
        assert!(updated.first().expect("task").completed());

        store.delete_task(jump.id()).await.expect("delete");
        assert!(store.get_tasks().await.expect("list after delete").is_empty());
    });
}

#[rstest]
#[case("")]
#[case("   ")]
fn blank_names_round_trip(shared_test_cluster: &'static TestCluster, #[case] name: &str) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = unique_db_name("task_blank");
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let store = setup_store(shared_test_cluster, &db_name).expect("store setup");

    let (affected, tasks) = test_runtime().block_on(async {
        store.ensure_schema().await.expect("schema");
        let affected = store.create_task(name, false).await.expect("create");
        (affected, store.get_tasks().await.expect("list"))
    });

    assert_eq!(affected, 1);
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks.first().expect("task").name().as_str(), name);
}
