//! Tests for the progress_log_entries migration

mod common;
use common::create_test_db;

use progresslog::migrations::Migrator;
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};
use sea_orm_migration::MigratorTrait;

async fn table_exists(db: &sea_orm::DatabaseConnection) -> bool {
    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        "SELECT COUNT(*) FROM progress_log_entries".to_string(),
    ))
    .await
    .is_ok()
}

#[tokio::test]
async fn test_migration_creates_table() {
    let db = create_test_db().await;
    assert!(table_exists(&db).await);
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let db = create_test_db().await;

    Migrator::up(&db, None).await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    assert!(table_exists(&db).await);
}

#[tokio::test]
async fn test_migration_down_drops_table() {
    let db = create_test_db().await;

    Migrator::down(&db, None).await.unwrap();

    assert!(!table_exists(&db).await);
}

#[tokio::test]
async fn test_result_message_defaults_to_started() {
    let db = create_test_db().await;

    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        "INSERT INTO progress_log_entries (task, action, started, ended) \
         VALUES ('Import', 'Run', '2024-01-01 00:00:00+00:00', '2024-01-01 00:00:00+00:00')"
            .to_string(),
    ))
    .await
    .unwrap();

    let row = db
        .query_one(Statement::from_string(
            DatabaseBackend::Sqlite,
            "SELECT result_message FROM progress_log_entries".to_string(),
        ))
        .await
        .unwrap()
        .unwrap();
    let message: String = row.try_get("", "result_message").unwrap();
    assert_eq!(message, "Started");
}
