//! Test helpers and utilities for integration testing.
//!
//! Provides an in-memory database with the real migrations applied, plus a
//! way to make the store reject writes.

#![allow(dead_code)]

use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;

use progresslog::migrations::Migrator;

/// Create an in-memory SQLite database for testing
pub async fn create_test_db() -> DatabaseConnection {
    // Use simple in-memory SQLite - each connection gets its own database
    let db_url = "sqlite::memory:";

    let db = Database::connect(db_url)
        .await
        .expect("Failed to create test database");

    // Run migrations using the Migrator
    Migrator::up(&db, None)
        .await
        .expect("Failed to run test migrations");

    db
}

/// Make every INSERT into progress_log_entries fail
pub async fn reject_inserts(db: &DatabaseConnection) {
    exec(
        db,
        "CREATE TRIGGER reject_progress_insert BEFORE INSERT ON progress_log_entries \
         BEGIN SELECT RAISE(ABORT, 'store offline'); END",
    )
    .await;
}

/// Make every UPDATE of progress_log_entries fail
pub async fn reject_updates(db: &DatabaseConnection) {
    exec(
        db,
        "CREATE TRIGGER reject_progress_update BEFORE UPDATE ON progress_log_entries \
         BEGIN SELECT RAISE(ABORT, 'store offline'); END",
    )
    .await;
}

async fn exec(db: &DatabaseConnection, sql: &str) {
    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        sql.to_string(),
    ))
    .await
    .expect("Failed to execute test SQL");
}
