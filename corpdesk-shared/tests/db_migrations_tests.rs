//! Integration tests for database migrations
//!
//! Requires PostgreSQL via DATABASE_URL; skipped otherwise.

mod common;

use common::setup_pool;
use corpdesk_shared::db::migrations::{
    embedded_migration_count, get_migration_status, run_migrations,
};
use corpdesk_shared::db::pool::close_pool;

#[tokio::test]
async fn test_run_migrations() {
    let Some(pool) = setup_pool().await else { return };

    let status = get_migration_status(&pool).await.expect("Failed to get migration status");
    assert!(status.applied_migrations >= embedded_migration_count());
    assert!(status.latest_version.is_some(), "Latest version should be set");
    assert!(status.is_up_to_date, "Should be up to date after migrations");

    close_pool(pool).await;
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let Some(pool) = setup_pool().await else { return };

    let status_1 = get_migration_status(&pool).await.expect("Failed to get status");
    run_migrations(&pool).await.expect("Second migration run failed");
    let status_2 = get_migration_status(&pool).await.expect("Failed to get status");

    assert_eq!(
        status_1.applied_migrations, status_2.applied_migrations,
        "Migrations should be idempotent"
    );

    close_pool(pool).await;
}

#[tokio::test]
async fn test_migration_creates_all_tables() {
    let Some(pool) = setup_pool().await else { return };

    for table_name in ["users", "companies", "adds"] {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT FROM information_schema.tables
                WHERE table_schema = current_schema()
                AND table_name = $1
            )",
        )
        .bind(table_name)
        .fetch_one(&pool)
        .await
        .unwrap_or_else(|_| panic!("Failed to check for table {}", table_name));

        assert!(exists, "Table '{}' should exist after migrations", table_name);
    }

    close_pool(pool).await;
}

#[tokio::test]
async fn test_status_check_constraint_rejects_unknown_values() {
    let Some(pool) = setup_pool().await else { return };
    let user = common::create_user(&pool).await;

    let result =
        sqlx::query("INSERT INTO companies (user_id, name, status) VALUES ($1, 'Bad', 'archived')")
            .bind(user.id)
            .execute(&pool)
            .await;
    assert!(result.is_err(), "Unknown status should violate the check constraint");

    close_pool(pool).await;
}

#[tokio::test]
async fn test_company_requires_existing_owner() {
    let Some(pool) = setup_pool().await else { return };

    let result =
        sqlx::query("INSERT INTO companies (user_id, name, status) VALUES ($1, 'Orphan', 'active')")
            .bind(i64::MAX)
            .execute(&pool)
            .await;
    assert!(result.is_err(), "Foreign key should reject a missing owner");

    close_pool(pool).await;
}
