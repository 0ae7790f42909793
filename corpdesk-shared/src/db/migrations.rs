/// Database migration runner
///
/// Migrations live in `migrations/` at the workspace root and are embedded at
/// compile time with `sqlx::migrate!`. Each one is a reversible pair:
/// - `{timestamp}_{name}.up.sql`
/// - `{timestamp}_{name}.down.sql`
///
/// # Example
///
/// ```no_run
/// use corpdesk_shared::db::pool::{create_pool, DatabaseConfig};
/// use corpdesk_shared::db::migrations::{run_migrations, get_migration_status};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = create_pool(DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     })
///     .await?;
///
///     run_migrations(&pool).await?;
///
///     let status = get_migration_status(&pool).await?;
///     println!("Applied {} migrations", status.applied_migrations);
///     Ok(())
/// }
/// ```

use sqlx::migrate::Migrator;
use sqlx::postgres::PgPool;
use tracing::{debug, info, warn};

/// Embedded schema migrations
pub static MIGRATOR: Migrator = sqlx::migrate!("../migrations");

/// Migration status information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Number of migrations that have been applied
    pub applied_migrations: usize,

    /// Latest applied migration version (timestamp)
    pub latest_version: Option<i64>,

    /// Whether every embedded migration has been applied
    pub is_up_to_date: bool,
}

/// Number of forward migrations embedded in the binary
pub fn embedded_migration_count() -> usize {
    MIGRATOR
        .iter()
        .filter(|m| !m.migration_type.is_down_migration())
        .count()
}

/// Runs all pending database migrations
///
/// Already-applied migrations are skipped, so this is safe to call at every
/// startup.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!(
        embedded = embedded_migration_count(),
        "Starting database migrations"
    );

    match MIGRATOR.run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}

/// Reports which migrations have been applied
pub async fn get_migration_status(pool: &PgPool) -> Result<MigrationStatus, sqlx::Error> {
    debug!("Checking migration status");

    let table_exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (
            SELECT FROM information_schema.tables
            WHERE table_schema = current_schema()
            AND table_name = '_sqlx_migrations'
        )",
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        debug!("Migrations table does not exist yet");
        return Ok(MigrationStatus {
            applied_migrations: 0,
            latest_version: None,
            is_up_to_date: embedded_migration_count() == 0,
        });
    }

    let (count, latest_version): (i64, Option<i64>) = sqlx::query_as(
        "SELECT COUNT(*), MAX(version) FROM _sqlx_migrations WHERE success = true",
    )
    .fetch_one(pool)
    .await?;

    debug!(
        applied_migrations = count,
        latest_version = ?latest_version,
        "Migration status retrieved"
    );

    let applied = count as usize;
    Ok(MigrationStatus {
        applied_migrations: applied,
        latest_version,
        is_up_to_date: applied >= embedded_migration_count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_migrations_present() {
        // users, companies, adds
        assert_eq!(embedded_migration_count(), 3);
    }

    #[test]
    fn test_embedded_migrations_are_ordered() {
        let versions: Vec<i64> = MIGRATOR
            .iter()
            .filter(|m| !m.migration_type.is_down_migration())
            .map(|m| m.version)
            .collect();

        let mut sorted = versions.clone();
        sorted.sort_unstable();
        assert_eq!(versions, sorted);
    }
}
