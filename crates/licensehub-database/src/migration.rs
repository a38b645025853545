//! Schema migrations embedded from `migrations/`.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use licensehub_core::error::{AppError, ErrorKind};

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// One embedded migration and whether the database has applied it.
#[derive(Debug, Clone)]
pub struct MigrationEntry {
    /// Migration version (timestamp prefix of the file).
    pub version: i64,
    /// Description taken from the file name.
    pub description: String,
    /// Whether it has been applied successfully.
    pub applied: bool,
}

/// Apply every pending migration.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    info!("Running database migrations");

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Failed to run migrations: {e}"),
            e,
        )
    })?;

    info!("Database migrations complete");
    Ok(())
}

/// List embedded migrations with their applied state.
pub async fn migration_status(pool: &PgPool) -> Result<Vec<MigrationEntry>, AppError> {
    let history = sqlx::query_scalar::<_, i64>(
        "SELECT version FROM _sqlx_migrations WHERE success ORDER BY version",
    )
    .fetch_all(pool)
    .await;

    let applied = match history {
        Ok(versions) => versions,
        // undefined_table: nothing has run yet
        Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some("42P01") => Vec::new(),
        Err(e) => {
            return Err(AppError::with_source(
                ErrorKind::Database,
                "Failed to read migration history",
                e,
            ));
        }
    };

    Ok(MIGRATOR
        .iter()
        .map(|m| MigrationEntry {
            version: m.version,
            description: m.description.to_string(),
            applied: applied.contains(&m.version),
        })
        .collect())
}
