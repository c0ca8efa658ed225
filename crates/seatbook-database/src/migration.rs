//! Schema migrations for the reservation store.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use seatbook_core::error::{AppError, ErrorKind};
use seatbook_core::result::AppResult;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Outcome of a migration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationReport {
    /// Migrations bundled into this binary.
    pub known: usize,
    /// Migrations applied by this run.
    pub applied: usize,
}

impl MigrationReport {
    /// Whether the database was already current.
    pub fn up_to_date(&self) -> bool {
        self.applied == 0
    }
}

/// Apply pending migrations (events, seat catalogue, reservations).
pub async fn run_migrations(pool: &PgPool) -> AppResult<MigrationReport> {
    let known = MIGRATOR.iter().count();
    let before = applied_count(pool).await?;

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Failed to run migrations: {e}"),
            e,
        )
    })?;

    let after = applied_count(pool).await?;
    let report = MigrationReport {
        known,
        applied: after.saturating_sub(before),
    };
    info!(
        known = report.known,
        applied = report.applied,
        "Reservation schema is current"
    );
    Ok(report)
}

/// Successful migrations recorded in the bookkeeping table; 0 on a fresh database.
async fn applied_count(pool: &PgPool) -> AppResult<usize> {
    let tracked: bool = sqlx::query_scalar("SELECT to_regclass('_sqlx_migrations') IS NOT NULL")
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to inspect schema", e))?;
    if !tracked {
        return Ok(0);
    }

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success")
        .fetch_one(pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count applied migrations", e)
        })?;
    Ok(usize::try_from(count).unwrap_or(0))
}
