//! Database migration command.

use seatbook_core::config::{AppConfig, DatabaseProvider};
use seatbook_core::error::AppError;
use seatbook_database::connection::connect_pool;
use seatbook_database::migration::run_migrations;

use crate::output;

/// Apply all pending migrations to the configured PostgreSQL database
pub async fn execute(config: &AppConfig) -> Result<(), AppError> {
    if config.database.provider != DatabaseProvider::Postgres {
        output::print_warning("The in-memory store has no schema; nothing to migrate.");
        return Ok(());
    }

    let pool = connect_pool(&config.database).await?;
    println!("Running database migrations...");
    let report = run_migrations(&pool).await?;
    pool.close().await;

    if report.up_to_date() {
        output::print_success(&format!(
            "Schema already current ({} migrations).",
            report.known
        ));
    } else {
        output::print_success(&format!(
            "Applied {} of {} migrations.",
            report.applied, report.known
        ));
    }
    Ok(())
}
