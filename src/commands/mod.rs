//! CLI command definitions and dispatch.

pub mod allocate;
pub mod cancel;
pub mod migrate;
pub mod sales;
pub mod simulate;
pub mod status;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use seatbook_cache::ReservationCache;
use seatbook_core::config::{AppConfig, DatabaseProvider};
use seatbook_core::error::AppError;
use seatbook_database::connection::connect_pool;
use seatbook_database::migration::run_migrations;
use seatbook_database::store::{MemoryReservationStore, PgReservationStore, ReservationStore};
use seatbook_service::ReservationEngine;

use crate::output::OutputFormat;

/// Seatbook: seat inventory and reservation engine
#[derive(Debug, Parser)]
#[command(name = "seatbook", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Configuration overlay (`config/{env}.toml`); falls back to `SEATBOOK_ENV`
    #[arg(short, long)]
    pub env: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply database migrations
    Migrate,
    /// Show backend health and free seats
    Status(status::StatusArgs),
    /// Reserve one seat
    Allocate(allocate::AllocateArgs),
    /// Cancel a reservation by seat rank and number
    Cancel(cancel::CancelArgs),
    /// Print the sales extract
    Sales(sales::SalesArgs),
    /// Fire concurrent allocations and report the tally
    Simulate(simulate::SimulateArgs),
}

impl Cli {
    /// Load configuration from the file, the overlay, and the environment
    pub fn load_config(&self) -> Result<AppConfig, AppError> {
        let env = self
            .env
            .clone()
            .or_else(|| std::env::var("SEATBOOK_ENV").ok());
        AppConfig::load(&self.config, env.as_deref())
    }

    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate => migrate::execute(&config).await,
            Commands::Status(args) => status::execute(args, &config, self.format).await,
            Commands::Allocate(args) => allocate::execute(args, &config, self.format).await,
            Commands::Cancel(args) => cancel::execute(args, &config, self.format).await,
            Commands::Sales(args) => sales::execute(args, &config, self.format).await,
            Commands::Simulate(args) => simulate::execute(args, &config, self.format).await,
        }
    }
}

/// Helper: open the configured durable store
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn ReservationStore>, AppError> {
    match config.database.provider {
        DatabaseProvider::Postgres => {
            let pool = connect_pool(&config.database).await?;
            run_migrations(&pool).await?;
            Ok(Arc::new(PgReservationStore::new(pool)))
        }
        DatabaseProvider::Memory => {
            info!("Using in-memory store; reservations last for this process only");
            Ok(Arc::new(MemoryReservationStore::seeded(
                config.database.seed_events,
            )))
        }
    }
}

/// Helper: open the store and cache, then warm-start the engine
pub async fn build_engine(config: &AppConfig) -> Result<ReservationEngine, AppError> {
    let store = open_store(config).await?;
    let cache = ReservationCache::new(&config.cache).await?;
    ReservationEngine::bootstrap(&config.allocation, store, cache).await
}
