//! Backend health and seat availability.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use seatbook_core::config::AppConfig;
use seatbook_core::error::AppError;
use seatbook_core::types::EventId;

use crate::output::{self, OutputFormat};

/// Arguments for the status command
#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Show per-rank availability for one event instead of the event list
    #[arg(long)]
    pub event: Option<i64>,
}

/// Event display row
#[derive(Debug, Serialize, Tabled)]
struct EventRow {
    /// Event ID
    id: i64,
    /// Title
    title: String,
    /// Whether tickets can be bought
    on_sale: bool,
    /// Base price
    price: i64,
    /// Free seats
    remaining: usize,
}

/// Rank availability row
#[derive(Debug, Serialize, Tabled)]
struct RankRow {
    /// Rank
    rank: String,
    /// Free seats
    remaining: usize,
}

/// Execute the status command
pub async fn execute(
    args: &StatusArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let engine = super::build_engine(config).await?;

    if format == OutputFormat::Table {
        let health = engine.health().await;
        println!("Seatbook status:");
        output::print_kv("Store", if health.store { "reachable" } else { "unreachable" });
        output::print_kv("Cache", if health.cache { "reachable" } else { "unreachable" });
        output::print_kv("Strategy", format!("{:?}", engine.strategy()));
        output::print_kv("Seats", engine.catalogue().len());
        output::print_kv("Canceled", engine.canceled_count().await);
        println!();
    }

    match args.event {
        Some(event_id) => {
            let rows: Vec<RankRow> = engine
                .pool_status(EventId(event_id))
                .await?
                .into_iter()
                .map(|(rank, remaining)| RankRow {
                    rank: rank.to_string(),
                    remaining,
                })
                .collect();
            output::print_rows(&rows, format, "No seat ranks.")?;
        }
        None => {
            let mut rows = Vec::new();
            for event in engine.events() {
                let remaining = engine.pool_status(event.id).await?.values().sum::<usize>();
                rows.push(EventRow {
                    id: event.id.get(),
                    on_sale: event.is_on_sale(),
                    title: event.title,
                    price: event.price,
                    remaining,
                });
            }
            output::print_rows(&rows, format, "No events.")?;
        }
    }

    Ok(())
}
