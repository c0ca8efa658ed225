//! Sales extract.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use seatbook_core::config::AppConfig;
use seatbook_core::error::AppError;
use seatbook_core::types::EventId;
use seatbook_service::SalesRecord;

use crate::output::{self, OutputFormat};

/// Arguments for the sales command
#[derive(Debug, Args)]
pub struct SalesArgs {
    /// Restrict to these events (repeatable); all events when omitted
    #[arg(long = "event")]
    pub events: Vec<i64>,
}

/// Sales display row
#[derive(Debug, Serialize, Tabled)]
struct SalesRow {
    /// Reservation ID
    reservation_id: i64,
    /// Event ID
    event_id: i64,
    /// Rank
    rank: String,
    /// Seat number
    num: i32,
    /// Price
    price: i64,
    /// User ID
    user_id: i64,
    /// Sold at
    sold_at: String,
    /// Canceled at
    canceled_at: String,
}

impl From<&SalesRecord> for SalesRow {
    fn from(r: &SalesRecord) -> Self {
        Self {
            reservation_id: r.reservation_id.get(),
            event_id: r.event_id.get(),
            rank: r.rank.to_string(),
            num: r.num,
            price: r.price,
            user_id: r.user_id.get(),
            sold_at: r.sold_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            canceled_at: r
                .canceled_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
        }
    }
}

/// Execute the sales command
pub async fn execute(
    args: &SalesArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let engine = super::build_engine(config).await?;

    let event_ids: Vec<EventId> = args.events.iter().copied().map(EventId).collect();
    let filter = (!event_ids.is_empty()).then_some(event_ids.as_slice());
    let records = engine.sales().sales(filter).await?;

    let rows: Vec<SalesRow> = records.iter().map(SalesRow::from).collect();
    output::print_rows(&rows, format, "No reservations.")
}
