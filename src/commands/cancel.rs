//! Reservation cancellation.

use clap::Args;

use seatbook_core::config::AppConfig;
use seatbook_core::error::AppError;
use seatbook_core::types::{EventId, UserId};
use seatbook_entity::seat::SeatRank;

use crate::output::{self, OutputFormat};

/// Arguments for the cancel command
#[derive(Debug, Args)]
pub struct CancelArgs {
    /// Event ID
    #[arg(long)]
    pub event: i64,
    /// Seat rank (S, A, B, C)
    #[arg(long)]
    pub rank: SeatRank,
    /// Seat number within the rank
    #[arg(long)]
    pub num: i32,
    /// User ID of the reservation holder
    #[arg(long)]
    pub user: i64,
}

/// Execute the cancel command
pub async fn execute(
    args: &CancelArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let engine = super::build_engine(config).await?;

    let canceled = engine
        .cancellation()
        .cancel_by_number(EventId(args.event), args.rank, args.num, UserId(args.user))
        .await?;

    if !output::print_json(&canceled, format)? {
        output::print_success(&format!(
            "Canceled reservation {} ({}-{}, event {})",
            canceled.id, args.rank, args.num, args.event
        ));
    }
    Ok(())
}
