//! Single seat allocation.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use seatbook_core::config::AppConfig;
use seatbook_core::error::AppError;
use seatbook_core::types::{EventId, UserId};
use seatbook_entity::seat::SeatRank;

use crate::output::{self, OutputFormat};

/// Arguments for the allocate command
#[derive(Debug, Args)]
pub struct AllocateArgs {
    /// Event ID
    #[arg(long)]
    pub event: i64,
    /// Seat rank (S, A, B, C)
    #[arg(long)]
    pub rank: SeatRank,
    /// User ID
    #[arg(long)]
    pub user: i64,
}

/// Allocation display row
#[derive(Debug, Serialize, Tabled)]
struct AllocationRow {
    /// Reservation ID
    reservation_id: i64,
    /// Event ID
    event_id: i64,
    /// Seat
    seat: String,
    /// Reserved at
    reserved_at: String,
}

/// Execute the allocate command
pub async fn execute(
    args: &AllocateArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let engine = super::build_engine(config).await?;

    let allocation = engine
        .allocator()
        .allocate(EventId(args.event), args.rank, UserId(args.user))
        .await?;

    if !output::print_json(&allocation, format)? {
        output::print_success(&format!(
            "Reserved seat {}-{} for user {}",
            allocation.seat.rank, allocation.seat.num, args.user
        ));
        output::print_rows(
            &[AllocationRow {
                reservation_id: allocation.reservation_id.get(),
                event_id: allocation.event_id.get(),
                seat: format!("{}-{}", allocation.seat.rank, allocation.seat.num),
                reserved_at: allocation.reserved_at.to_rfc3339(),
            }],
            format,
            "",
        )?;
    }
    Ok(())
}
