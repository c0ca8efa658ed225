//! Concurrent allocation load against one (event, rank).

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

use seatbook_core::config::AppConfig;
use seatbook_core::error::{AppError, ErrorKind};
use seatbook_core::types::{EventId, UserId};
use seatbook_entity::seat::SeatRank;

use crate::output::{self, OutputFormat};

/// Arguments for the simulate command
#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// Event ID
    #[arg(long)]
    pub event: i64,
    /// Seat rank (S, A, B, C)
    #[arg(long)]
    pub rank: SeatRank,
    /// Number of allocation requests, one user each
    #[arg(long, default_value_t = 100)]
    pub requests: u32,
    /// Maximum requests in flight
    #[arg(long, default_value_t = 16)]
    pub concurrency: usize,
}

/// Outcome counts
#[derive(Debug, Default, Serialize)]
struct Tally {
    requests: u32,
    granted: usize,
    sold_out: usize,
    conflict: usize,
    failed: usize,
    duplicate_seats: usize,
    elapsed_ms: u128,
}

/// Execute the simulate command
pub async fn execute(
    args: &SimulateArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    if args.concurrency == 0 {
        return Err(AppError::validation("--concurrency must be at least 1"));
    }

    let engine = super::build_engine(config).await?;
    let event_id = EventId(args.event);
    let limit = Arc::new(Semaphore::new(args.concurrency));
    let started = Instant::now();

    let mut tasks = JoinSet::new();
    for user in 1..=i64::from(args.requests) {
        let engine = engine.clone();
        let limit = Arc::clone(&limit);
        let rank = args.rank;
        tasks.spawn(async move {
            let _permit = limit
                .acquire_owned()
                .await
                .map_err(|e| AppError::internal(format!("Semaphore closed: {e}")))?;
            engine.allocator().allocate(event_id, rank, UserId(user)).await
        });
    }

    let mut tally = Tally {
        requests: args.requests,
        ..Tally::default()
    };
    let mut seats = HashSet::new();
    while let Some(joined) = tasks.join_next().await {
        let result =
            joined.map_err(|e| AppError::internal(format!("Allocation task failed: {e}")))?;
        match result {
            Ok(allocation) => {
                tally.granted += 1;
                if !seats.insert(allocation.seat.id) {
                    tally.duplicate_seats += 1;
                }
            }
            Err(e) if e.kind == ErrorKind::SoldOut => tally.sold_out += 1,
            Err(e) if e.kind == ErrorKind::Conflict => tally.conflict += 1,
            Err(e) => {
                warn!(error = %e, "Allocation failed");
                tally.failed += 1;
            }
        }
    }
    tally.elapsed_ms = started.elapsed().as_millis();

    if !output::print_json(&tally, format)? {
        println!("Simulation (event {}, rank {}):", args.event, args.rank);
        output::print_kv("Requests", tally.requests);
        output::print_kv("Granted", tally.granted);
        output::print_kv("Sold out", tally.sold_out);
        output::print_kv("Conflict", tally.conflict);
        output::print_kv("Failed", tally.failed);
        output::print_kv("Elapsed", format!("{} ms", tally.elapsed_ms));
        if tally.duplicate_seats == 0 {
            output::print_success("No seat was granted twice.");
        } else {
            output::print_error(&format!(
                "{} seats were granted more than once",
                tally.duplicate_seats
            ));
        }
    }
    Ok(())
}
