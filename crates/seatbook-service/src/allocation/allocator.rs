//! The allocation entry point used by request handlers.

use std::sync::Arc;

use tracing::debug;

use seatbook_core::config::AllocationStrategy;
use seatbook_core::error::{AppError, ErrorKind};
use seatbook_core::result::AppResult;
use seatbook_core::types::{EventId, UserId};
use seatbook_entity::seat::SeatRank;

use super::{Allocation, AllocationService, OptimisticAllocationService};
use crate::directory::EventDirectory;

#[derive(Debug, Clone)]
enum Strategy {
    Pool(AllocationService),
    Optimistic {
        service: OptimisticAllocationService,
        conflict_retries: u32,
    },
}

/// Validates the event and dispatches to the configured strategy.
#[derive(Debug, Clone)]
pub struct Allocator {
    events: Arc<EventDirectory>,
    strategy: Strategy,
}

impl Allocator {
    /// Allocator backed by seat pools.
    pub fn pool(events: Arc<EventDirectory>, service: AllocationService) -> Self {
        Self {
            events,
            strategy: Strategy::Pool(service),
        }
    }

    /// Allocator backed by versioned cache writes, restarting a lost race
    /// up to `conflict_retries` times.
    pub fn optimistic(
        events: Arc<EventDirectory>,
        service: OptimisticAllocationService,
        conflict_retries: u32,
    ) -> Self {
        Self {
            events,
            strategy: Strategy::Optimistic {
                service,
                conflict_retries,
            },
        }
    }

    /// The strategy in use.
    pub fn strategy(&self) -> AllocationStrategy {
        match self.strategy {
            Strategy::Pool(_) => AllocationStrategy::Pool,
            Strategy::Optimistic { .. } => AllocationStrategy::Optimistic,
        }
    }

    /// Grant one seat of `rank` for `event_id` to `user_id`.
    ///
    /// Fails with `invalid_event` unless the event is public and open,
    /// `SoldOut` when the rank is exhausted, `Conflict` when the optimistic
    /// retry budget runs out, and `ServiceUnavailable` on a store outage.
    pub async fn allocate(
        &self,
        event_id: EventId,
        rank: SeatRank,
        user_id: UserId,
    ) -> AppResult<Allocation> {
        self.events.require_on_sale(event_id)?;

        match &self.strategy {
            Strategy::Pool(service) => service.allocate(event_id, rank, user_id).await,
            Strategy::Optimistic {
                service,
                conflict_retries,
            } => {
                for attempt in 0..=*conflict_retries {
                    match service.allocate(event_id, rank, user_id).await {
                        Err(e) if e.kind == ErrorKind::Conflict => {
                            debug!(
                                event_id = %event_id,
                                rank = %rank,
                                attempt,
                                "Retrying allocation after conflict"
                            );
                        }
                        other => return other,
                    }
                }
                Err(AppError::conflict(format!(
                    "Gave up allocating rank {rank} for event {event_id} after {} attempts",
                    conflict_retries + 1
                )))
            }
        }
    }
}
