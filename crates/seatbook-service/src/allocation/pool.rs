//! Pool-based allocation.

use std::sync::Arc;

use tracing::{error, info, warn};

use seatbook_cache::{ReservationCache, ReservationIndex, SeatInventory};
use seatbook_core::error::AppError;
use seatbook_core::result::AppResult;
use seatbook_core::types::{EventId, UserId};
use seatbook_database::store::ReservationStore;
use seatbook_entity::reservation::{NewReservation, Reservation};
use seatbook_entity::seat::{Seat, SeatRank};

use super::{Allocation, ReservationIdGenerator, reservation_timestamp};

/// Grants seats by popping them from per (event, rank) pools.
///
/// Contention is serialized by the pool itself, so there is no retry loop:
/// an empty pool is an immediate `SoldOut`.
#[derive(Debug, Clone)]
pub struct AllocationService {
    /// Durable store.
    store: Arc<dyn ReservationStore>,
    /// Active-reservation cache.
    cache: ReservationCache,
    /// Free-seat pools.
    inventory: Arc<SeatInventory>,
    /// Reservation ID source.
    ids: Arc<ReservationIdGenerator>,
    /// Undo the cache and pool mutation when the store write fails.
    compensate: bool,
}

impl AllocationService {
    /// Creates a new pool allocation service.
    pub fn new(
        store: Arc<dyn ReservationStore>,
        cache: ReservationCache,
        inventory: Arc<SeatInventory>,
        ids: Arc<ReservationIdGenerator>,
        compensate: bool,
    ) -> Self {
        Self {
            store,
            cache,
            inventory,
            ids,
            compensate,
        }
    }

    /// Grant one seat of `rank` for `event_id` to `user_id`.
    ///
    /// The reservation is cached before it is persisted, so it is visible to
    /// readers as soon as this call has taken the seat.
    pub async fn allocate(
        &self,
        event_id: EventId,
        rank: SeatRank,
        user_id: UserId,
    ) -> AppResult<Allocation> {
        let seat = self
            .inventory
            .take(event_id, rank)
            .await
            .ok_or_else(|| AppError::sold_out(format!("Rank {rank} sold out for event {event_id}")))?;

        let reservation = Reservation {
            id: self.ids.next(),
            event_id,
            seat_id: seat.id,
            user_id,
            reserved_at: reservation_timestamp(),
            canceled_at: None,
        };

        if let Err(e) = self.cache.put(&reservation).await {
            error!(
                event_id = %event_id,
                seat_id = %seat.id,
                error = %e,
                "Reservation cache write failed, returning seat to pool"
            );
            self.release_seat(event_id, seat).await;
            return Err(e);
        }

        if let Err(e) = self
            .store
            .insert_reservation(&NewReservation::from(&reservation))
            .await
        {
            if self.compensate {
                self.compensate_failed_insert(&reservation, seat).await;
            } else {
                warn!(
                    reservation_id = %reservation.id,
                    event_id = %event_id,
                    seat_id = %seat.id,
                    "Reservation cached but not persisted; consistent again after next warm start"
                );
            }
            return Err(e);
        }

        info!(
            reservation_id = %reservation.id,
            event_id = %event_id,
            rank = %rank,
            seat_id = %seat.id,
            user_id = %user_id,
            "Seat allocated"
        );

        Ok(Allocation {
            reservation_id: reservation.id,
            event_id,
            seat,
            reserved_at: reservation.reserved_at,
        })
    }

    /// Undo a cached-but-unpersisted allocation.
    ///
    /// The cache entry goes first so the seat is never listed as both held
    /// and available.
    async fn compensate_failed_insert(&self, reservation: &Reservation, seat: Seat) {
        match self.cache.delete(reservation.event_id, reservation.id).await {
            Ok(_) => self.release_seat(reservation.event_id, seat).await,
            Err(e) => {
                error!(
                    reservation_id = %reservation.id,
                    error = %e,
                    "Compensation failed to evict cached reservation; seat stays out of the pool"
                );
                return;
            }
        }

        warn!(
            reservation_id = %reservation.id,
            event_id = %reservation.event_id,
            seat_id = %seat.id,
            "Store write failed, allocation compensated"
        );
    }

    async fn release_seat(&self, event_id: EventId, seat: Seat) {
        if let Err(e) = self.inventory.release(event_id, seat.rank, seat).await {
            error!(
                event_id = %event_id,
                seat_id = %seat.id,
                error = %e,
                "Failed to return seat to pool"
            );
        }
    }
}
