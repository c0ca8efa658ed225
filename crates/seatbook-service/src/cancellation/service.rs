//! Retiring a user's reservation and returning its seat.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use seatbook_cache::{CanceledLedger, ReservationCache, ReservationIndex, SeatInventory};
use seatbook_core::error::AppError;
use seatbook_core::result::AppResult;
use seatbook_core::types::{EventId, SeatId, UserId};
use seatbook_database::store::ReservationStore;
use seatbook_entity::reservation::Reservation;
use seatbook_entity::seat::{SeatCatalogue, SeatRank};

use crate::allocation::reservation_timestamp;
use crate::directory::EventDirectory;

/// Cancels active reservations on behalf of their holders.
///
/// Steps run in this order: persist, evict, release, record. Evicting
/// before releasing keeps the cache from ever listing a seat that the pool
/// already hands out again. The eviction is the claim: only the caller
/// whose eviction removed the entry releases the seat, so repeated or
/// concurrent cancels collapse into one success and the rest see
/// `not_reserved`.
///
/// If the store cancel succeeds but the eviction fails, the reservation
/// stays cached while the store row is canceled. A retry finishes the job:
/// the store answers "already canceled", the entry is still cached, and
/// the retry evicts, releases and records it.
#[derive(Debug, Clone)]
pub struct CancellationService {
    store: Arc<dyn ReservationStore>,
    cache: ReservationCache,
    /// Free-seat pools, absent under the optimistic strategy.
    inventory: Option<Arc<SeatInventory>>,
    ledger: Arc<CanceledLedger>,
    catalogue: Arc<SeatCatalogue>,
    events: Arc<EventDirectory>,
}

impl CancellationService {
    /// Creates a new cancellation service.
    pub fn new(
        store: Arc<dyn ReservationStore>,
        cache: ReservationCache,
        inventory: Option<Arc<SeatInventory>>,
        ledger: Arc<CanceledLedger>,
        catalogue: Arc<SeatCatalogue>,
        events: Arc<EventDirectory>,
    ) -> Self {
        Self {
            store,
            cache,
            inventory,
            ledger,
            catalogue,
            events,
        }
    }

    /// Cancel `user_id`'s active reservation of `seat_id` for `event_id`.
    ///
    /// The event must exist and be public (`invalid_event`). Returns the
    /// canceled reservation.
    pub async fn cancel(
        &self,
        event_id: EventId,
        seat_id: SeatId,
        user_id: UserId,
    ) -> AppResult<Reservation> {
        self.events.require_public(event_id)?;

        let seat = *self
            .catalogue
            .get(seat_id)
            .ok_or_else(|| invalid_seat(format!("Seat {seat_id} does not exist")))?;

        let reservation = self
            .cache
            .find_active_for_seat(event_id, seat_id)
            .await?
            .ok_or_else(|| not_reserved(event_id, seat_id))?;

        if reservation.user_id != user_id {
            return Err(AppError::authorization(format!(
                "Seat {seat_id} for event {event_id} is reserved by another user"
            ))
            .with_code("not_permitted"));
        }

        let canceled_at = reservation_timestamp();
        let persisted = self
            .store
            .cancel_reservation(reservation.id, canceled_at)
            .await?;

        let evicted = match self.cache.delete(event_id, reservation.id).await {
            Ok(evicted) => evicted,
            Err(e) => {
                error!(
                    reservation_id = %reservation.id,
                    event_id = %event_id,
                    seat_id = %seat_id,
                    store_canceled = persisted,
                    error = %e,
                    "Failed to evict canceled reservation; seat stays held until a retry"
                );
                return Err(e);
            }
        };
        if !evicted {
            debug!(
                reservation_id = %reservation.id,
                "Concurrent cancellation evicted the reservation first"
            );
            return Err(not_reserved(event_id, seat_id));
        }
        if !persisted {
            warn!(
                reservation_id = %reservation.id,
                event_id = %event_id,
                seat_id = %seat_id,
                "Completing a cancellation the store had already recorded"
            );
        }

        if let Some(inventory) = &self.inventory {
            if let Err(e) = inventory.release(event_id, seat.rank, seat).await {
                error!(
                    reservation_id = %reservation.id,
                    seat_id = %seat_id,
                    error = %e,
                    "Canceled reservation but could not return seat to pool"
                );
            }
        }

        let canceled = reservation.canceled(canceled_at);
        self.ledger.append(canceled.clone()).await;

        info!(
            reservation_id = %canceled.id,
            event_id = %event_id,
            seat_id = %seat_id,
            user_id = %user_id,
            "Reservation canceled"
        );
        Ok(canceled)
    }

    /// Cancel by the seat's rank and number instead of its ID.
    pub async fn cancel_by_number(
        &self,
        event_id: EventId,
        rank: SeatRank,
        num: i32,
        user_id: UserId,
    ) -> AppResult<Reservation> {
        let seat_id = self
            .catalogue
            .find(rank, num)
            .map(|s| s.id)
            .ok_or_else(|| invalid_seat(format!("Seat {rank}-{num} does not exist")))?;
        self.cancel(event_id, seat_id, user_id).await
    }
}

fn invalid_seat(message: String) -> AppError {
    AppError::not_found(message).with_code("invalid_seat")
}

fn not_reserved(event_id: EventId, seat_id: SeatId) -> AppError {
    AppError::not_found(format!(
        "Seat {seat_id} has no active reservation for event {event_id}"
    ))
    .with_code("not_reserved")
}
