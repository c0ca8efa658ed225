//! Optimistic allocation against the reservation cache's shard version.

use std::collections::HashSet;
use std::sync::Arc;

use rand::seq::SliceRandom;
use tracing::{debug, error, info, warn};

use seatbook_cache::{ReservationCache, ReservationIndex};
use seatbook_core::error::AppError;
use seatbook_core::result::AppResult;
use seatbook_core::types::{EventId, SeatId, UserId};
use seatbook_database::store::ReservationStore;
use seatbook_entity::reservation::{NewReservation, Reservation};
use seatbook_entity::seat::{Seat, SeatCatalogue, SeatRank};

use super::{Allocation, ReservationIdGenerator, reservation_timestamp};

/// Grants seats without pools: any seat of the rank that no cached
/// reservation holds is a candidate, and the cache write only lands if the
/// event's shard has not moved since it was read.
///
/// A single call makes a single attempt. Losing the race yields
/// `Conflict` with nothing mutated; the caller restarts from scratch.
#[derive(Debug, Clone)]
pub struct OptimisticAllocationService {
    store: Arc<dyn ReservationStore>,
    cache: ReservationCache,
    catalogue: Arc<SeatCatalogue>,
    ids: Arc<ReservationIdGenerator>,
    compensate: bool,
}

impl OptimisticAllocationService {
    /// Creates a new optimistic allocation service.
    pub fn new(
        store: Arc<dyn ReservationStore>,
        cache: ReservationCache,
        catalogue: Arc<SeatCatalogue>,
        ids: Arc<ReservationIdGenerator>,
        compensate: bool,
    ) -> Self {
        Self {
            store,
            cache,
            catalogue,
            ids,
            compensate,
        }
    }

    /// Make one allocation attempt.
    pub async fn allocate(
        &self,
        event_id: EventId,
        rank: SeatRank,
        user_id: UserId,
    ) -> AppResult<Allocation> {
        let snapshot = self.cache.snapshot(event_id).await?;
        let held: HashSet<SeatId> = snapshot.reservations.iter().map(|r| r.seat_id).collect();

        let seat = self
            .pick_free_seat(rank, &held)
            .ok_or_else(|| AppError::sold_out(format!("Rank {rank} sold out for event {event_id}")))?;

        let reservation = Reservation {
            id: self.ids.next(),
            event_id,
            seat_id: seat.id,
            user_id,
            reserved_at: reservation_timestamp(),
            canceled_at: None,
        };

        if !self
            .cache
            .put_if_version(&reservation, snapshot.version)
            .await?
        {
            debug!(
                event_id = %event_id,
                seat_id = %seat.id,
                version = snapshot.version,
                "Shard version moved, allocation attempt lost the race"
            );
            return Err(AppError::conflict(format!(
                "Event {event_id} changed while allocating seat {}",
                seat.id
            )));
        }

        if let Err(e) = self
            .store
            .insert_reservation(&NewReservation::from(&reservation))
            .await
        {
            if self.compensate {
                match self.cache.delete(event_id, reservation.id).await {
                    Ok(_) => warn!(
                        reservation_id = %reservation.id,
                        event_id = %event_id,
                        "Store write failed, allocation compensated"
                    ),
                    Err(evict) => error!(
                        reservation_id = %reservation.id,
                        error = %evict,
                        "Compensation failed to evict cached reservation"
                    ),
                }
            } else {
                error!(
                    reservation_id = %reservation.id,
                    event_id = %event_id,
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

    /// Uniformly random seat of `rank` not in `held`.
    fn pick_free_seat(&self, rank: SeatRank, held: &HashSet<SeatId>) -> Option<Seat> {
        let free: Vec<&Seat> = self
            .catalogue
            .of_rank(rank)
            .filter(|s| !held.contains(&s.id))
            .collect();
        free.choose(&mut rand::thread_rng()).map(|s| **s)
    }
}
