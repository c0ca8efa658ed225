//! Per-seat availability for one event, as seen by one viewer.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use seatbook_cache::{ReservationCache, ReservationIndex};
use seatbook_core::result::AppResult;
use seatbook_core::types::{EventId, SeatId, UserId};
use seatbook_entity::event::Event;
use seatbook_entity::reservation::Reservation;
use seatbook_entity::seat::{SeatCatalogue, SeatRank};

use crate::directory::EventDirectory;

/// State of a single seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatStatus {
    pub seat_id: SeatId,
    pub num: i32,
    /// Held by an active reservation.
    pub reserved: bool,
    /// Held by the viewer.
    pub mine: bool,
    /// When the earliest holder reserved it.
    pub reserved_at: Option<DateTime<Utc>>,
}

/// One rank's seats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankSeating {
    pub rank: SeatRank,
    /// Event price plus rank price.
    pub price: i64,
    pub total: usize,
    pub remaining: usize,
    /// Ordered by seat ID.
    pub seats: Vec<SeatStatus>,
}

/// Seat map of one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSeating {
    pub event: Event,
    pub total: usize,
    pub remaining: usize,
    /// Most expensive rank first.
    pub ranks: Vec<RankSeating>,
}

/// Builds seat maps from the catalogue and the reservation cache.
#[derive(Debug, Clone)]
pub struct SeatMapService {
    cache: ReservationCache,
    events: Arc<EventDirectory>,
    catalogue: Arc<SeatCatalogue>,
}

impl SeatMapService {
    /// Creates a new seat map service.
    pub fn new(
        cache: ReservationCache,
        events: Arc<EventDirectory>,
        catalogue: Arc<SeatCatalogue>,
    ) -> Self {
        Self {
            cache,
            events,
            catalogue,
        }
    }

    /// Seat map of `event_id`; `viewer` marks the seats they hold.
    pub async fn event_seating(
        &self,
        event_id: EventId,
        viewer: Option<UserId>,
    ) -> AppResult<EventSeating> {
        let event = self.events.require(event_id)?;
        let holders = earliest_holders(self.cache.list(event_id).await?);

        let ranks: Vec<RankSeating> = SeatRank::ALL
            .into_iter()
            .map(|rank| {
                let seats: Vec<SeatStatus> = self
                    .catalogue
                    .of_rank(rank)
                    .map(|seat| {
                        let holder = holders.get(&seat.id);
                        SeatStatus {
                            seat_id: seat.id,
                            num: seat.num,
                            reserved: holder.is_some(),
                            mine: matches!((holder, viewer), (Some(h), Some(v)) if h.user_id == v),
                            reserved_at: holder.map(|h| h.reserved_at),
                        }
                    })
                    .collect();
                let rank_price = self.catalogue.of_rank(rank).next().map_or(0, |s| s.price);

                RankSeating {
                    rank,
                    price: event.price + rank_price,
                    total: seats.len(),
                    remaining: seats.iter().filter(|s| !s.reserved).count(),
                    seats,
                }
            })
            .collect();

        Ok(EventSeating {
            total: ranks.iter().map(|r| r.total).sum(),
            remaining: ranks.iter().map(|r| r.remaining).sum(),
            event,
            ranks,
        })
    }
}

fn earliest_holders(reservations: Vec<Reservation>) -> HashMap<SeatId, Reservation> {
    let mut holders: HashMap<SeatId, Reservation> = HashMap::new();
    for reservation in reservations {
        match holders.get(&reservation.seat_id) {
            Some(current)
                if (current.reserved_at, current.id)
                    <= (reservation.reserved_at, reservation.id) => {}
            _ => {
                holders.insert(reservation.seat_id, reservation);
            }
        }
    }
    holders
}
