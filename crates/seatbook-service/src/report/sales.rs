//! Sales extract generation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use seatbook_cache::{CanceledLedger, ReservationCache, ReservationIndex};
use seatbook_core::result::AppResult;
use seatbook_core::types::{EventId, ReservationId, UserId};
use seatbook_entity::reservation::Reservation;
use seatbook_entity::seat::{SeatCatalogue, SeatRank};

use crate::directory::EventDirectory;

/// One sold (and possibly canceled) seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesRecord {
    /// Reservation ID.
    pub reservation_id: ReservationId,
    /// Event ID.
    pub event_id: EventId,
    /// Seat rank.
    pub rank: SeatRank,
    /// Seat number within the rank.
    pub num: i32,
    /// Event base price plus the seat's rank price.
    pub price: i64,
    /// Buyer.
    pub user_id: UserId,
    /// When the seat was reserved.
    pub sold_at: DateTime<Utc>,
    /// When the reservation was canceled, if it was.
    pub canceled_at: Option<DateTime<Utc>>,
}

/// Builds sales extracts. Read-only.
#[derive(Debug, Clone)]
pub struct SalesReportService {
    cache: ReservationCache,
    ledger: Arc<CanceledLedger>,
    events: Arc<EventDirectory>,
    catalogue: Arc<SeatCatalogue>,
}

impl SalesReportService {
    /// Creates a new sales report service.
    pub fn new(
        cache: ReservationCache,
        ledger: Arc<CanceledLedger>,
        events: Arc<EventDirectory>,
        catalogue: Arc<SeatCatalogue>,
    ) -> Self {
        Self {
            cache,
            ledger,
            events,
            catalogue,
        }
    }

    /// Every reservation of the given events (all events when `None`),
    /// active and canceled, ordered by sale time then reservation ID.
    pub async fn sales(&self, event_ids: Option<&[EventId]>) -> AppResult<Vec<SalesRecord>> {
        let ids = match event_ids {
            Some(ids) => ids.to_vec(),
            None => self.events.ids(),
        };

        let mut reservations = self.cache.list_many(&ids).await?;
        reservations.extend(self.ledger.for_events(&ids).await);

        let mut records: Vec<SalesRecord> = reservations
            .iter()
            .filter_map(|r| self.record(r))
            .collect();
        records.sort_by_key(|r| (r.sold_at, r.reservation_id));
        Ok(records)
    }

    fn record(&self, reservation: &Reservation) -> Option<SalesRecord> {
        let (Some(seat), Some(event)) = (
            self.catalogue.get(reservation.seat_id),
            self.events.get(reservation.event_id),
        ) else {
            warn!(
                reservation_id = %reservation.id,
                "Skipping reservation with unknown seat or event"
            );
            return None;
        };

        Some(SalesRecord {
            reservation_id: reservation.id,
            event_id: reservation.event_id,
            rank: seat.rank,
            num: seat.num,
            price: event.price + seat.price,
            user_id: reservation.user_id,
            sold_at: reservation.reserved_at,
            canceled_at: reservation.canceled_at,
        })
    }
}
