//! Process-local reservation store for single-node runs and tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::info;

use seatbook_core::error::AppError;
use seatbook_core::result::AppResult;
use seatbook_core::types::{EventId, ReservationId, SeatId};
use seatbook_entity::event::Event;
use seatbook_entity::reservation::{NewReservation, Reservation};
use seatbook_entity::seat::{Seat, SeatCatalogue};

use super::{ReservationStore, unavailable};

#[derive(Debug, Default)]
struct Tables {
    reservations: BTreeMap<ReservationId, Reservation>,
    /// (event, seat) pairs held by an active reservation.
    active_seats: HashSet<(EventId, SeatId)>,
}

/// In-memory [`ReservationStore`].
///
/// Enforces the same uniqueness rules as the PostgreSQL schema: reservation
/// IDs are primary keys and each (event, seat) has at most one active row.
#[derive(Debug, Clone)]
pub struct MemoryReservationStore {
    seats: Arc<Vec<Seat>>,
    events: Arc<Vec<Event>>,
    tables: Arc<Mutex<Tables>>,
}

impl MemoryReservationStore {
    /// Create an empty store over the given catalogue and events.
    pub fn new(seats: Vec<Seat>, mut events: Vec<Event>) -> Self {
        events.sort_by_key(|e| e.id);
        Self {
            seats: Arc::new(seats),
            events: Arc::new(events),
            tables: Arc::new(Mutex::new(Tables::default())),
        }
    }

    /// Standard seat catalogue plus `event_count` public events with IDs from 1.
    pub fn seeded(event_count: u32) -> Self {
        let seats = SeatCatalogue::standard().iter().copied().collect();
        let events = (1..=i64::from(event_count))
            .map(|id| Event {
                id: EventId(id),
                title: format!("Event {id}"),
                public: true,
                closed: false,
                price: 1000,
            })
            .collect();
        info!(events = event_count, "Seeded in-memory reservation store");
        Self::new(seats, events)
    }
}

#[async_trait]
impl ReservationStore for MemoryReservationStore {
    async fn insert_reservation(&self, reservation: &NewReservation) -> AppResult<()> {
        let mut tables = self.tables.lock().await;

        if tables.reservations.contains_key(&reservation.id) {
            return Err(unavailable(AppError::database(format!(
                "Duplicate reservation id {}",
                reservation.id
            ))));
        }
        let seat_key = (reservation.event_id, reservation.seat_id);
        if !tables.active_seats.insert(seat_key) {
            return Err(unavailable(AppError::database(format!(
                "Seat {} already reserved for event {}",
                reservation.seat_id, reservation.event_id
            ))));
        }

        tables.reservations.insert(
            reservation.id,
            Reservation {
                id: reservation.id,
                event_id: reservation.event_id,
                seat_id: reservation.seat_id,
                user_id: reservation.user_id,
                reserved_at: reservation.reserved_at,
                canceled_at: None,
            },
        );
        Ok(())
    }

    async fn cancel_reservation(
        &self,
        id: ReservationId,
        canceled_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut guard = self.tables.lock().await;
        let tables = &mut *guard;

        match tables.reservations.get_mut(&id) {
            Some(row) if row.canceled_at.is_none() => {
                row.canceled_at = Some(canceled_at);
                tables.active_seats.remove(&(row.event_id, row.seat_id));
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn scan_active_reservations(&self) -> AppResult<Vec<Reservation>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .reservations
            .values()
            .filter(|r| r.is_active())
            .cloned()
            .collect())
    }

    async fn scan_canceled_reservations(&self) -> AppResult<Vec<Reservation>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .reservations
            .values()
            .filter(|r| !r.is_active())
            .cloned()
            .collect())
    }

    async fn scan_seat_catalogue(&self) -> AppResult<Vec<Seat>> {
        Ok(self.seats.as_ref().clone())
    }

    async fn list_events(&self) -> AppResult<Vec<Event>> {
        Ok(self.events.as_ref().clone())
    }

    async fn max_reservation_id(&self) -> AppResult<Option<ReservationId>> {
        let tables = self.tables.lock().await;
        Ok(tables.reservations.keys().next_back().copied())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seatbook_core::error::ErrorKind;
    use seatbook_core::types::UserId;

    fn new_reservation(id: i64, seat: i64) -> NewReservation {
        NewReservation {
            id: ReservationId(id),
            event_id: EventId(1),
            seat_id: SeatId(seat),
            user_id: UserId(9),
            reserved_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_seeded_catalogue_and_events() {
        let store = MemoryReservationStore::seeded(2);
        assert_eq!(store.scan_seat_catalogue().await.unwrap().len(), 1000);
        let events = store.list_events().await.unwrap();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.is_on_sale()));
    }

    #[tokio::test]
    async fn test_active_seat_is_unique() {
        let store = MemoryReservationStore::seeded(1);
        store.insert_reservation(&new_reservation(1, 10)).await.unwrap();

        let err = store
            .insert_reservation(&new_reservation(2, 10))
            .await
            .expect_err("seat already held");
        assert_eq!(err.kind, ErrorKind::ServiceUnavailable);

        assert!(store.cancel_reservation(ReservationId(1), Utc::now()).await.unwrap());
        store.insert_reservation(&new_reservation(2, 10)).await.unwrap();
    }

    #[tokio::test]
    async fn test_cancel_is_applied_once() {
        let store = MemoryReservationStore::seeded(1);
        store.insert_reservation(&new_reservation(5, 1)).await.unwrap();

        assert!(store.cancel_reservation(ReservationId(5), Utc::now()).await.unwrap());
        assert!(!store.cancel_reservation(ReservationId(5), Utc::now()).await.unwrap());
        assert!(!store.cancel_reservation(ReservationId(6), Utc::now()).await.unwrap());

        assert!(store.scan_active_reservations().await.unwrap().is_empty());
        assert_eq!(store.scan_canceled_reservations().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_max_reservation_id() {
        let store = MemoryReservationStore::seeded(1);
        assert_eq!(store.max_reservation_id().await.unwrap(), None);
        store.insert_reservation(&new_reservation(7, 1)).await.unwrap();
        store.insert_reservation(&new_reservation(3, 2)).await.unwrap();
        assert_eq!(
            store.max_reservation_id().await.unwrap(),
            Some(ReservationId(7))
        );
    }
}
