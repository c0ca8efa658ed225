//! Shared fixtures for service scenario tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use seatbook_cache::memory::MemoryReservationIndex;
use seatbook_cache::{ReservationCache, ReservationIndex, VersionedReservations};
use seatbook_core::config::{AllocationConfig, AllocationStrategy};
use seatbook_core::error::AppError;
use seatbook_core::result::AppResult;
use seatbook_core::types::{EventId, ReservationId, SeatId, UserId};
use seatbook_database::store::{MemoryReservationStore, ReservationStore};
use seatbook_entity::event::Event;
use seatbook_entity::reservation::{NewReservation, Reservation};
use seatbook_entity::seat::{Seat, SeatRank};
use seatbook_service::ReservationEngine;

pub const OPEN_EVENT: EventId = EventId(1);
pub const OTHER_OPEN_EVENT: EventId = EventId(7);
pub const CLOSED_EVENT: EventId = EventId(9);
pub const HIDDEN_EVENT: EventId = EventId(10);

/// Three S seats (IDs 1-3), two A seats (4-5), two C seats (6-7).
pub fn seats() -> Vec<Seat> {
    let layout = [
        (SeatRank::S, 3, 5000),
        (SeatRank::A, 2, 3000),
        (SeatRank::C, 2, 0),
    ];
    let mut seats = Vec::new();
    let mut id = 1;
    for (rank, count, price) in layout {
        for num in 1..=count {
            seats.push(Seat {
                id: SeatId(id),
                rank,
                num,
                price,
            });
            id += 1;
        }
    }
    seats
}

pub fn event(id: EventId, public: bool, closed: bool, price: i64) -> Event {
    Event {
        id,
        title: format!("Event {id}"),
        public,
        closed,
        price,
    }
}

pub fn events() -> Vec<Event> {
    vec![
        event(OPEN_EVENT, true, false, 1000),
        event(OTHER_OPEN_EVENT, true, false, 2000),
        event(CLOSED_EVENT, true, true, 1000),
        event(HIDDEN_EVENT, false, false, 1000),
    ]
}

pub fn memory_store() -> MemoryReservationStore {
    MemoryReservationStore::new(seats(), events())
}

pub fn config(strategy: AllocationStrategy) -> AllocationConfig {
    AllocationConfig {
        strategy,
        reservation_id_floor: 1000,
        ..AllocationConfig::default()
    }
}

pub async fn engine_with(
    config: &AllocationConfig,
    store: Arc<dyn ReservationStore>,
) -> ReservationEngine {
    ReservationEngine::bootstrap(config, store, ReservationCache::in_memory())
        .await
        .expect("bootstrap")
}

pub async fn engine_with_cache(
    config: &AllocationConfig,
    store: Arc<dyn ReservationStore>,
    cache: ReservationCache,
) -> ReservationEngine {
    ReservationEngine::bootstrap(config, store, cache)
        .await
        .expect("bootstrap")
}

pub async fn engine(strategy: AllocationStrategy) -> ReservationEngine {
    engine_with(&config(strategy), Arc::new(memory_store())).await
}

pub fn active(id: i64, event_id: EventId, seat: i64, user: i64, at: DateTime<Utc>) -> NewReservation {
    NewReservation {
        id: ReservationId(id),
        event_id,
        seat_id: SeatId(seat),
        user_id: UserId(user),
        reserved_at: at,
    }
}

/// Store wrapper whose writes can be switched to fail.
#[derive(Debug)]
pub struct FlakyStore {
    inner: MemoryReservationStore,
    fail_inserts: AtomicBool,
    fail_cancels: AtomicBool,
}

impl FlakyStore {
    pub fn new(inner: MemoryReservationStore) -> Self {
        Self {
            inner,
            fail_inserts: AtomicBool::new(false),
            fail_cancels: AtomicBool::new(false),
        }
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_cancels(&self, fail: bool) {
        self.fail_cancels.store(fail, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &MemoryReservationStore {
        &self.inner
    }
}

#[async_trait]
impl ReservationStore for FlakyStore {
    async fn insert_reservation(&self, reservation: &NewReservation) -> AppResult<()> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AppError::service_unavailable("insert refused"));
        }
        self.inner.insert_reservation(reservation).await
    }

    async fn cancel_reservation(
        &self,
        id: ReservationId,
        canceled_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        if self.fail_cancels.load(Ordering::SeqCst) {
            return Err(AppError::service_unavailable("cancel refused"));
        }
        self.inner.cancel_reservation(id, canceled_at).await
    }

    async fn scan_active_reservations(&self) -> AppResult<Vec<Reservation>> {
        self.inner.scan_active_reservations().await
    }

    async fn scan_canceled_reservations(&self) -> AppResult<Vec<Reservation>> {
        self.inner.scan_canceled_reservations().await
    }

    async fn scan_seat_catalogue(&self) -> AppResult<Vec<Seat>> {
        self.inner.scan_seat_catalogue().await
    }

    async fn list_events(&self) -> AppResult<Vec<Event>> {
        self.inner.list_events().await
    }

    async fn max_reservation_id(&self) -> AppResult<Option<ReservationId>> {
        self.inner.max_reservation_id().await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}

/// In-memory index whose deletes can be switched to fail.
#[derive(Debug, Default)]
pub struct FlakyIndex {
    inner: MemoryReservationIndex,
    fail_deletes: AtomicBool,
}

impl FlakyIndex {
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ReservationIndex for FlakyIndex {
    async fn put(&self, reservation: &Reservation) -> AppResult<()> {
        self.inner.put(reservation).await
    }

    async fn delete(&self, event_id: EventId, reservation_id: ReservationId) -> AppResult<bool> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AppError::cache("delete refused"));
        }
        self.inner.delete(event_id, reservation_id).await
    }

    async fn list(&self, event_id: EventId) -> AppResult<Vec<Reservation>> {
        self.inner.list(event_id).await
    }

    async fn warm_start(&self, reservations: Vec<Reservation>) -> AppResult<()> {
        self.inner.warm_start(reservations).await
    }

    async fn snapshot(&self, event_id: EventId) -> AppResult<VersionedReservations> {
        self.inner.snapshot(event_id).await
    }

    async fn put_if_version(
        &self,
        reservation: &Reservation,
        expected_version: u64,
    ) -> AppResult<bool> {
        self.inner.put_if_version(reservation, expected_version).await
    }

    async fn len(&self, event_id: EventId) -> AppResult<usize> {
        self.inner.len(event_id).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}
