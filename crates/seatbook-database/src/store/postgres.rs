//! PostgreSQL-backed reservation store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use seatbook_core::error::{AppError, ErrorKind};
use seatbook_core::result::AppResult;
use seatbook_core::types::ReservationId;
use seatbook_entity::event::Event;
use seatbook_entity::reservation::{NewReservation, Reservation};
use seatbook_entity::seat::Seat;

use super::{ReservationStore, unavailable};
use crate::repositories::{EventRepository, ReservationRepository, SeatRepository};

/// [`ReservationStore`] over the `events`, `seats`, and `reservations` tables.
#[derive(Debug, Clone)]
pub struct PgReservationStore {
    pool: PgPool,
    reservations: ReservationRepository,
    seats: SeatRepository,
    events: EventRepository,
}

impl PgReservationStore {
    /// Create a store sharing `pool` across its repositories.
    pub fn new(pool: PgPool) -> Self {
        Self {
            reservations: ReservationRepository::new(pool.clone()),
            seats: SeatRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl ReservationStore for PgReservationStore {
    async fn insert_reservation(&self, reservation: &NewReservation) -> AppResult<()> {
        self.reservations.create(reservation).await.map_err(unavailable)?;
        debug!(reservation_id = %reservation.id, "Reservation persisted");
        Ok(())
    }

    async fn cancel_reservation(
        &self,
        id: ReservationId,
        canceled_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        self.reservations
            .cancel(id, canceled_at)
            .await
            .map_err(unavailable)
    }

    async fn scan_active_reservations(&self) -> AppResult<Vec<Reservation>> {
        self.reservations.find_all_active().await.map_err(unavailable)
    }

    async fn scan_canceled_reservations(&self) -> AppResult<Vec<Reservation>> {
        self.reservations.find_all_canceled().await.map_err(unavailable)
    }

    async fn scan_seat_catalogue(&self) -> AppResult<Vec<Seat>> {
        self.seats.find_all().await.map_err(unavailable)
    }

    async fn list_events(&self) -> AppResult<Vec<Event>> {
        self.events.find_all().await.map_err(unavailable)
    }

    async fn max_reservation_id(&self) -> AppResult<Option<ReservationId>> {
        self.reservations.max_id().await.map_err(unavailable)
    }

    async fn health_check(&self) -> AppResult<bool> {
        let one: i32 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                unavailable(AppError::with_source(
                    ErrorKind::Database,
                    "Health check failed",
                    e,
                ))
            })?;
        Ok(one == 1)
    }
}
