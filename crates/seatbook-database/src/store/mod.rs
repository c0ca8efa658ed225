//! The durable reservation store the booking core persists through.
//!
//! The core never talks to a database directly; it consumes this trait.
//! Every failure an implementation reports is a store outage from the
//! caller's point of view and carries [`ErrorKind::ServiceUnavailable`].
//!
//! [`ErrorKind::ServiceUnavailable`]: seatbook_core::error::ErrorKind::ServiceUnavailable

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use seatbook_core::error::{AppError, ErrorKind};
use seatbook_core::result::AppResult;
use seatbook_core::types::ReservationId;
use seatbook_entity::event::Event;
use seatbook_entity::reservation::{NewReservation, Reservation};
use seatbook_entity::seat::Seat;

pub use memory::MemoryReservationStore;
pub use postgres::PgReservationStore;

/// Durable storage of reservations plus the static data the core boots from.
#[async_trait]
pub trait ReservationStore: Send + Sync + std::fmt::Debug + 'static {
    /// Persist a reservation with its pre-assigned ID and timestamp.
    async fn insert_reservation(&self, reservation: &NewReservation) -> AppResult<()>;

    /// Mark a reservation canceled.
    ///
    /// Returns `true` only when an active reservation transitioned; a
    /// repeated cancel returns `false` and changes nothing.
    async fn cancel_reservation(
        &self,
        id: ReservationId,
        canceled_at: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Every reservation whose `canceled_at` is unset.
    async fn scan_active_reservations(&self) -> AppResult<Vec<Reservation>>;

    /// Every canceled reservation.
    async fn scan_canceled_reservations(&self) -> AppResult<Vec<Reservation>>;

    /// The full static seat catalogue.
    async fn scan_seat_catalogue(&self) -> AppResult<Vec<Seat>>;

    /// Every event, ordered by ID.
    async fn list_events(&self) -> AppResult<Vec<Event>>;

    /// Highest reservation ID the store has seen.
    async fn max_reservation_id(&self) -> AppResult<Option<ReservationId>>;

    /// Check that the store is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}

/// Re-label a failure as a store outage, keeping message and cause.
pub(crate) fn unavailable(err: AppError) -> AppError {
    AppError {
        kind: ErrorKind::ServiceUnavailable,
        ..err
    }
}
