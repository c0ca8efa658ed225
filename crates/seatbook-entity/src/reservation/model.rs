//! Reservation entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use seatbook_core::types::{EventId, ReservationId, SeatId, UserId};

/// A record binding one seat to one user for one event.
///
/// `canceled_at` is set at most once and never unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Reservation {
    /// Unique reservation identifier.
    pub id: ReservationId,
    /// Event the seat is reserved for.
    pub event_id: EventId,
    /// Reserved seat.
    pub seat_id: SeatId,
    /// Holder of the reservation.
    pub user_id: UserId,
    /// When the reservation was made.
    pub reserved_at: DateTime<Utc>,
    /// When the reservation was canceled (None = still active).
    pub canceled_at: Option<DateTime<Utc>>,
}

impl Reservation {
    /// Whether the reservation still holds its seat.
    pub fn is_active(&self) -> bool {
        self.canceled_at.is_none()
    }

    /// Return a canceled copy of this reservation.
    pub fn canceled(&self, at: DateTime<Utc>) -> Self {
        Self {
            canceled_at: Some(at),
            ..self.clone()
        }
    }
}

/// Data required to persist a freshly allocated reservation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReservation {
    /// Pre-assigned reservation ID.
    pub id: ReservationId,
    /// Event ID.
    pub event_id: EventId,
    /// Seat ID.
    pub seat_id: SeatId,
    /// Holder.
    pub user_id: UserId,
    /// Creation timestamp shared with the cached copy.
    pub reserved_at: DateTime<Utc>,
}

impl From<&Reservation> for NewReservation {
    fn from(r: &Reservation) -> Self {
        Self {
            id: r.id,
            event_id: r.event_id,
            seat_id: r.seat_id,
            user_id: r.user_id,
            reserved_at: r.reserved_at,
        }
    }
}
