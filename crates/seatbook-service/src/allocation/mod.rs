//! Seat allocation: grant one seat of a rank to a user.
//!
//! Two mutually exclusive strategies exist. [`AllocationService`] hands out
//! seats from pre-populated per-rank pools; [`OptimisticAllocationService`]
//! recomputes free seats from the reservation cache and commits with a
//! versioned write. [`Allocator`] is the entry point that picks one.

pub mod allocator;
pub mod id;
pub mod optimistic;
pub mod pool;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use seatbook_core::types::{EventId, ReservationId};
use seatbook_entity::seat::Seat;

pub use allocator::Allocator;
pub use id::ReservationIdGenerator;
pub use optimistic::OptimisticAllocationService;
pub use pool::AllocationService;

/// A granted seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    /// ID of the new reservation.
    pub reservation_id: ReservationId,
    /// Event the seat was granted for.
    pub event_id: EventId,
    /// The granted seat.
    pub seat: Seat,
    /// Creation timestamp shared by the cached and persisted copies.
    pub reserved_at: DateTime<Utc>,
}

/// Current time truncated to the store's microsecond precision, so a
/// timestamp reloaded at warm start compares equal to the in-memory copy.
pub(crate) fn reservation_timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
