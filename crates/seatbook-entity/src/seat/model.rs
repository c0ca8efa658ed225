//! Seat entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use seatbook_core::types::SeatId;

use super::rank::SeatRank;

/// An immutable bookable unit, loaded once from the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
pub struct Seat {
    /// Unique seat identifier.
    pub id: SeatId,
    /// Seating tier.
    pub rank: SeatRank,
    /// Seat number within its rank.
    pub num: i32,
    /// Rank surcharge on top of the event's base price.
    pub price: i64,
}
