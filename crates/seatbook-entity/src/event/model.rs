//! Event entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use seatbook_core::types::EventId;

/// A performance that seats are sold for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Event {
    /// Unique event identifier.
    pub id: EventId,
    /// Display title.
    pub title: String,
    /// Whether the event is listed to users.
    pub public: bool,
    /// Whether sales have ended.
    pub closed: bool,
    /// Base price added to every seat's rank price.
    pub price: i64,
}

impl Event {
    /// Whether new reservations may be made for this event.
    pub fn is_on_sale(&self) -> bool {
        self.public && !self.closed
    }
}
