//! Cache key builders for every key the Redis backend writes.
//!
//! Keys are relative; the Redis client prepends the configured prefix.

use seatbook_core::types::EventId;

/// Pattern matching every reservation key (hashes and versions).
pub const ALL_RESERVATION_KEYS: &str = "reservations:*";

/// Hash of `reservation id -> reservation JSON` for one event's active reservations.
pub fn active_reservations(event_id: EventId) -> String {
    format!("reservations:active:{event_id}")
}

/// Counter bumped by every mutation of one event's hash.
pub fn shard_version(event_id: EventId) -> String {
    format!("reservations:version:{event_id}")
}
