//! Seat maps for event pages.

pub mod seat_map;

pub use seat_map::{EventSeating, RankSeating, SeatMapService, SeatStatus};
