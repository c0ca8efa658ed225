//! Seat domain entities.

pub mod catalogue;
pub mod model;
pub mod rank;

pub use catalogue::SeatCatalogue;
pub use model::Seat;
pub use rank::SeatRank;
