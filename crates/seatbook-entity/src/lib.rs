//! # seatbook-entity
//!
//! Domain entity models for Seatbook: the immutable seat catalogue,
//! reservations, and the events seats are sold for.

pub mod event;
pub mod reservation;
pub mod seat;

pub use event::Event;
pub use reservation::{NewReservation, Reservation};
pub use seat::{Seat, SeatCatalogue, SeatRank};
