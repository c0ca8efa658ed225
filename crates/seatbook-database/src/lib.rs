//! # seatbook-database
//!
//! PostgreSQL connection management, repositories, and the
//! [`ReservationStore`](store::ReservationStore) adapter the booking core
//! persists through.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::connect_pool;
pub use store::{MemoryReservationStore, PgReservationStore, ReservationStore};
