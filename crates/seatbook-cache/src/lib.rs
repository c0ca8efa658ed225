//! # seatbook-cache
//!
//! The in-memory state of the booking core:
//!
//! - [`SeatInventory`]: per (event, rank) FIFO pools of unreserved seats
//! - [`ReservationCache`]: per-event index of active reservations, backed by
//!   an in-process sharded map (**memory**) or Redis hashes (**redis**)
//! - [`CanceledLedger`]: canceled reservations kept for reporting
//!
//! The reservation cache provider is selected at runtime based on
//! configuration; the inventory and ledger are always in-process.

pub mod inventory;
pub mod keys;
pub mod ledger;
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use inventory::SeatInventory;
pub use ledger::CanceledLedger;
pub use provider::{ReservationCache, ReservationIndex, VersionedReservations};
