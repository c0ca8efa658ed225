//! In-process reservation cache backend.

pub mod index;

pub use index::MemoryReservationIndex;
