//! Redis-backed reservation cache.

pub mod client;
pub mod index;

pub use client::RedisClient;
pub use index::RedisReservationIndex;
