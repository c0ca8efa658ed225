//! Reservation cancellation.

pub mod service;

pub use service::CancellationService;
