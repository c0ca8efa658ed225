//! Concrete repository implementations, one per table.

pub mod event;
pub mod reservation;
pub mod seat;

pub use event::EventRepository;
pub use reservation::ReservationRepository;
pub use seat::SeatRepository;
