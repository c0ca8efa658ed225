//! # seatbook-service
//!
//! The booking core. Each service composes the seat inventory, the
//! reservation cache, and the durable store to implement one use case:
//!
//! - [`Allocator`]: grant one seat of a rank to a user
//! - [`CancellationService`]: retire a user's reservation
//! - [`SalesReportService`]: sales extract over active and canceled reservations
//! - [`SeatMapService`]: per-seat availability for one event
//!
//! Services follow constructor injection; [`ReservationEngine`] builds and
//! warm-starts the whole graph.

pub mod allocation;
pub mod cancellation;
pub mod directory;
pub mod engine;
pub mod report;
pub mod seating;

pub use allocation::{
    Allocation, AllocationService, Allocator, OptimisticAllocationService, ReservationIdGenerator,
};
pub use cancellation::CancellationService;
pub use directory::EventDirectory;
pub use engine::{EngineHealth, ReservationEngine};
pub use report::{SalesRecord, SalesReportService};
pub use seating::{EventSeating, RankSeating, SeatMapService, SeatStatus};
