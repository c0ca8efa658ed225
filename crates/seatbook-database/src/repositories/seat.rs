//! Seat catalogue repository implementation.

use sqlx::PgPool;

use seatbook_core::error::{AppError, ErrorKind};
use seatbook_core::result::AppResult;
use seatbook_entity::seat::Seat;

/// Read-only repository over the static seat catalogue.
#[derive(Debug, Clone)]
pub struct SeatRepository {
    pool: PgPool,
}

impl SeatRepository {
    /// Create a new seat repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load every seat, ordered by rank then number.
    pub async fn find_all(&self) -> AppResult<Vec<Seat>> {
        sqlx::query_as::<_, Seat>("SELECT id, rank, num, price FROM seats ORDER BY rank, num")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load seats", e))
    }
}
