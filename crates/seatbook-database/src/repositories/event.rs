//! Event repository implementation.

use sqlx::PgPool;

use seatbook_core::error::{AppError, ErrorKind};
use seatbook_core::result::AppResult;
use seatbook_entity::event::Event;

/// Repository for events.
#[derive(Debug, Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    /// Create a new event repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List every event, ordered by ID.
    pub async fn find_all(&self) -> AppResult<Vec<Event>> {
        sqlx::query_as::<_, Event>(
            "SELECT id, title, public, closed, price FROM events ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list events", e))
    }
}
