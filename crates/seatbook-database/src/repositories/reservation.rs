//! Reservation repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use seatbook_core::error::{AppError, ErrorKind};
use seatbook_core::result::AppResult;
use seatbook_core::types::ReservationId;
use seatbook_entity::reservation::{NewReservation, Reservation};

const COLUMNS: &str = "id, event_id, seat_id, user_id, reserved_at, canceled_at";

/// Repository for reservation rows.
#[derive(Debug, Clone)]
pub struct ReservationRepository {
    pool: PgPool,
}

impl ReservationRepository {
    /// Create a new reservation repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a reservation with its pre-assigned ID and timestamp.
    pub async fn create(&self, reservation: &NewReservation) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO reservations (id, event_id, seat_id, user_id, reserved_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(reservation.id)
        .bind(reservation.event_id)
        .bind(reservation.seat_id)
        .bind(reservation.user_id)
        .bind(reservation.reserved_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert reservation", e))?;
        Ok(())
    }

    /// Set `canceled_at` on an active reservation.
    ///
    /// Returns `false` when the row was missing or already canceled.
    pub async fn cancel(&self, id: ReservationId, canceled_at: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE reservations SET canceled_at = $2 WHERE id = $1 AND canceled_at IS NULL",
        )
        .bind(id)
        .bind(canceled_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to cancel reservation", e))?;
        Ok(result.rows_affected() == 1)
    }

    /// All reservations that still hold their seat.
    pub async fn find_all_active(&self) -> AppResult<Vec<Reservation>> {
        sqlx::query_as::<_, Reservation>(&format!(
            "SELECT {COLUMNS} FROM reservations WHERE canceled_at IS NULL"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to scan active reservations", e)
        })
    }

    /// All canceled reservations.
    pub async fn find_all_canceled(&self) -> AppResult<Vec<Reservation>> {
        sqlx::query_as::<_, Reservation>(&format!(
            "SELECT {COLUMNS} FROM reservations WHERE canceled_at IS NOT NULL"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to scan canceled reservations", e)
        })
    }

    /// Highest reservation ID ever written.
    pub async fn max_id(&self) -> AppResult<Option<ReservationId>> {
        sqlx::query_scalar::<_, Option<ReservationId>>("SELECT MAX(id) FROM reservations")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to read max reservation id", e)
            })
    }
}
