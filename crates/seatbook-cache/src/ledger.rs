//! Accumulator of canceled reservations, read only by reporting.

use std::collections::HashSet;

use tokio::sync::Mutex;
use tracing::info;

use seatbook_core::types::EventId;
use seatbook_entity::reservation::Reservation;

/// Append-only list of canceled reservations.
#[derive(Debug, Default)]
pub struct CanceledLedger {
    entries: Mutex<Vec<Reservation>>,
}

impl CanceledLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the content with reservations scanned from the store.
    pub async fn warm_start(&self, canceled: Vec<Reservation>) {
        let count = canceled.len();
        *self.entries.lock().await = canceled;
        info!(count, "Canceled-reservation ledger warm-started");
    }

    /// Record a freshly canceled reservation.
    pub async fn append(&self, reservation: Reservation) {
        self.entries.lock().await.push(reservation);
    }

    /// Copy of every entry in append order.
    pub async fn snapshot(&self) -> Vec<Reservation> {
        self.entries.lock().await.clone()
    }

    /// Entries belonging to any of `event_ids`.
    pub async fn for_events(&self, event_ids: &[EventId]) -> Vec<Reservation> {
        let wanted: HashSet<EventId> = event_ids.iter().copied().collect();
        self.entries
            .lock()
            .await
            .iter()
            .filter(|r| wanted.contains(&r.event_id))
            .cloned()
            .collect()
    }

    /// Number of recorded cancellations.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use seatbook_core::types::{ReservationId, SeatId, UserId};

    fn canceled(id: i64, event: i64) -> Reservation {
        let now = Utc::now();
        Reservation {
            id: ReservationId(id),
            event_id: EventId(event),
            seat_id: SeatId(1),
            user_id: UserId(1),
            reserved_at: now,
            canceled_at: Some(now),
        }
    }

    #[tokio::test]
    async fn test_warm_start_then_append() {
        let ledger = CanceledLedger::new();
        ledger.append(canceled(99, 1)).await;
        ledger.warm_start(vec![canceled(1, 1), canceled(2, 2)]).await;
        ledger.append(canceled(3, 1)).await;

        let ids: Vec<_> = ledger.snapshot().await.iter().map(|r| r.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(ledger.len().await, 3);
    }

    #[tokio::test]
    async fn test_for_events_filters() {
        let ledger = CanceledLedger::new();
        ledger.warm_start(vec![canceled(1, 1), canceled(2, 2), canceled(3, 3)]).await;

        let ids: Vec<_> = ledger
            .for_events(&[EventId(1), EventId(3)])
            .await
            .iter()
            .map(|r| r.id.get())
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
