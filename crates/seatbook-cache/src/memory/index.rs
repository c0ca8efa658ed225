//! Sharded in-memory reservation index using dashmap.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::info;

use seatbook_core::result::AppResult;
use seatbook_core::types::{EventId, ReservationId};
use seatbook_entity::reservation::Reservation;

use crate::provider::{ReservationIndex, VersionedReservations};

/// One event's active reservations.
///
/// Readers go straight to `entries`; writers serialize on `version` for the
/// duration of a single map mutation so versioned reads stay consistent.
#[derive(Debug, Default)]
struct Shard {
    entries: DashMap<ReservationId, Reservation>,
    version: Mutex<u64>,
}

/// In-memory [`ReservationIndex`] with one shard per event.
#[derive(Debug, Default)]
pub struct MemoryReservationIndex {
    shards: DashMap<EventId, Arc<Shard>>,
}

impl MemoryReservationIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    fn shard(&self, event_id: EventId) -> Arc<Shard> {
        Arc::clone(self.shards.entry(event_id).or_default().value())
    }

    fn existing_shard(&self, event_id: EventId) -> Option<Arc<Shard>> {
        self.shards.get(&event_id).map(|s| Arc::clone(s.value()))
    }
}

#[async_trait]
impl ReservationIndex for MemoryReservationIndex {
    async fn put(&self, reservation: &Reservation) -> AppResult<()> {
        let shard = self.shard(reservation.event_id);
        let mut version = shard.version.lock().await;
        shard.entries.insert(reservation.id, reservation.clone());
        *version += 1;
        Ok(())
    }

    async fn delete(&self, event_id: EventId, reservation_id: ReservationId) -> AppResult<bool> {
        let Some(shard) = self.existing_shard(event_id) else {
            return Ok(false);
        };
        let mut version = shard.version.lock().await;
        let removed = shard.entries.remove(&reservation_id).is_some();
        if removed {
            *version += 1;
        }
        Ok(removed)
    }

    async fn list(&self, event_id: EventId) -> AppResult<Vec<Reservation>> {
        Ok(self
            .existing_shard(event_id)
            .map(|shard| shard.entries.iter().map(|e| e.value().clone()).collect())
            .unwrap_or_default())
    }

    async fn warm_start(&self, reservations: Vec<Reservation>) -> AppResult<()> {
        let total = reservations.len();
        let mut grouped: HashMap<EventId, Vec<Reservation>> = HashMap::new();
        for reservation in reservations.into_iter().filter(Reservation::is_active) {
            grouped.entry(reservation.event_id).or_default().push(reservation);
        }

        self.shards.clear();
        let events = grouped.len();
        for (event_id, reservations) in grouped {
            let shard = Shard::default();
            for reservation in reservations {
                shard.entries.insert(reservation.id, reservation);
            }
            self.shards.insert(event_id, Arc::new(shard));
        }

        info!(reservations = total, events, "Reservation cache warm-started");
        Ok(())
    }

    async fn snapshot(&self, event_id: EventId) -> AppResult<VersionedReservations> {
        let shard = self.shard(event_id);
        let version = shard.version.lock().await;
        Ok(VersionedReservations {
            version: *version,
            reservations: shard.entries.iter().map(|e| e.value().clone()).collect(),
        })
    }

    async fn put_if_version(
        &self,
        reservation: &Reservation,
        expected_version: u64,
    ) -> AppResult<bool> {
        let shard = self.shard(reservation.event_id);
        let mut version = shard.version.lock().await;
        if *version != expected_version {
            return Ok(false);
        }
        shard.entries.insert(reservation.id, reservation.clone());
        *version += 1;
        Ok(true)
    }

    async fn len(&self, event_id: EventId) -> AppResult<usize> {
        Ok(self
            .existing_shard(event_id)
            .map(|shard| shard.entries.len())
            .unwrap_or(0))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
