//! The reservation cache: a per-event index of active reservations.
//!
//! The cache mirrors the durable store but is not transactionally tied to
//! it. It reflects exactly the `put`/`delete` calls this process made plus
//! whatever `warm_start` loaded.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use seatbook_core::config::{CacheConfig, CacheProvider};
use seatbook_core::result::AppResult;
use seatbook_core::types::{EventId, ReservationId, SeatId};
use seatbook_entity::reservation::Reservation;

/// An event's active reservations together with the shard version they were read at.
#[derive(Debug, Clone, Default)]
pub struct VersionedReservations {
    /// Shard version; bumped by every mutation of the event's shard.
    pub version: u64,
    /// Active reservations, unordered.
    pub reservations: Vec<Reservation>,
}

/// Backend for the reservation cache, sharded by event.
///
/// Operations on different events never contend with each other.
#[async_trait]
pub trait ReservationIndex: Send + Sync + std::fmt::Debug + 'static {
    /// Insert or replace a reservation. Idempotent.
    async fn put(&self, reservation: &Reservation) -> AppResult<()>;

    /// Remove a reservation. Returns `true` if an entry was removed.
    async fn delete(&self, event_id: EventId, reservation_id: ReservationId) -> AppResult<bool>;

    /// Active reservations of one event, unordered.
    async fn list(&self, event_id: EventId) -> AppResult<Vec<Reservation>>;

    /// Concatenation of [`list`](Self::list) over several events.
    async fn list_many(&self, event_ids: &[EventId]) -> AppResult<Vec<Reservation>> {
        let mut all = Vec::new();
        for event_id in event_ids {
            all.extend(self.list(*event_id).await?);
        }
        Ok(all)
    }

    /// Replace the entire cache content with `reservations`.
    async fn warm_start(&self, reservations: Vec<Reservation>) -> AppResult<()>;

    /// Read an event's reservations and shard version atomically.
    async fn snapshot(&self, event_id: EventId) -> AppResult<VersionedReservations>;

    /// Insert `reservation` only if its shard is still at `expected_version`.
    ///
    /// Returns `false` without side effects when another writer got there first.
    async fn put_if_version(&self, reservation: &Reservation, expected_version: u64)
    -> AppResult<bool>;

    /// Number of active reservations cached for an event.
    async fn len(&self, event_id: EventId) -> AppResult<usize>;

    /// Check that the cache backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}

/// Reservation cache that wraps the configured [`ReservationIndex`].
#[derive(Debug, Clone)]
pub struct ReservationCache {
    inner: Arc<dyn ReservationIndex>,
}

impl ReservationCache {
    /// Create a reservation cache from configuration.
    pub async fn new(config: &CacheConfig) -> AppResult<Self> {
        let inner: Arc<dyn ReservationIndex> = match config.provider {
            CacheProvider::Memory => {
                info!("Initializing in-memory reservation cache");
                Arc::new(crate::memory::MemoryReservationIndex::new())
            }
            #[cfg(feature = "redis-backend")]
            CacheProvider::Redis => {
                info!("Initializing Redis reservation cache");
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                Arc::new(crate::redis::RedisReservationIndex::new(client))
            }
            #[cfg(not(feature = "redis-backend"))]
            CacheProvider::Redis => {
                return Err(seatbook_core::error::AppError::configuration(
                    "cache.provider = \"redis\" requires building with the `redis` feature",
                ));
            }
        };

        Ok(Self { inner })
    }

    /// An in-process cache, independent of configuration.
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(crate::memory::MemoryReservationIndex::new()),
        }
    }

    /// Create a reservation cache from an existing backend.
    pub fn from_index(index: Arc<dyn ReservationIndex>) -> Self {
        Self { inner: index }
    }

    /// The earliest active reservation holding `seat_id` for an event.
    ///
    /// Ordered by `reserved_at`, then by ID.
    pub async fn find_active_for_seat(
        &self,
        event_id: EventId,
        seat_id: SeatId,
    ) -> AppResult<Option<Reservation>> {
        let earliest = self
            .inner
            .list(event_id)
            .await?
            .into_iter()
            .filter(|r| r.seat_id == seat_id)
            .min_by_key(|r| (r.reserved_at, r.id));
        Ok(earliest)
    }
}

#[async_trait]
impl ReservationIndex for ReservationCache {
    async fn put(&self, reservation: &Reservation) -> AppResult<()> {
        self.inner.put(reservation).await
    }

    async fn delete(&self, event_id: EventId, reservation_id: ReservationId) -> AppResult<bool> {
        self.inner.delete(event_id, reservation_id).await
    }

    async fn list(&self, event_id: EventId) -> AppResult<Vec<Reservation>> {
        self.inner.list(event_id).await
    }

    async fn list_many(&self, event_ids: &[EventId]) -> AppResult<Vec<Reservation>> {
        self.inner.list_many(event_ids).await
    }

    async fn warm_start(&self, reservations: Vec<Reservation>) -> AppResult<()> {
        self.inner.warm_start(reservations).await
    }

    async fn snapshot(&self, event_id: EventId) -> AppResult<VersionedReservations> {
        self.inner.snapshot(event_id).await
    }

    async fn put_if_version(
        &self,
        reservation: &Reservation,
        expected_version: u64,
    ) -> AppResult<bool> {
        self.inner.put_if_version(reservation, expected_version).await
    }

    async fn len(&self, event_id: EventId) -> AppResult<usize> {
        self.inner.len(event_id).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use seatbook_core::types::UserId;

    #[cfg(not(feature = "redis-backend"))]
    #[tokio::test]
    async fn test_redis_provider_needs_feature() {
        let config = CacheConfig {
            provider: CacheProvider::Redis,
            ..CacheConfig::default()
        };
        let err = ReservationCache::new(&config).await.expect_err("feature off");
        assert_eq!(err.kind, seatbook_core::error::ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_find_active_for_seat_prefers_earliest_holder() {
        let cache = ReservationCache::in_memory();
        let now = Utc::now();
        let later = Reservation {
            id: ReservationId(1),
            event_id: EventId(1),
            seat_id: SeatId(5),
            user_id: UserId(1),
            reserved_at: now,
            canceled_at: None,
        };
        let earlier = Reservation {
            id: ReservationId(2),
            user_id: UserId(2),
            reserved_at: now - Duration::seconds(1),
            ..later.clone()
        };
        cache.put(&later).await.unwrap();
        cache.put(&earlier).await.unwrap();

        let found = cache
            .find_active_for_seat(EventId(1), SeatId(5))
            .await
            .unwrap()
            .expect("seat is held");
        assert_eq!(found.id, ReservationId(2));
        assert!(cache.find_active_for_seat(EventId(1), SeatId(6)).await.unwrap().is_none());
    }
}
