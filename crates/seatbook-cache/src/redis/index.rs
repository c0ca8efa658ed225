//! Redis reservation index: one hash per event plus a version counter.
//!
//! Every mutation runs as a Lua script so that the hash write and the
//! version bump are applied atomically.

use async_trait::async_trait;
use tracing::info;

use seatbook_core::error::{AppError, ErrorKind};
use seatbook_core::result::AppResult;
use seatbook_core::types::{EventId, ReservationId};
use seatbook_entity::reservation::Reservation;

use super::client::RedisClient;
use crate::keys;
use crate::provider::{ReservationIndex, VersionedReservations};

/// KEYS[1] = active hash, KEYS[2] = version key
/// ARGV[1] = reservation id, ARGV[2] = reservation JSON
const PUT_SCRIPT: &str = r#"
    redis.call('HSET', KEYS[1], ARGV[1], ARGV[2])
    redis.call('INCR', KEYS[2])
    return 1
"#;

/// KEYS[1] = active hash, KEYS[2] = version key
/// ARGV[1] = reservation id
///
/// Returns the number of removed fields.
const DELETE_SCRIPT: &str = r#"
    local removed = redis.call('HDEL', KEYS[1], ARGV[1])
    if removed > 0 then
        redis.call('INCR', KEYS[2])
    end
    return removed
"#;

/// KEYS[1] = active hash, KEYS[2] = version key
/// ARGV[1] = reservation id, ARGV[2] = reservation JSON, ARGV[3] = expected version
///
/// Returns 1 when written, 0 when the version moved.
const PUT_IF_VERSION_SCRIPT: &str = r#"
    local current = tonumber(redis.call('GET', KEYS[2]) or '0')
    if current ~= tonumber(ARGV[3]) then
        return 0
    end
    redis.call('HSET', KEYS[1], ARGV[1], ARGV[2])
    redis.call('INCR', KEYS[2])
    return 1
"#;

/// KEYS[1] = active hash, KEYS[2] = version key
///
/// Returns `[version, json...]`.
const SNAPSHOT_SCRIPT: &str = r#"
    local values = redis.call('HVALS', KEYS[1])
    table.insert(values, 1, redis.call('GET', KEYS[2]) or '0')
    return values
"#;

/// Redis-backed [`ReservationIndex`].
#[derive(Debug, Clone)]
pub struct RedisReservationIndex {
    client: RedisClient,
}

impl RedisReservationIndex {
    /// Create a new Redis reservation index.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::Cache, format!("Redis error: {e}"), e)
    }

    fn keys(&self, event_id: EventId) -> (String, String) {
        (
            self.client.key(&keys::active_reservations(event_id)),
            self.client.key(&keys::shard_version(event_id)),
        )
    }

    fn decode(values: Vec<String>) -> AppResult<Vec<Reservation>> {
        values
            .iter()
            .map(|json| serde_json::from_str(json).map_err(AppError::from))
            .collect()
    }
}

#[async_trait]
impl ReservationIndex for RedisReservationIndex {
    async fn put(&self, reservation: &Reservation) -> AppResult<()> {
        let (hash, version) = self.keys(reservation.event_id);
        let json = serde_json::to_string(reservation)?;
        let mut conn = self.client.conn();

        let _: i64 = redis::Script::new(PUT_SCRIPT)
            .key(hash)
            .key(version)
            .arg(reservation.id.get())
            .arg(json)
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn delete(&self, event_id: EventId, reservation_id: ReservationId) -> AppResult<bool> {
        let (hash, version) = self.keys(event_id);
        let mut conn = self.client.conn();

        let removed: i64 = redis::Script::new(DELETE_SCRIPT)
            .key(hash)
            .key(version)
            .arg(reservation_id.get())
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(removed > 0)
    }

    async fn list(&self, event_id: EventId) -> AppResult<Vec<Reservation>> {
        let (hash, _) = self.keys(event_id);
        let mut conn = self.client.conn();

        let values: Vec<String> = redis::cmd("HVALS")
            .arg(&hash)
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Self::decode(values)
    }

    async fn warm_start(&self, reservations: Vec<Reservation>) -> AppResult<()> {
        let mut conn = self.client.conn();

        let stale: Vec<String> = redis::cmd("KEYS")
            .arg(self.client.key(keys::ALL_RESERVATION_KEYS))
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        let mut pipe = redis::pipe();
        pipe.atomic();
        for key in &stale {
            pipe.cmd("DEL").arg(key).ignore();
        }
        let mut loaded = 0usize;
        for reservation in reservations.iter().filter(|r| r.is_active()) {
            let (hash, _) = self.keys(reservation.event_id);
            pipe.cmd("HSET")
                .arg(hash)
                .arg(reservation.id.get())
                .arg(serde_json::to_string(reservation)?)
                .ignore();
            loaded += 1;
        }
        let _: () = pipe.query_async(&mut conn).await.map_err(Self::map_err)?;

        info!(
            reservations = loaded,
            cleared_keys = stale.len(),
            "Redis reservation cache warm-started"
        );
        Ok(())
    }

    async fn snapshot(&self, event_id: EventId) -> AppResult<VersionedReservations> {
        let (hash, version) = self.keys(event_id);
        let mut conn = self.client.conn();

        let mut values: Vec<String> = redis::Script::new(SNAPSHOT_SCRIPT)
            .key(hash)
            .key(version)
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        if values.is_empty() {
            return Err(AppError::cache("Snapshot script returned no version"));
        }
        let version = values.remove(0).parse::<u64>().map_err(|e| {
            AppError::with_source(ErrorKind::Cache, "Malformed shard version", e)
        })?;

        Ok(VersionedReservations {
            version,
            reservations: Self::decode(values)?,
        })
    }

    async fn put_if_version(
        &self,
        reservation: &Reservation,
        expected_version: u64,
    ) -> AppResult<bool> {
        let (hash, version) = self.keys(reservation.event_id);
        let json = serde_json::to_string(reservation)?;
        let mut conn = self.client.conn();

        let written: i64 = redis::Script::new(PUT_IF_VERSION_SCRIPT)
            .key(hash)
            .key(version)
            .arg(reservation.id.get())
            .arg(json)
            .arg(expected_version)
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(written == 1)
    }

    async fn len(&self, event_id: EventId) -> AppResult<usize> {
        let (hash, _) = self.keys(event_id);
        let mut conn = self.client.conn();

        let len: usize = redis::cmd("HLEN")
            .arg(&hash)
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(len)
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.client.ping().await
    }
}
