//! Reservation cache configuration.

use serde::{Deserialize, Serialize};

/// Backend holding the active-reservation index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheProvider {
    /// Per-event shards in this process.
    #[default]
    Memory,
    /// One Redis hash per event; needs the `redis` feature.
    Redis,
}

/// Where active reservations are indexed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub provider: CacheProvider,
    #[serde(default)]
    pub redis: RedisCacheConfig,
}

/// Redis connection settings, read only when `provider = "redis"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisCacheConfig {
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Prepended to every key, e.g. `seatbook:reservations:active:{event}`.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: default_key_prefix(),
        }
    }
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_key_prefix() -> String {
    "seatbook:".to_string()
}
