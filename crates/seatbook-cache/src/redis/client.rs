//! Redis connection shared by the reservation index.

use redis::aio::ConnectionManager;
use tracing::info;

use seatbook_core::config::RedisCacheConfig;
use seatbook_core::error::{AppError, ErrorKind};
use seatbook_core::result::AppResult;

/// Multiplexed, auto-reconnecting connection plus the key namespace.
///
/// Cloning is cheap; every clone shares the same underlying connection.
#[derive(Clone)]
pub struct RedisClient {
    conn: ConnectionManager,
    namespace: String,
}

impl std::fmt::Debug for RedisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisClient")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl RedisClient {
    /// Connect and verify the server answers before the engine warm-starts into it.
    pub async fn connect(config: &RedisCacheConfig) -> AppResult<Self> {
        let client = redis::Client::open(config.url.as_str()).map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Invalid Redis URL", e)
        })?;
        let conn = ConnectionManager::new(client).await.map_err(|e| {
            AppError::with_source(ErrorKind::Cache, "Failed to connect to Redis", e)
        })?;

        let this = Self {
            conn,
            namespace: config.key_prefix.clone(),
        };
        if !this.ping().await? {
            return Err(AppError::cache("Redis did not answer PING"));
        }
        info!(namespace = %this.namespace, "Redis reservation cache connected");
        Ok(this)
    }

    /// A handle for one command or script invocation.
    pub fn conn(&self) -> ConnectionManager {
        self.conn.clone()
    }

    /// Namespace a relative key from [`crate::keys`].
    pub fn key(&self, relative: &str) -> String {
        format!("{}{relative}", self.namespace)
    }

    /// `true` when the server replies `PONG`.
    pub async fn ping(&self) -> AppResult<bool> {
        let mut conn = self.conn();
        let reply: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Cache, "Redis PING failed", e))?;
        Ok(reply == "PONG")
    }
}
