//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Every field carries a default, so an empty configuration
//! describes a single-node, fully in-memory deployment.

pub mod allocation;
pub mod cache;
pub mod database;
pub mod logging;

use serde::{Deserialize, Serialize};

pub use self::allocation::{AllocationConfig, AllocationStrategy};
pub use self::cache::{CacheConfig, CacheProvider, RedisCacheConfig};
pub use self::database::{DatabaseConfig, DatabaseProvider};
pub use self::logging::{LogFormat, LoggingConfig};

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Durable store settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Reservation cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Seat allocation settings.
    #[serde(default)]
    pub allocation: AllocationConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `path` with an optional `config/{env}` overlay and
    /// environment variables prefixed with `SEATBOOK__`
    /// (e.g. `SEATBOOK__ALLOCATION__STRATEGY=optimistic`).
    pub fn load(path: &str, env: Option<&str>) -> Result<Self, AppError> {
        let mut builder =
            config::Config::builder().add_source(config::File::with_name(path).required(false));

        if let Some(env) = env {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{env}")).required(false));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("SEATBOOK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_describe_in_memory_node() {
        let config = AppConfig::default();
        assert_eq!(config.database.provider, DatabaseProvider::Memory);
        assert_eq!(config.cache.provider, CacheProvider::Memory);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.allocation.strategy, AllocationStrategy::Pool);
        assert!(config.allocation.compensate_store_failures);
        assert_eq!(config.allocation.reservation_id_floor, 10_000_000);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = AppConfig::load("does/not/exist", None).expect("load");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.allocation.conflict_retries, 8);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let parsed: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(
                "[allocation]\nstrategy = \"optimistic\"\n[logging]\nformat = \"json\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .and_then(|c| c.try_deserialize())
            .expect("parse");
        assert_eq!(parsed.allocation.strategy, AllocationStrategy::Optimistic);
        assert_eq!(parsed.allocation.conflict_retries, 8);
        assert_eq!(parsed.database.seed_events, 3);
        assert_eq!(parsed.logging.format, LogFormat::Json);
    }
}
