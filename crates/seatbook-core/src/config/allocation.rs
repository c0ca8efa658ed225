//! Seat allocation configuration.

use serde::{Deserialize, Serialize};

/// Which allocation protocol grants seats.
///
/// The two strategies are alternatives; exactly one is active per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationStrategy {
    /// Pre-populated per-(event, rank) seat queues.
    #[default]
    Pool,
    /// Recompute free seats from the cache and commit with a version check.
    Optimistic,
}

/// Allocation behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationConfig {
    /// Active allocation strategy.
    #[serde(default)]
    pub strategy: AllocationStrategy,
    /// How many times a lost optimistic race is restarted before surfacing `Conflict`.
    #[serde(default = "default_conflict_retries")]
    pub conflict_retries: u32,
    /// Undo cache/pool mutations when the durable write fails.
    #[serde(default = "default_true")]
    pub compensate_store_failures: bool,
    /// Lowest reservation ID handed out, regardless of what the store holds.
    #[serde(default = "default_reservation_id_floor")]
    pub reservation_id_floor: i64,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            strategy: AllocationStrategy::default(),
            conflict_retries: default_conflict_retries(),
            compensate_store_failures: true,
            reservation_id_floor: default_reservation_id_floor(),
        }
    }
}

fn default_conflict_retries() -> u32 {
    8
}

fn default_true() -> bool {
    true
}

fn default_reservation_id_floor() -> i64 {
    10_000_000
}
