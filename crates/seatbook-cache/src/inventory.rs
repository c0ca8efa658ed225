//! Pools of currently-unreserved seats, one per (event, rank).
//!
//! Each pool is a mutex-guarded FIFO paired with a membership set. The
//! mutex is only held for the pop or push itself, never across I/O, and
//! pools for different keys never share a lock.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use seatbook_core::error::AppError;
use seatbook_core::result::AppResult;
use seatbook_core::types::{EventId, SeatId};
use seatbook_entity::seat::{Seat, SeatRank};

#[derive(Debug, Default)]
struct PoolState {
    /// Seats in hand-out order.
    queue: VecDeque<Seat>,
    /// IDs of the seats currently in `queue`.
    available: HashSet<SeatId>,
    /// IDs of every seat the pool was initialized with.
    members: HashSet<SeatId>,
}

#[derive(Debug, Default)]
struct SeatPool {
    state: Mutex<PoolState>,
}

/// Per (event, rank) pools of seats that no active reservation holds.
#[derive(Debug, Default)]
pub struct SeatInventory {
    pools: DashMap<(EventId, SeatRank), Arc<SeatPool>>,
}

impl SeatInventory {
    /// Create an inventory with no pools.
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate (or replace) the pool for one (event, rank) with every seat
    /// in `seats` of that rank.
    ///
    /// Intended for startup and event registration; callers must not race
    /// it against `take`/`release` on the same key.
    pub fn initialize(&self, event_id: EventId, rank: SeatRank, seats: Vec<Seat>) {
        self.initialize_excluding(event_id, rank, seats, &HashSet::new());
    }

    /// Like [`initialize`](Self::initialize), but seats in `held` start out
    /// taken.
    ///
    /// Every seat of the rank in `catalogue`, held or not, may later be
    /// released into the pool; any other seat is rejected.
    pub fn initialize_excluding(
        &self,
        event_id: EventId,
        rank: SeatRank,
        catalogue: Vec<Seat>,
        held: &HashSet<SeatId>,
    ) {
        let mut state = PoolState::default();
        for seat in catalogue.into_iter().filter(|s| s.rank == rank) {
            if state.members.insert(seat.id) && !held.contains(&seat.id) {
                state.available.insert(seat.id);
                state.queue.push_back(seat);
            }
        }

        debug!(
            event_id = %event_id,
            rank = %rank,
            available = state.queue.len(),
            held = state.members.len() - state.queue.len(),
            "Seat pool initialized"
        );

        self.pools.insert(
            (event_id, rank),
            Arc::new(SeatPool {
                state: Mutex::new(state),
            }),
        );
    }

    /// Remove and return the next free seat, or `None` when sold out.
    ///
    /// A pool that was never initialized behaves as sold out.
    pub async fn take(&self, event_id: EventId, rank: SeatRank) -> Option<Seat> {
        let pool = self.pool(event_id, rank)?;
        let mut state = pool.state.lock().await;
        let seat = state.queue.pop_front()?;
        state.available.remove(&seat.id);
        Some(seat)
    }

    /// Return a previously taken seat to its pool.
    ///
    /// Returns `Ok(true)` when the seat re-entered the pool and `Ok(false)`
    /// when it was already available (a duplicate release, ignored).
    pub async fn release(&self, event_id: EventId, rank: SeatRank, seat: Seat) -> AppResult<bool> {
        if seat.rank != rank {
            return Err(AppError::validation(format!(
                "Seat {} has rank {}, cannot release into pool {rank}",
                seat.id, seat.rank
            )));
        }
        let pool = self.pool(event_id, rank).ok_or_else(|| {
            AppError::validation(format!(
                "No seat pool for event {event_id} rank {rank}"
            ))
        })?;

        let mut state = pool.state.lock().await;
        if !state.members.contains(&seat.id) {
            return Err(AppError::validation(format!(
                "Seat {} does not belong to pool for event {event_id} rank {rank}",
                seat.id
            )));
        }
        if !state.available.insert(seat.id) {
            warn!(
                event_id = %event_id,
                seat_id = %seat.id,
                "Ignoring release of a seat that is already available"
            );
            return Ok(false);
        }
        state.queue.push_back(seat);
        Ok(true)
    }

    /// Number of free seats in one pool.
    pub async fn remaining(&self, event_id: EventId, rank: SeatRank) -> usize {
        match self.pool(event_id, rank) {
            Some(pool) => pool.state.lock().await.queue.len(),
            None => 0,
        }
    }

    /// Whether `seat` is currently in its pool for `event_id`.
    pub async fn is_available(&self, event_id: EventId, seat: &Seat) -> bool {
        match self.pool(event_id, seat.rank) {
            Some(pool) => pool.state.lock().await.available.contains(&seat.id),
            None => false,
        }
    }

    /// Whether a pool exists for (event, rank).
    pub fn tracks(&self, event_id: EventId, rank: SeatRank) -> bool {
        self.pools.contains_key(&(event_id, rank))
    }

    /// Free-seat counts for every initialized rank of an event.
    pub async fn snapshot(&self, event_id: EventId) -> BTreeMap<SeatRank, usize> {
        let mut counts = BTreeMap::new();
        for rank in SeatRank::ALL {
            if let Some(pool) = self.pool(event_id, rank) {
                counts.insert(rank, pool.state.lock().await.queue.len());
            }
        }
        counts
    }

    /// Clone the pool handle so the map shard lock is released before awaiting.
    fn pool(&self, event_id: EventId, rank: SeatRank) -> Option<Arc<SeatPool>> {
        self.pools.get(&(event_id, rank)).map(|p| Arc::clone(p.value()))
    }
}
