//! Construction and warm start of the booking core.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use tracing::{info, warn};

use seatbook_cache::{CanceledLedger, ReservationCache, ReservationIndex, SeatInventory};
use seatbook_core::config::{AllocationConfig, AllocationStrategy};
use seatbook_core::error::AppError;
use seatbook_core::result::AppResult;
use seatbook_core::types::{EventId, ReservationId, SeatId};
use seatbook_database::store::ReservationStore;
use seatbook_entity::event::Event;
use seatbook_entity::reservation::Reservation;
use seatbook_entity::seat::{SeatCatalogue, SeatRank};

use crate::allocation::{
    AllocationService, Allocator, OptimisticAllocationService, ReservationIdGenerator,
};
use crate::cancellation::CancellationService;
use crate::directory::EventDirectory;
use crate::report::SalesReportService;
use crate::seating::SeatMapService;

/// Reachability of the engine's backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineHealth {
    pub store: bool,
    pub cache: bool,
}

/// Owns the shared booking state and the services built on it.
///
/// Cloning is cheap; every clone shares the same state.
#[derive(Debug, Clone)]
pub struct ReservationEngine {
    store: Arc<dyn ReservationStore>,
    cache: ReservationCache,
    inventory: Option<Arc<SeatInventory>>,
    ledger: Arc<CanceledLedger>,
    catalogue: Arc<SeatCatalogue>,
    events: Arc<EventDirectory>,
    ids: Arc<ReservationIdGenerator>,
    allocator: Allocator,
    cancellation: CancellationService,
    sales: SalesReportService,
    seat_map: SeatMapService,
}

impl ReservationEngine {
    /// Load static data from `store`, warm-start `cache`, and build every
    /// service for the configured strategy.
    pub async fn bootstrap(
        config: &AllocationConfig,
        store: Arc<dyn ReservationStore>,
        cache: ReservationCache,
    ) -> AppResult<Self> {
        let catalogue = Arc::new(SeatCatalogue::new(store.scan_seat_catalogue().await?));
        if catalogue.is_empty() {
            warn!("Seat catalogue is empty; every allocation will be sold out");
        }
        let events = Arc::new(EventDirectory::new(store.list_events().await?));

        let active = store.scan_active_reservations().await?;
        cache.warm_start(active.clone()).await?;

        let ledger = Arc::new(CanceledLedger::new());
        ledger
            .warm_start(store.scan_canceled_reservations().await?)
            .await;

        let max_seen = store.max_reservation_id().await?;
        let ids = Arc::new(ReservationIdGenerator::seeded(
            max_seen,
            config.reservation_id_floor,
        ));

        let inventory = match config.strategy {
            AllocationStrategy::Pool => {
                let inventory = Arc::new(SeatInventory::new());
                let held = held_seats(&active, &catalogue, &events);
                for event in events.all() {
                    fill_pools(&inventory, &catalogue, event.id, held.get(&event.id));
                }
                Some(inventory)
            }
            AllocationStrategy::Optimistic => None,
        };

        let allocator = match &inventory {
            Some(inventory) => Allocator::pool(
                Arc::clone(&events),
                AllocationService::new(
                    Arc::clone(&store),
                    cache.clone(),
                    Arc::clone(inventory),
                    Arc::clone(&ids),
                    config.compensate_store_failures,
                ),
            ),
            None => Allocator::optimistic(
                Arc::clone(&events),
                OptimisticAllocationService::new(
                    Arc::clone(&store),
                    cache.clone(),
                    Arc::clone(&catalogue),
                    Arc::clone(&ids),
                    config.compensate_store_failures,
                ),
                config.conflict_retries,
            ),
        };

        let cancellation = CancellationService::new(
            Arc::clone(&store),
            cache.clone(),
            inventory.clone(),
            Arc::clone(&ledger),
            Arc::clone(&catalogue),
            Arc::clone(&events),
        );
        let sales = SalesReportService::new(
            cache.clone(),
            Arc::clone(&ledger),
            Arc::clone(&events),
            Arc::clone(&catalogue),
        );
        let seat_map =
            SeatMapService::new(cache.clone(), Arc::clone(&events), Arc::clone(&catalogue));

        info!(
            strategy = ?config.strategy,
            seats = catalogue.len(),
            events = events.len(),
            active_reservations = active.len(),
            canceled_reservations = ledger.len().await,
            next_reservation_id = %ids.last().get().saturating_add(1),
            "Reservation engine warm-started"
        );

        Ok(Self {
            store,
            cache,
            inventory,
            ledger,
            catalogue,
            events,
            ids,
            allocator,
            cancellation,
            sales,
            seat_map,
        })
    }

    /// Register an event created after warm start and open its pools.
    pub async fn open_event(&self, event: Event) -> AppResult<()> {
        let event_id = event.id;
        if !self.events.insert(event) {
            return Err(AppError::validation(format!(
                "Event {event_id} is already registered"
            )));
        }

        if let Some(inventory) = &self.inventory {
            let held: HashSet<SeatId> = self
                .cache
                .list(event_id)
                .await?
                .iter()
                .map(|r| r.seat_id)
                .collect();
            fill_pools(inventory, &self.catalogue, event_id, Some(&held));
        }

        info!(event_id = %event_id, "Event opened for sale");
        Ok(())
    }

    /// Free seats per rank for one event.
    pub async fn pool_status(&self, event_id: EventId) -> AppResult<BTreeMap<SeatRank, usize>> {
        self.events.require(event_id)?;

        if let Some(inventory) = &self.inventory {
            return Ok(inventory.snapshot(event_id).await);
        }

        let held: HashSet<SeatId> = self
            .cache
            .list(event_id)
            .await?
            .iter()
            .map(|r| r.seat_id)
            .collect();
        Ok(SeatRank::ALL
            .into_iter()
            .map(|rank| {
                let free = self
                    .catalogue
                    .of_rank(rank)
                    .filter(|s| !held.contains(&s.id))
                    .count();
                (rank, free)
            })
            .collect())
    }

    /// Ping the store and the cache. Failures count as unreachable.
    pub async fn health(&self) -> EngineHealth {
        EngineHealth {
            store: self.store.health_check().await.unwrap_or(false),
            cache: self.cache.health_check().await.unwrap_or(false),
        }
    }

    /// Seat allocation entry point.
    pub fn allocator(&self) -> &Allocator {
        &self.allocator
    }

    /// Cancellation entry point.
    pub fn cancellation(&self) -> &CancellationService {
        &self.cancellation
    }

    /// Sales extracts.
    pub fn sales(&self) -> &SalesReportService {
        &self.sales
    }

    /// Seat maps.
    pub fn seat_map(&self) -> &SeatMapService {
        &self.seat_map
    }

    /// Active strategy.
    pub fn strategy(&self) -> AllocationStrategy {
        self.allocator.strategy()
    }

    /// All registered events, ordered by ID.
    pub fn events(&self) -> Vec<Event> {
        self.events.all()
    }

    /// The seat catalogue.
    pub fn catalogue(&self) -> &SeatCatalogue {
        &self.catalogue
    }

    /// The reservation cache.
    pub fn cache(&self) -> &ReservationCache {
        &self.cache
    }

    /// Free-seat pools; `None` under the optimistic strategy.
    pub fn inventory(&self) -> Option<&SeatInventory> {
        self.inventory.as_deref()
    }

    /// Number of canceled reservations recorded for reporting.
    pub async fn canceled_count(&self) -> usize {
        self.ledger.len().await
    }

    /// The most recently issued reservation ID.
    pub fn last_reservation_id(&self) -> ReservationId {
        self.ids.last()
    }
}

/// Seats held by active reservations, per event.
///
/// Reservations that reference an unknown event or seat, or a seat already
/// held, indicate the store and catalogue have drifted apart; they are
/// logged and the seat stays out of the pool.
fn held_seats(
    active: &[Reservation],
    catalogue: &SeatCatalogue,
    events: &EventDirectory,
) -> HashMap<EventId, HashSet<SeatId>> {
    let mut held: HashMap<EventId, HashSet<SeatId>> = HashMap::new();
    for reservation in active {
        if events.get(reservation.event_id).is_none() || catalogue.get(reservation.seat_id).is_none()
        {
            warn!(
                reservation_id = %reservation.id,
                event_id = %reservation.event_id,
                seat_id = %reservation.seat_id,
                "Pool drift: active reservation references unknown event or seat"
            );
            continue;
        }
        if !held
            .entry(reservation.event_id)
            .or_default()
            .insert(reservation.seat_id)
        {
            warn!(
                reservation_id = %reservation.id,
                event_id = %reservation.event_id,
                seat_id = %reservation.seat_id,
                "Pool drift: seat held by more than one active reservation"
            );
        }
    }
    held
}

fn fill_pools(
    inventory: &SeatInventory,
    catalogue: &SeatCatalogue,
    event_id: EventId,
    held: Option<&HashSet<SeatId>>,
) {
    let none = HashSet::new();
    let held = held.unwrap_or(&none);
    for rank in SeatRank::ALL {
        let seats = catalogue.of_rank(rank).copied().collect();
        inventory.initialize_excluding(event_id, rank, seats, held);
    }
}
