//! Cancellation scenarios.

mod helpers;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use tokio::task::JoinSet;

use seatbook_cache::{ReservationCache, ReservationIndex};
use seatbook_core::config::AllocationStrategy;
use seatbook_core::error::ErrorKind;
use seatbook_core::types::{EventId, ReservationId, SeatId, UserId};
use seatbook_database::store::ReservationStore;
use seatbook_entity::seat::SeatRank;
use seatbook_service::ReservationEngine;

use helpers::*;

async fn remaining(engine: &ReservationEngine, rank: SeatRank) -> usize {
    engine
        .pool_status(OPEN_EVENT)
        .await
        .unwrap()
        .get(&rank)
        .copied()
        .unwrap_or(0)
}

#[tokio::test]
async fn test_allocate_then_cancel_restores_pool() {
    for strategy in [AllocationStrategy::Pool, AllocationStrategy::Optimistic] {
        let engine = engine(strategy).await;
        let before = remaining(&engine, SeatRank::S).await;

        let allocation = engine
            .allocator()
            .allocate(OPEN_EVENT, SeatRank::S, UserId(1))
            .await
            .unwrap();
        assert_eq!(remaining(&engine, SeatRank::S).await, before - 1);

        let canceled = engine
            .cancellation()
            .cancel(OPEN_EVENT, allocation.seat.id, UserId(1))
            .await
            .unwrap();

        assert_eq!(canceled.id, allocation.reservation_id);
        assert!(canceled.canceled_at.is_some());
        assert_eq!(remaining(&engine, SeatRank::S).await, before);
        assert_eq!(engine.cache().len(OPEN_EVENT).await.unwrap(), 0);
        assert_eq!(engine.canceled_count().await, 1);
    }
}

#[tokio::test]
async fn test_ownership_and_reuse_of_released_seat() {
    let engine = engine(AllocationStrategy::Pool).await;
    let (u1, u2, u3) = (UserId(1), UserId(2), UserId(3));

    let x = engine
        .allocator()
        .allocate(OTHER_OPEN_EVENT, SeatRank::A, u1)
        .await
        .unwrap()
        .seat;

    let err = engine
        .cancellation()
        .cancel(OTHER_OPEN_EVENT, x.id, u2)
        .await
        .expect_err("u2 does not hold seat x");
    assert_eq!(err.kind, ErrorKind::Authorization);
    assert_eq!(err.code(), "not_permitted");

    let other = engine
        .allocator()
        .allocate(OTHER_OPEN_EVENT, SeatRank::A, u2)
        .await
        .unwrap()
        .seat;
    assert_ne!(other.id, x.id);

    let err = engine
        .allocator()
        .allocate(OTHER_OPEN_EVENT, SeatRank::A, u3)
        .await
        .expect_err("both A seats are out");
    assert_eq!(err.code(), "sold_out");

    engine
        .cancellation()
        .cancel(OTHER_OPEN_EVENT, x.id, u1)
        .await
        .unwrap();

    let reused = engine
        .allocator()
        .allocate(OTHER_OPEN_EVENT, SeatRank::A, u3)
        .await
        .unwrap()
        .seat;
    assert_eq!(reused.id, x.id);
}

#[tokio::test]
async fn test_second_cancel_is_not_reserved_and_changes_nothing() {
    let engine = engine(AllocationStrategy::Pool).await;
    let allocation = engine
        .allocator()
        .allocate(OPEN_EVENT, SeatRank::C, UserId(5))
        .await
        .unwrap();

    engine
        .cancellation()
        .cancel(OPEN_EVENT, allocation.seat.id, UserId(5))
        .await
        .unwrap();
    let after_first = remaining(&engine, SeatRank::C).await;

    let err = engine
        .cancellation()
        .cancel(OPEN_EVENT, allocation.seat.id, UserId(5))
        .await
        .expect_err("already canceled");
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(err.code(), "not_reserved");

    assert_eq!(remaining(&engine, SeatRank::C).await, after_first);
    assert_eq!(engine.canceled_count().await, 1);
}

#[tokio::test]
async fn test_unknown_or_free_seat() {
    let engine = engine(AllocationStrategy::Pool).await;

    let err = engine
        .cancellation()
        .cancel(OPEN_EVENT, SeatId(999), UserId(1))
        .await
        .expect_err("no such seat");
    assert_eq!(err.code(), "invalid_seat");

    let err = engine
        .cancellation()
        .cancel(OPEN_EVENT, SeatId(1), UserId(1))
        .await
        .expect_err("seat is free");
    assert_eq!(err.code(), "not_reserved");

    let err = engine
        .cancellation()
        .cancel_by_number(OPEN_EVENT, SeatRank::S, 99, UserId(1))
        .await
        .expect_err("no S-99");
    assert_eq!(err.code(), "invalid_seat");
}

#[tokio::test]
async fn test_cancel_by_number() {
    let engine = engine(AllocationStrategy::Pool).await;
    let allocation = engine
        .allocator()
        .allocate(OPEN_EVENT, SeatRank::A, UserId(8))
        .await
        .unwrap();

    let canceled = engine
        .cancellation()
        .cancel_by_number(OPEN_EVENT, SeatRank::A, allocation.seat.num, UserId(8))
        .await
        .unwrap();
    assert_eq!(canceled.seat_id, allocation.seat.id);
}

#[tokio::test]
async fn test_store_failure_leaves_reservation_active() {
    let store = Arc::new(FlakyStore::new(memory_store()));
    let engine = engine_with(&config(AllocationStrategy::Pool), store.clone()).await;
    let allocation = engine
        .allocator()
        .allocate(OPEN_EVENT, SeatRank::S, UserId(1))
        .await
        .unwrap();

    store.fail_cancels(true);
    let err = engine
        .cancellation()
        .cancel(OPEN_EVENT, allocation.seat.id, UserId(1))
        .await
        .expect_err("store is down");
    assert_eq!(err.kind, ErrorKind::ServiceUnavailable);

    assert!(
        engine
            .cache()
            .find_active_for_seat(OPEN_EVENT, allocation.seat.id)
            .await
            .unwrap()
            .is_some()
    );
    assert_eq!(remaining(&engine, SeatRank::S).await, 2);
    assert_eq!(engine.canceled_count().await, 0);

    store.fail_cancels(false);
    engine
        .cancellation()
        .cancel(OPEN_EVENT, allocation.seat.id, UserId(1))
        .await
        .unwrap();
    assert_eq!(remaining(&engine, SeatRank::S).await, 3);
    assert_eq!(store.inner().scan_canceled_reservations().await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicate_cancels_release_once() {
    let engine = engine(AllocationStrategy::Pool).await;
    let allocation = engine
        .allocator()
        .allocate(OPEN_EVENT, SeatRank::S, UserId(1))
        .await
        .unwrap();

    let mut tasks = JoinSet::new();
    for _ in 0..8 {
        let engine = engine.clone();
        let seat_id = allocation.seat.id;
        tasks.spawn(async move {
            engine
                .cancellation()
                .cancel(OPEN_EVENT, seat_id, UserId(1))
                .await
        });
    }

    let mut succeeded = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined.unwrap() {
            Ok(_) => succeeded += 1,
            Err(e) => assert_eq!(e.code(), "not_reserved"),
        }
    }

    assert_eq!(succeeded, 1);
    assert_eq!(remaining(&engine, SeatRank::S).await, 3);
    assert_eq!(engine.canceled_count().await, 1);
}

#[tokio::test]
async fn test_hidden_or_unknown_event_is_invalid_event() {
    let engine = engine(AllocationStrategy::Pool).await;

    for event_id in [HIDDEN_EVENT, EventId(999)] {
        let err = engine
            .cancellation()
            .cancel(event_id, SeatId(1), UserId(1))
            .await
            .expect_err("event is not visible");
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(err.code(), "invalid_event");
    }

    let err = engine
        .cancellation()
        .cancel_by_number(HIDDEN_EVENT, SeatRank::S, 1, UserId(1))
        .await
        .expect_err("event is not visible");
    assert_eq!(err.code(), "invalid_event");
}

#[tokio::test]
async fn test_reservation_on_closed_event_can_be_canceled() {
    let store = Arc::new(memory_store());
    store
        .insert_reservation(&active(70, CLOSED_EVENT, 4, 2, Utc::now()))
        .await
        .unwrap();
    let engine = engine_with(&config(AllocationStrategy::Pool), store).await;

    let canceled = engine
        .cancellation()
        .cancel(CLOSED_EVENT, SeatId(4), UserId(2))
        .await
        .unwrap();

    assert_eq!(canceled.id, ReservationId(70));
    assert_eq!(
        engine.pool_status(CLOSED_EVENT).await.unwrap().get(&SeatRank::A),
        Some(&2)
    );
}

#[tokio::test]
async fn test_retry_completes_cancel_after_eviction_failure() {
    let index = Arc::new(FlakyIndex::default());
    let store = Arc::new(memory_store());
    let engine = engine_with_cache(
        &config(AllocationStrategy::Pool),
        store.clone(),
        ReservationCache::from_index(index.clone()),
    )
    .await;
    let allocation = engine
        .allocator()
        .allocate(OPEN_EVENT, SeatRank::S, UserId(1))
        .await
        .unwrap();

    index.fail_deletes(true);
    let err = engine
        .cancellation()
        .cancel(OPEN_EVENT, allocation.seat.id, UserId(1))
        .await
        .expect_err("cache refuses the eviction");
    assert_eq!(err.code(), "internal");
    assert_eq!(store.scan_canceled_reservations().await.unwrap().len(), 1);
    assert_eq!(engine.cache().len(OPEN_EVENT).await.unwrap(), 1);
    assert_eq!(remaining(&engine, SeatRank::S).await, 2);
    assert_eq!(engine.canceled_count().await, 0);

    index.fail_deletes(false);
    let canceled = engine
        .cancellation()
        .cancel(OPEN_EVENT, allocation.seat.id, UserId(1))
        .await
        .expect("retry finishes the cancellation");
    assert_eq!(canceled.id, allocation.reservation_id);
    assert_eq!(engine.cache().len(OPEN_EVENT).await.unwrap(), 0);
    assert_eq!(remaining(&engine, SeatRank::S).await, 3);
    assert_eq!(engine.canceled_count().await, 1);

    let err = engine
        .cancellation()
        .cancel(OPEN_EVENT, allocation.seat.id, UserId(1))
        .await
        .expect_err("nothing left to cancel");
    assert_eq!(err.code(), "not_reserved");
}

#[tokio::test]
async fn test_canceled_at_matches_store_precision() {
    let store = Arc::new(memory_store());
    let engine = engine_with(&config(AllocationStrategy::Pool), store.clone()).await;
    let allocation = engine
        .allocator()
        .allocate(OPEN_EVENT, SeatRank::C, UserId(3))
        .await
        .unwrap();

    let canceled = engine
        .cancellation()
        .cancel(OPEN_EVENT, allocation.seat.id, UserId(3))
        .await
        .unwrap();

    let canceled_at = canceled.canceled_at.expect("canceled");
    assert_eq!(canceled_at.timestamp_subsec_nanos() % 1_000, 0);
    let stored = store.scan_canceled_reservations().await.unwrap();
    assert_eq!(stored[0].canceled_at, Some(canceled_at));
}

/// Lists the cache, checks each listed seat against the pool, and re-reads the
/// shard version. An unchanged version means the listing held for the whole
/// check, so any listed seat reported available is a real overlap.
async fn listed_and_available(engine: &ReservationEngine) -> Option<Vec<SeatId>> {
    let inventory = engine.inventory().expect("pool strategy");
    let before = engine.cache().snapshot(OPEN_EVENT).await.unwrap();

    let mut overlap = Vec::new();
    for reservation in &before.reservations {
        let seat = engine.catalogue().get(reservation.seat_id).unwrap();
        if inventory.is_available(OPEN_EVENT, seat).await {
            overlap.push(seat.id);
        }
    }

    let after = engine.cache().snapshot(OPEN_EVENT).await.unwrap();
    (after.version == before.version).then_some(overlap)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cached_seat_is_never_available_under_churn() {
    let engine = engine(AllocationStrategy::Pool).await;
    let stop = Arc::new(AtomicBool::new(false));

    let checker = {
        let engine = engine.clone();
        let stop = Arc::clone(&stop);
        tokio::spawn(async move {
            let mut checks = 0u32;
            loop {
                let finished = stop.load(Ordering::SeqCst);
                if let Some(overlap) = listed_and_available(&engine).await {
                    assert!(overlap.is_empty(), "seats both cached and free: {overlap:?}");
                    checks += 1;
                }
                if finished {
                    return checks;
                }
                tokio::task::yield_now().await;
            }
        })
    };

    let mut workers = JoinSet::new();
    for user in 1..=4 {
        let engine = engine.clone();
        workers.spawn(async move {
            for _ in 0..100 {
                match engine
                    .allocator()
                    .allocate(OPEN_EVENT, SeatRank::S, UserId(user))
                    .await
                {
                    Ok(allocation) => {
                        engine
                            .cancellation()
                            .cancel(OPEN_EVENT, allocation.seat.id, UserId(user))
                            .await
                            .expect("holder cancels");
                    }
                    Err(e) => assert_eq!(e.code(), "sold_out"),
                }
                tokio::task::yield_now().await;
            }
        });
    }
    while let Some(joined) = workers.join_next().await {
        joined.expect("worker panicked");
    }
    stop.store(true, Ordering::SeqCst);

    let checks = checker.await.expect("checker panicked");
    assert!(checks > 0);
    assert_eq!(remaining(&engine, SeatRank::S).await, 3);
    assert_eq!(engine.cache().len(OPEN_EVENT).await.unwrap(), 0);
}
