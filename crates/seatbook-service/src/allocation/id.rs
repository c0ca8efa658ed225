//! Process-wide reservation ID source.

use std::sync::atomic::{AtomicI64, Ordering};

use seatbook_core::types::ReservationId;

/// Strictly increasing reservation IDs, unique across concurrent callers.
#[derive(Debug)]
pub struct ReservationIdGenerator {
    last: AtomicI64,
}

impl ReservationIdGenerator {
    /// Create a generator whose first ID is `after + 1`.
    pub fn new(after: i64) -> Self {
        Self {
            last: AtomicI64::new(after),
        }
    }

    /// Seed from the store's highest ID, never starting below `floor`.
    pub fn seeded(max_seen: Option<ReservationId>, floor: i64) -> Self {
        Self::new(max_seen.map_or(floor, |id| id.get().max(floor)))
    }

    /// Issue the next ID.
    pub fn next(&self) -> ReservationId {
        ReservationId(self.last.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// The most recently issued ID (or the seed if none was issued yet).
    pub fn last(&self) -> ReservationId {
        ReservationId(self.last.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_seeding_respects_floor() {
        assert_eq!(ReservationIdGenerator::seeded(None, 100).next(), ReservationId(101));
        assert_eq!(
            ReservationIdGenerator::seeded(Some(ReservationId(50)), 100).next(),
            ReservationId(101)
        );
        assert_eq!(
            ReservationIdGenerator::seeded(Some(ReservationId(500)), 100).next(),
            ReservationId(501)
        );
    }

    #[test]
    fn test_ids_are_unique_across_threads() {
        let ids = Arc::new(ReservationIdGenerator::new(0));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ids = Arc::clone(&ids);
                std::thread::spawn(move || (0..1000).map(|_| ids.next()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id));
            }
        }
        assert_eq!(seen.len(), 8000);
        assert_eq!(ids.last(), ReservationId(8000));
    }
}
