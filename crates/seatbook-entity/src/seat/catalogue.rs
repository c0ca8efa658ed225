//! The static seat catalogue, indexed for the lookups the booking path needs.

use std::collections::HashMap;

use seatbook_core::types::SeatId;

use super::model::Seat;
use super::rank::SeatRank;

/// Immutable view over every seat in the venue.
///
/// Built once at startup and shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct SeatCatalogue {
    /// Seats ordered by ID.
    seats: Vec<Seat>,
    /// Seat ID to index into `seats`.
    by_id: HashMap<SeatId, usize>,
    /// (rank, number) to seat ID.
    by_number: HashMap<(SeatRank, i32), SeatId>,
}

impl SeatCatalogue {
    /// Build a catalogue from an unordered list of seats.
    pub fn new(mut seats: Vec<Seat>) -> Self {
        seats.sort_by_key(|s| s.id);
        seats.dedup_by_key(|s| s.id);

        let by_id = seats.iter().enumerate().map(|(i, s)| (s.id, i)).collect();
        let by_number = seats.iter().map(|s| ((s.rank, s.num), s.id)).collect();

        Self {
            seats,
            by_id,
            by_number,
        }
    }

    /// The venue's standard layout: S×50, A×150, B×300, C×500.
    pub fn standard() -> Self {
        let layout = [
            (SeatRank::S, 50, 5000),
            (SeatRank::A, 150, 3000),
            (SeatRank::B, 300, 1000),
            (SeatRank::C, 500, 0),
        ];

        let mut seats = Vec::with_capacity(1000);
        let mut next_id = 1;
        for (rank, count, price) in layout {
            for num in 1..=count {
                seats.push(Seat {
                    id: SeatId(next_id),
                    rank,
                    num,
                    price,
                });
                next_id += 1;
            }
        }
        Self::new(seats)
    }

    /// Look up a seat by ID.
    pub fn get(&self, id: SeatId) -> Option<&Seat> {
        self.by_id.get(&id).map(|&i| &self.seats[i])
    }

    /// Look up a seat by rank and number.
    pub fn find(&self, rank: SeatRank, num: i32) -> Option<&Seat> {
        self.by_number.get(&(rank, num)).and_then(|id| self.get(*id))
    }

    /// All seats of one rank, ordered by ID.
    pub fn of_rank(&self, rank: SeatRank) -> impl Iterator<Item = &Seat> {
        self.seats.iter().filter(move |s| s.rank == rank)
    }

    /// All seats, ordered by ID.
    pub fn iter(&self) -> impl Iterator<Item = &Seat> {
        self.seats.iter()
    }

    /// Total number of seats.
    pub fn len(&self) -> usize {
        self.seats.len()
    }

    /// Whether the catalogue is empty.
    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }
}
