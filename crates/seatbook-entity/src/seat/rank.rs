//! Seat rank enumeration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use seatbook_core::error::AppError;

/// Named seating tier, each with its own price and inventory pool.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "seat_rank")]
pub enum SeatRank {
    /// Premium tier.
    S,
    /// First tier.
    A,
    /// Second tier.
    B,
    /// Third tier.
    C,
}

impl SeatRank {
    /// All ranks, most expensive first.
    pub const ALL: [SeatRank; 4] = [Self::S, Self::A, Self::B, Self::C];

    /// The rank's single-letter name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S => "S",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        }
    }
}

impl fmt::Display for SeatRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeatRank {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "S" => Ok(Self::S),
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            "C" => Ok(Self::C),
            other => Err(AppError::validation(format!("Unknown seat rank: '{other}'"))
                .with_code("invalid_rank")),
        }
    }
}
