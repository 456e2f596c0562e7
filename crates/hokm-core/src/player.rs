//! Players, seats and scoring sides.
//!
//! Every mode is modelled as two sides. In 2-player mode each side is a single
//! seat; in 4-player mode partners sit opposite each other, so seats 0 and 2
//! form side A and seats 1 and 3 form side B.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Seat index at the table, assigned in join order starting at 0
pub type Seat = u8;

/// Opaque player identifier supplied by the adapter (e.g. a chat user id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for PlayerId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// A seated player. Immutable once joined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub seat: Seat,
}

impl Player {
    pub fn new(id: PlayerId, name: String, seat: Seat) -> Self {
        Self { id, name, seat }
    }
}

/// Table size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    TwoPlayer,
    FourPlayer,
}

impl Mode {
    /// Number of seats at the table
    pub fn capacity(&self) -> usize {
        match self {
            Mode::TwoPlayer => 2,
            Mode::FourPlayer => 4,
        }
    }

    /// The side a seat scores for
    pub fn side_of(&self, seat: Seat) -> Side {
        if seat % 2 == 0 {
            Side::A
        } else {
            Side::B
        }
    }

    /// Seat that plays after `seat`
    pub fn next_seat(&self, seat: Seat) -> Seat {
        (seat + 1) % self.capacity() as Seat
    }
}

/// A scoring unit: one player in 2-player mode, a partnership in 4-player mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::A, Side::B];

    pub fn index(&self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }

    pub fn opponent(&self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => f.write_str("A"),
            Side::B => f.write_str("B"),
        }
    }
}

/// A counter per side, used for both trick and round wins
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideScore {
    pub a: u8,
    pub b: u8,
}

impl SideScore {
    pub fn get(&self, side: Side) -> u8 {
        match side {
            Side::A => self.a,
            Side::B => self.b,
        }
    }

    /// Add one to a side and return its new total
    pub fn increment(&mut self, side: Side) -> u8 {
        let slot = match side {
            Side::A => &mut self.a,
            Side::B => &mut self.b,
        };
        *slot += 1;
        *slot
    }

    /// The first side to have reached `target`, if any
    pub fn reached(&self, target: u8) -> Option<Side> {
        Side::BOTH.into_iter().find(|&side| self.get(side) >= target)
    }
}
