//! Direction index and compass direction types.

use std::fmt;

/// One of the two canonical travel directions of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// Direction index 0.
    Outbound,
    /// Direction index 1.
    Inbound,
}

impl Direction {
    /// Both directions, in index order.
    pub const ALL: [Direction; 2] = [Direction::Outbound, Direction::Inbound];

    /// Convert a feed `direction_id` flag. Only 0 and 1 are valid.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Direction::Outbound),
            1 => Some(Direction::Inbound),
            _ => None,
        }
    }

    /// The numeric direction index (0 or 1).
    pub fn index(self) -> u8 {
        match self {
            Direction::Outbound => 0,
            Direction::Inbound => 1,
        }
    }

    /// The other direction.
    pub fn opposite(self) -> Self {
        match self {
            Direction::Outbound => Direction::Inbound,
            Direction::Inbound => Direction::Outbound,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// A compass heading used as a direction label when a route has no named termini.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compass {
    North,
    South,
    East,
    West,
}

impl Compass {
    /// The label shown to riders.
    pub fn label(self) -> &'static str {
        match self {
            Compass::North => "North",
            Compass::South => "South",
            Compass::East => "East",
            Compass::West => "West",
        }
    }
}

impl fmt::Display for Compass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
