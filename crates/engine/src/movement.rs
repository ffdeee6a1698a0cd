//! Movement validation: one orthogonal step at a time, checked against world
//! bounds and terrain walkability.
//!
//! This check is authoritative. It runs on every path that changes a position
//! (direct steps and save-position requests), not only in the rendering
//! client, so an illegal save state can never be written.

use crate::world::{Coord, Region};
use serde::{Deserialize, Serialize};

/// The four legal step directions. Diagonals and multi-cell jumps are
/// unrepresentable on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delta {
    North,
    South,
    East,
    West,
}

impl Delta {
    /// `y` grows downward, so north is -1.
    pub fn dx(self) -> i64 {
        match self {
            Delta::East => 1,
            Delta::West => -1,
            _ => 0,
        }
    }

    pub fn dy(self) -> i64 {
        match self {
            Delta::South => 1,
            Delta::North => -1,
            _ => 0,
        }
    }

    /// Map a raw (dx, dy) pair onto a direction; anything that is not an
    /// orthogonal unit vector is rejected.
    pub fn from_step(dx: i64, dy: i64) -> Option<Delta> {
        match (dx, dy) {
            (0, -1) => Some(Delta::North),
            (0, 1) => Some(Delta::South),
            (1, 0) => Some(Delta::East),
            (-1, 0) => Some(Delta::West),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved(Coord),
    RejectedOutOfBounds,
    RejectedBlocked,
}

/// Walkability hook. Every symbol is currently walkable; terrain-blocking
/// rules (deep water, cliffs) plug in here.
pub fn is_walkable(_symbol: char) -> bool {
    true
}

pub fn validate_move(pos: Coord, delta: Delta, region: &Region) -> MoveOutcome {
    let nx = pos.x + delta.dx();
    let ny = pos.y + delta.dy();

    if !region.in_bounds(nx, ny) {
        return MoveOutcome::RejectedOutOfBounds;
    }
    if !is_walkable(region.symbol_at(nx, ny)) {
        return MoveOutcome::RejectedBlocked;
    }
    MoveOutcome::Moved(Coord::new(nx, ny))
}
