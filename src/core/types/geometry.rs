//! Tile coordinates shared by the snapshot, planner and controller

use serde::{Deserialize, Serialize};
use std::fmt;

/// A world position including floor level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Waypoint {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Waypoint {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Waypoint { x, y, z }
    }

    /// Projection onto the planning grid
    pub const fn tile(&self) -> Tile {
        Tile::new(self.x, self.y)
    }

    pub const fn same_floor(&self, other: &Waypoint) -> bool {
        self.z == other.z
    }
}

impl fmt::Display for Waypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// A cell on a single floor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Tile {
    pub x: i32,
    pub y: i32,
}

impl Tile {
    pub const fn new(x: i32, y: i32) -> Self {
        Tile { x, y }
    }

    /// Chebyshev distance, the cost of walking with diagonal moves
    pub fn chebyshev(&self, other: &Tile) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx.max(dy)
    }

    /// Neighbouring tile; coordinates saturate at the grid edge
    pub fn offset(&self, step: Step) -> Tile {
        Tile::new(self.x.saturating_add(step.dx), self.y.saturating_add(step.dy))
    }

    /// Neighbouring tile, or `None` past the grid edge
    pub fn checked_offset(&self, step: Step) -> Option<Tile> {
        Some(Tile::new(
            self.x.checked_add(step.dx)?,
            self.y.checked_add(step.dy)?,
        ))
    }

    /// Lifts the tile back onto a floor
    pub const fn on_floor(&self, z: i32) -> Waypoint {
        Waypoint::new(self.x, self.y, z)
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One move, each component in -1..=1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Step {
    pub dx: i32,
    pub dy: i32,
}

impl Step {
    pub const fn new(dx: i32, dy: i32) -> Self {
        Step { dx, dy }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chebyshev() {
        let origin = Tile::new(0, 0);
        assert_eq!(origin.chebyshev(&Tile::new(3, -1)), 3);
        assert_eq!(origin.chebyshev(&Tile::new(-2, 5)), 5);
        assert_eq!(origin.chebyshev(&origin), 0);
    }

    #[test]
    fn test_offset_and_floor() {
        let tile = Tile::new(4, 4).offset(Step::new(-1, 1));
        assert_eq!(tile, Tile::new(3, 5));
        assert_eq!(tile.on_floor(7), Waypoint::new(3, 5, 7));
        assert_eq!(Waypoint::new(3, 5, 7).tile(), tile);
    }

    #[test]
    fn test_offset_at_grid_edge() {
        let edge = Tile::new(i32::MAX, 0);
        assert_eq!(edge.checked_offset(Step::new(1, 0)), None);
        assert_eq!(edge.checked_offset(Step::new(-1, 1)), Some(Tile::new(i32::MAX - 1, 1)));
        assert_eq!(edge.offset(Step::new(1, 0)), edge);
    }

    #[test]
    fn test_display() {
        assert_eq!(Waypoint::new(1, -2, 7).to_string(), "(1, -2, 7)");
        assert_eq!(Tile::new(1, 2).to_string(), "(1, 2)");
    }
}
