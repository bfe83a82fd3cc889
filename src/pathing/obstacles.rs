//! Blacklisted and learned impassable tiles

use crate::core::types::{Tile, Waypoint};
use std::collections::HashSet;

/// Obstacles the planner must avoid.
///
/// The blacklist persists for the life of the controller; learned tiles only
/// for the current engagement.
#[derive(Debug, Clone, Default)]
pub struct ObstacleSet {
    blacklist: HashSet<Waypoint>,
    learned: HashSet<Tile>,
}

impl ObstacleSet {
    pub fn new(blacklist: impl IntoIterator<Item = Waypoint>) -> Self {
        ObstacleSet {
            blacklist: blacklist.into_iter().collect(),
            learned: HashSet::new(),
        }
    }

    /// Blacklist tiles on floor `z` plus everything learned so far
    pub fn for_level(&self, z: i32) -> HashSet<Tile> {
        self.blacklist
            .iter()
            .filter(|w| w.z == z)
            .map(Waypoint::tile)
            .chain(self.learned.iter().copied())
            .collect()
    }

    /// Records a tile that could not be entered; true if it was new
    pub fn learn(&mut self, tile: Tile) -> bool {
        self.learned.insert(tile)
    }

    /// Forgets learned tiles, returning how many were dropped
    pub fn clear_learned(&mut self) -> usize {
        let count = self.learned.len();
        self.learned.clear();
        count
    }

    pub fn learned(&self) -> &HashSet<Tile> {
        &self.learned
    }
}
