//! hunt-core: memory-driven target engagement
//!
//! Typed reads of a running game client, an address-space scanner for
//! entities without a stable pointer chain, a tile A* planner that learns
//! obstacles from failed moves, and the engagement state machine that ties
//! them to movement, attack and looting collaborators.

pub mod config;
pub mod core;
pub mod engage;
pub mod game;
pub mod memory;
pub mod pathing;
pub mod process;
#[cfg(windows)]
pub mod windows;

// Re-export main types from core module
pub use crate::core::types::{
    Address, Architecture, HuntError, HuntResult, ProcessId, Step, Tile, Value, ValueKind,
    Waypoint,
};

pub use engage::{EngagementController, EngagementHandle, EngagementState, WalkingOwnership};
pub use game::{GameState, GameStateSnapshot};
pub use memory::{AddressSpace, MemoryScanner, PointerChain, TypedMemoryReader};
pub use pathing::{ObstacleSet, PathPlanner};

// Re-export core directly for full access
pub use crate::core::*;
