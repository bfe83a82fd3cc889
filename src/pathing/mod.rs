//! Tile pathfinding toward the current target

pub mod obstacles;
pub mod planner;

pub use obstacles::ObstacleSet;
pub use planner::{PathPlanner, DEFAULT_NODE_BUDGET, DEFAULT_SEARCH_RADIUS, DIRECTIONS};
