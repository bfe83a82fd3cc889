//! Bounded A* over 8-connected tiles

use crate::core::types::{Step, Tile};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

/// Tiles searched beyond the start/goal bounding box
pub const DEFAULT_SEARCH_RADIUS: i32 = 10;

/// Expanded tiles per call before the goal counts as unreachable
pub const DEFAULT_NODE_BUDGET: usize = 4096;

/// Expansion order; orthogonal moves first
pub const DIRECTIONS: [Step; 8] = [
    Step::new(1, 0),
    Step::new(-1, 0),
    Step::new(0, 1),
    Step::new(0, -1),
    Step::new(1, 1),
    Step::new(1, -1),
    Step::new(-1, 1),
    Step::new(-1, -1),
];

/// Stateless single-step planner.
///
/// Every move costs 1 and the heuristic is Chebyshev distance. Frontier ties
/// break on the lower heuristic, then on insertion order, so identical inputs
/// always yield identical steps. The search box grows with the start/goal
/// distance, so the node budget is what bounds the work done per call.
#[derive(Debug, Clone, Copy)]
pub struct PathPlanner {
    search_radius: i32,
    node_budget: usize,
}

struct Bounds {
    min: Tile,
    max: Tile,
}

impl Bounds {
    fn around(start: Tile, goal: Tile, radius: i32) -> Self {
        Bounds {
            min: Tile::new(
                start.x.min(goal.x).saturating_sub(radius),
                start.y.min(goal.y).saturating_sub(radius),
            ),
            max: Tile::new(
                start.x.max(goal.x).saturating_add(radius),
                start.y.max(goal.y).saturating_add(radius),
            ),
        }
    }

    fn contains(&self, tile: Tile) -> bool {
        (self.min.x..=self.max.x).contains(&tile.x) && (self.min.y..=self.max.y).contains(&tile.y)
    }
}

impl PathPlanner {
    pub fn new(search_radius: i32) -> Self {
        PathPlanner {
            search_radius: search_radius.max(0),
            node_budget: DEFAULT_NODE_BUDGET,
        }
    }

    pub fn with_node_budget(mut self, budget: usize) -> Self {
        self.node_budget = budget.max(1);
        self
    }

    pub fn search_radius(&self) -> i32 {
        self.search_radius
    }

    pub fn node_budget(&self) -> usize {
        self.node_budget
    }

    /// First move of the cheapest path, or `None` when unreachable or already there
    pub fn find_step(&self, start: Tile, goal: Tile, obstacles: &HashSet<Tile>) -> Option<Step> {
        self.find_path(start, goal, obstacles)?.first().copied()
    }

    /// Every move from `start` to `goal`
    pub fn find_path(&self, start: Tile, goal: Tile, obstacles: &HashSet<Tile>) -> Option<Vec<Step>> {
        if start == goal || obstacles.contains(&goal) {
            return None;
        }

        let bounds = Bounds::around(start, goal, self.search_radius);
        let mut open = BinaryHeap::new();
        let mut g_score: HashMap<Tile, u32> = HashMap::new();
        let mut came_from: HashMap<Tile, Tile> = HashMap::new();
        let mut closed: HashSet<Tile> = HashSet::new();
        let mut sequence: u64 = 0;

        g_score.insert(start, 0);
        open.push(Reverse((start.chebyshev(&goal), start.chebyshev(&goal), sequence, start)));

        while let Some(Reverse((_, _, _, current))) = open.pop() {
            if current == goal {
                return Some(reconstruct(&came_from, start, goal));
            }
            if !closed.insert(current) {
                continue;
            }
            if closed.len() > self.node_budget {
                return None;
            }

            let g = g_score.get(&current).copied().unwrap_or(u32::MAX);
            for step in DIRECTIONS {
                let Some(next) = current.checked_offset(step) else {
                    continue;
                };
                if !bounds.contains(next) || obstacles.contains(&next) || closed.contains(&next) {
                    continue;
                }

                let tentative = g + 1;
                if tentative < g_score.get(&next).copied().unwrap_or(u32::MAX) {
                    g_score.insert(next, tentative);
                    came_from.insert(next, current);
                    let h = next.chebyshev(&goal);
                    sequence += 1;
                    open.push(Reverse((tentative + h, h, sequence, next)));
                }
            }
        }

        None
    }
}

impl Default for PathPlanner {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_RADIUS)
    }
}

fn reconstruct(came_from: &HashMap<Tile, Tile>, start: Tile, goal: Tile) -> Vec<Step> {
    let mut steps = Vec::new();
    let mut current = goal;
    while current != start {
        let Some(&previous) = came_from.get(&current) else {
            break;
        };
        steps.push(Step::new(current.x - previous.x, current.y - previous.y));
        current = previous;
    }
    steps.reverse();
    steps
}
