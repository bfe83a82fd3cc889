//! Game-state reads built on the memory layer

pub mod addresses;
pub mod snapshot;

pub use addresses::{AddressMap, FieldLocation, ValueLocation, VitalsLocations};
pub use snapshot::GameStateSnapshot;

use crate::core::types::Waypoint;
use serde::{Deserialize, Serialize};

/// The attacked entity as last read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetInfo {
    pub id: u32,
    pub position: Waypoint,
    pub name: String,
    pub hp: Option<i64>,
}

/// Player hit and mana points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vitals {
    pub hp: i64,
    pub hp_max: i64,
    pub mp: i64,
    pub mp_max: i64,
}

/// Reads the engagement loop depends on.
///
/// `None` always means "data unavailable this tick"; `Some(0)` from
/// [`GameState::target_id`] means nothing is targeted.
pub trait GameState: Send {
    fn target_id(&mut self) -> Option<u32>;

    fn target_info(&mut self) -> Option<TargetInfo>;

    fn my_position(&mut self) -> Option<Waypoint>;

    fn my_vitals(&mut self) -> Option<Vitals> {
        None
    }

    /// Handle-validity check; false once the process is gone
    fn is_attached(&self) -> bool;
}
