//! Target engagement: the state machine, its collaborators and the
//! coordination primitives it shares with other movement producers

pub mod collaborators;
pub mod controller;
pub mod dry_run;
pub mod handle;
pub mod ownership;
pub mod pacing;
pub mod profile;
pub mod shutdown;

pub use collaborators::{
    pick_click_point, AcquireMode, Actions, Collaborators, InteractMode, LootLauncher, LootTask,
    Movement, RecognizedText, ScreenRegion, TargetSelector, ThreadLootTask,
};
pub use controller::{EngagementController, TickOutcome};
pub use dry_run::dry_run_collaborators;
pub use handle::EngagementHandle;
pub use ownership::{OwnerId, WalkingOwnership};
pub use pacing::{DelayRange, JitterPacer, Pacer};
pub use profile::{
    load_profiles_json, match_profile, parse_profiles_json, LiveSettings, LootMode, LootTable,
    SharedSettings, Stance, TargetProfile, WILDCARD,
};
pub use shutdown::ShutdownSignal;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the controller is in an engagement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementState {
    #[default]
    NoTarget,
    Pursuing,
    InRange,
    Looting,
    Skinning,
}

impl fmt::Display for EngagementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngagementState::NoTarget => "no-target",
            EngagementState::Pursuing => "pursuing",
            EngagementState::InRange => "in-range",
            EngagementState::Looting => "looting",
            EngagementState::Skinning => "skinning",
        };
        f.write_str(name)
    }
}
