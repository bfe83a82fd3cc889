//! Collaborators that log instead of touching input devices or the screen

use super::collaborators::{
    Actions, Collaborators, InteractMode, LootLauncher, LootTask, Movement, RecognizedText,
    ScreenRegion, TargetSelector, ThreadLootTask,
};
use super::profile::{LootMode, LootTable};
use crate::core::types::Waypoint;
use tracing::info;

pub struct DryRunMovement;

impl Movement for DryRunMovement {
    fn walk(&mut self, from: Waypoint, to: Waypoint) {
        info!(%from, %to, "walk");
    }
}

pub struct DryRunActions;

impl Actions for DryRunActions {
    fn press_action(&mut self, key: u32) {
        info!(key, "press");
    }

    fn interact_at(&mut self, x: i32, y: i32, mode: InteractMode) {
        info!(x, y, ?mode, "interact");
    }
}

/// Recognizes nothing, so battle-list acquisition never clicks
pub struct DryRunSelector;

impl TargetSelector for DryRunSelector {
    fn read_battle_list(&mut self, region: &ScreenRegion) -> Vec<RecognizedText> {
        info!(?region, "battle list capture skipped");
        Vec::new()
    }
}

pub struct DryRunLooter;

impl LootLauncher for DryRunLooter {
    fn launch(&mut self, table: &LootTable, mode: LootMode) -> Box<dyn LootTask> {
        let items = table.items().to_vec();
        Box::new(ThreadLootTask::spawn(move |_stop| {
            info!(?items, ?mode, "loot run");
        }))
    }
}

/// A full set of logging collaborators
pub fn dry_run_collaborators() -> Collaborators {
    Collaborators {
        movement: Box::new(DryRunMovement),
        actions: Box::new(DryRunActions),
        selector: Box::new(DryRunSelector),
        looter: Box::new(DryRunLooter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_run_loot_task_finishes() {
        let mut collaborators = dry_run_collaborators();
        let task = collaborators
            .looter
            .launch(&LootTable::new(["gold coin"]), LootMode::Collect);
        task.join();
        assert!(collaborators
            .selector
            .read_battle_list(&ScreenRegion::default())
            .is_empty());
    }
}
