//! Seams to the input, vision and looting backends the controller drives

use super::profile::{LootMode, LootTable, TargetProfile};
use super::shutdown::ShutdownSignal;
use crate::core::types::Waypoint;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::warn;

/// Issues one walk command; blocking
pub trait Movement: Send {
    fn walk(&mut self, from: Waypoint, to: Waypoint);
}

/// Mouse interaction kinds on a screen point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractMode {
    /// Open or use what is under the cursor (corpses)
    Use,
    /// Plain click (selection, applying a held tool)
    Click,
}

/// Keyboard and mouse actions; blocking
pub trait Actions: Send {
    fn press_action(&mut self, key: u32);

    fn interact_at(&mut self, x: i32, y: i32, mode: InteractMode);
}

/// A rectangle on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScreenRegion {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl ScreenRegion {
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// A word recognized in a captured region, box relative to the region origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizedText {
    pub text: String,
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

/// Captures and recognizes the battle list
pub trait TargetSelector: Send {
    fn read_battle_list(&mut self, region: &ScreenRegion) -> Vec<RecognizedText>;
}

/// How the controller attempts to acquire a target while idle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquireMode {
    /// Press the attack hotkey
    #[default]
    Hotkey,
    /// Click a recognized name in the battle list
    BattleList,
}

/// Screen point to click for the first recognized word matching a profile
pub fn pick_click_point(
    texts: &[RecognizedText],
    profiles: &[TargetProfile],
    region: &ScreenRegion,
    title_bar_offset: i32,
) -> Option<(i32, i32)> {
    texts
        .iter()
        .filter(|t| !t.text.trim().is_empty())
        .find(|t| profiles.iter().any(|p| p.matches_text(&t.text)))
        .map(|t| {
            (
                region.x + t.left + t.width / 2,
                region.y + t.top + t.height / 2 - title_bar_offset,
            )
        })
}

/// A looting run scoped to one corpse
pub trait LootTask: Send {
    /// Asks the task to finish early
    fn stop(&self);

    /// Blocks until the task has finished
    fn join(self: Box<Self>);

    fn is_finished(&self) -> bool;
}

/// Starts looting runs
pub trait LootLauncher: Send {
    fn launch(&mut self, table: &LootTable, mode: LootMode) -> Box<dyn LootTask>;
}

/// A [`LootTask`] running on its own thread, stopped through a shutdown signal
pub struct ThreadLootTask {
    stop: Arc<ShutdownSignal>,
    handle: Option<JoinHandle<()>>,
}

impl ThreadLootTask {
    /// Runs `body` on a new thread; `body` should return once the signal triggers
    pub fn spawn<F>(body: F) -> Self
    where
        F: FnOnce(Arc<ShutdownSignal>) + Send + 'static,
    {
        let stop = Arc::new(ShutdownSignal::new());
        let signal = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("loot".to_string())
            .spawn(move || body(signal));

        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(error = %e, "failed to spawn loot thread");
                None
            }
        };
        ThreadLootTask { stop, handle }
    }
}

impl LootTask for ThreadLootTask {
    fn stop(&self) {
        self.stop.trigger();
    }

    fn join(mut self: Box<Self>) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("loot thread panicked");
            }
        }
    }

    fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

/// The external collaborators one controller drives
pub struct Collaborators {
    pub movement: Box<dyn Movement>,
    pub actions: Box<dyn Actions>,
    pub selector: Box<dyn TargetSelector>,
    pub looter: Box<dyn LootLauncher>,
}
