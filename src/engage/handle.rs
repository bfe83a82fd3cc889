//! Running a controller on its own thread

use super::controller::EngagementController;
use super::profile::{LootMode, SharedSettings, TargetProfile};
use super::shutdown::ShutdownSignal;
use crate::core::types::HuntResult;
use crate::game::GameState;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{info, warn};

/// Owner-side handle to a running engagement loop.
///
/// Dropping the handle stops the loop and joins its thread.
pub struct EngagementHandle {
    shutdown: Arc<ShutdownSignal>,
    settings: SharedSettings,
    thread: Option<JoinHandle<()>>,
}

impl EngagementHandle {
    /// Moves `controller` onto a thread named `engagement` and starts its loop
    pub fn spawn<G>(mut controller: EngagementController<G>) -> HuntResult<Self>
    where
        G: GameState + 'static,
    {
        let shutdown = controller.shutdown_signal();
        let settings = controller.settings();
        let thread = thread::Builder::new()
            .name("engagement".to_string())
            .spawn(move || controller.run())?;

        Ok(EngagementHandle {
            shutdown,
            settings,
            thread: Some(thread),
        })
    }

    pub fn update_loot_mode(&self, mode: LootMode) {
        info!(?mode, "loot mode updated");
        self.settings.set_loot_mode(mode);
    }

    pub fn update_profiles(&self, profiles: Vec<TargetProfile>) {
        info!(count = profiles.len(), "target profiles updated");
        self.settings.set_profiles(profiles);
    }

    /// True once the loop has exited on its own or after [`stop`](Self::stop)
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, JoinHandle::is_finished)
    }

    pub fn shutdown_signal(&self) -> Arc<ShutdownSignal> {
        Arc::clone(&self.shutdown)
    }

    /// Signals the loop and waits for it to exit
    pub fn stop(mut self) {
        self.shutdown_and_join();
    }

    fn shutdown_and_join(&mut self) {
        self.shutdown.trigger();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("engagement thread panicked");
            }
        }
    }
}

impl Drop for EngagementHandle {
    fn drop(&mut self) {
        self.shutdown_and_join();
    }
}
