//! Stop flag shared by the engagement loop and its looting task

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Set once, never cleared. Pacing pauses sleep on it so a stop request cuts
/// them short.
#[derive(Debug, Default)]
pub struct ShutdownSignal {
    stopped: Mutex<bool>,
    wake: Condvar,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        *self.flag() = true;
        self.wake.notify_all();
    }

    pub fn is_shutdown(&self) -> bool {
        *self.flag()
    }

    /// Sleeps up to `timeout`; true when woken by [`trigger`](Self::trigger)
    pub fn wait(&self, timeout: Duration) -> bool {
        let guard = self.flag();
        let (guard, _) = self
            .wake
            .wait_timeout_while(guard, timeout, |stopped| !*stopped)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }

    fn flag(&self) -> MutexGuard<'_, bool> {
        self.stopped.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_poll_pause_runs_to_completion() {
        let signal = ShutdownSignal::new();
        let start = Instant::now();
        assert!(!signal.wait(Duration::from_millis(30)));
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_stop_cuts_loot_wait_short() {
        let signal = Arc::new(ShutdownSignal::new());
        let looter = Arc::clone(&signal);
        let worker = thread::spawn(move || {
            let mut rounds = 0;
            while !looter.wait(Duration::from_secs(10)) {
                rounds += 1;
            }
            rounds
        });

        thread::sleep(Duration::from_millis(30));
        let start = Instant::now();
        signal.trigger();
        assert_eq!(worker.join().unwrap(), 0);
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_stopped_before_pause() {
        let signal = ShutdownSignal::new();
        signal.trigger();
        signal.trigger();
        assert!(signal.is_shutdown());

        let start = Instant::now();
        assert!(signal.wait(Duration::from_secs(10)));
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
