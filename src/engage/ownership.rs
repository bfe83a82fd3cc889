//! The walking-ownership token shared by every movement producer

use crate::core::types::{HuntError, HuntResult};
use std::fmt;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Identifies a movement producer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(&'static str);

impl OwnerId {
    pub const ENGAGEMENT: OwnerId = OwnerId("engagement");

    pub const fn new(name: &'static str) -> Self {
        OwnerId(name)
    }

    pub const fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Exclusive right to issue movement commands.
///
/// At most one owner holds the token. Acquiring while already holding it is
/// a no-op, and only the holder can release it.
#[derive(Debug, Default)]
pub struct WalkingOwnership {
    holder: Mutex<Option<OwnerId>>,
    released: Condvar,
}

impl WalkingOwnership {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<OwnerId>> {
        self.holder.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes the token if it is free; true when `owner` holds it afterwards
    pub fn try_acquire(&self, owner: OwnerId) -> bool {
        let mut holder = self.lock();
        match *holder {
            None => {
                *holder = Some(owner);
                true
            }
            Some(current) => current == owner,
        }
    }

    /// Waits up to `timeout` for the token to become free
    pub fn acquire_timeout(&self, owner: OwnerId, timeout: Duration) -> bool {
        let holder = self.lock();
        let (mut holder, _) = self
            .released
            .wait_timeout_while(holder, timeout, |h| h.is_some_and(|current| current != owner))
            .unwrap_or_else(PoisonError::into_inner);

        match *holder {
            None => {
                *holder = Some(owner);
                true
            }
            Some(current) => current == owner,
        }
    }

    /// Gives the token back; false if `owner` did not hold it
    pub fn release(&self, owner: OwnerId) -> bool {
        let mut holder = self.lock();
        if *holder == Some(owner) {
            *holder = None;
            self.released.notify_all();
            true
        } else {
            false
        }
    }

    pub fn holder(&self) -> Option<OwnerId> {
        *self.lock()
    }

    pub fn is_held_by(&self, owner: OwnerId) -> bool {
        self.holder() == Some(owner)
    }

    /// Fails with `OwnershipConflict` unless `owner` holds the token
    pub fn ensure_held(&self, owner: OwnerId) -> HuntResult<()> {
        match self.holder() {
            Some(current) if current == owner => Ok(()),
            Some(current) => Err(HuntError::ownership_conflict(current, owner)),
            None => Err(HuntError::ownership_conflict("nobody", owner)),
        }
    }
}
