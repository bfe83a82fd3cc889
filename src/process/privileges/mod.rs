//! Privilege adjustment needed before opening another process

#[cfg(windows)]
pub mod debug;

#[cfg(windows)]
pub use debug::{enable_debug_privilege, has_debug_privilege};

#[cfg(not(windows))]
use crate::core::types::HuntResult;

/// Linux gates cross-process reads through ptrace scope, not a token privilege
#[cfg(not(windows))]
pub fn enable_debug_privilege() -> HuntResult<()> {
    tracing::debug!("no debug privilege to enable on this platform");
    Ok(())
}

#[cfg(not(windows))]
pub fn has_debug_privilege() -> bool {
    false
}
