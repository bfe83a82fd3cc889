//! Process access for the game client
//!
//! Opening a read-only handle, resolving the main module base and
//! enabling whatever privilege the platform needs first.

pub mod handle;
pub mod manager;
pub mod maps;
pub mod privileges;

pub use handle::ProcessHandle;
pub use manager::{AttachOptions, AttachedProcess, ProcessAttacher};
