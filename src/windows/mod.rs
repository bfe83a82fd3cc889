//! Windows API layer for remote memory access
//!
//! All unsafe FFI calls are contained within this module; everything above
//! it talks to [`crate::process::ProcessHandle`].

pub mod bindings;
pub mod types;

pub use bindings::{kernel32, psapi};
pub use types::Handle;
