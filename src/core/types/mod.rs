//! Core type definitions for hunt-core
//!
//! Address wrappers, value kinds and decoding, architecture, tile geometry
//! and the error taxonomy shared by every layer.

mod address;
mod architecture;
mod error;
mod geometry;
mod value;

pub use address::Address;
pub use architecture::Architecture;
pub use error::{HuntError, HuntResult};
pub use geometry::{Step, Tile, Waypoint};
pub use value::{Value, ValueKind, CHAIN_STRING_BUFFER, DIRECT_STRING_BUFFER, UNKNOWN_TEXT};

// Common type aliases
pub type ProcessId = u32;
