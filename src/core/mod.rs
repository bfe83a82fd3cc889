//! Core module containing fundamental types for hunt-core
//!
//! This module provides the foundational building blocks used throughout
//! the crate: address handling, value decoding, tile geometry and the
//! error types.

pub mod types;

pub use types::{Address, Architecture, HuntError, HuntResult, Tile, Value, ValueKind, Waypoint};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
