//! Memory access layer for the attached process
//!
//! This module provides:
//! - The [`MemorySource`] seam over platform read and region-query primitives
//! - Typed reads with pointer-chain resolution
//! - Full address-space scanning for 4-byte values
//! - A synthetic [`MemoryImage`] for exercising all of the above offline

pub mod image;
pub mod reader;
pub mod regions;
pub mod scanner;

pub use image::MemoryImage;
pub use reader::{PointerChain, TypedMemoryReader};
pub use regions::{RegionEnumerator, RegionInfo, RegionState, DEFAULT_REGION_CAP};
pub use scanner::MemoryScanner;

use crate::core::types::{Address, Architecture, HuntResult};
use std::fmt;
use std::sync::Arc;

/// Raw access to another process's memory.
///
/// Implementations perform no locking of their own; a single controller loop
/// serializes every call it makes.
pub trait MemorySource: Send + Sync {
    /// Reads up to `buffer.len()` bytes at `address`, returning the count read
    fn read_memory(&self, address: Address, buffer: &mut [u8]) -> HuntResult<usize>;

    /// Describes the region containing `address`, or the next region above it
    fn query_region(&self, address: Address) -> HuntResult<RegionInfo>;

    /// Whether the process behind this source is still running
    fn is_alive(&self) -> bool {
        true
    }
}

/// A memory source bound to the module base and pointer width of one process
#[derive(Clone)]
pub struct AddressSpace {
    source: Arc<dyn MemorySource>,
    base: Address,
    arch: Architecture,
}

impl AddressSpace {
    pub fn new(source: Arc<dyn MemorySource>, base: Address, arch: Architecture) -> Self {
        AddressSpace { source, base, arch }
    }

    pub fn source(&self) -> &dyn MemorySource {
        self.source.as_ref()
    }

    /// Main module base address
    pub fn base(&self) -> Address {
        self.base
    }

    pub fn architecture(&self) -> Architecture {
        self.arch
    }

    /// Pointer width in bytes
    pub fn pointer_width(&self) -> usize {
        self.arch.pointer_size()
    }

    pub fn is_alive(&self) -> bool {
        self.source.is_alive()
    }
}

impl fmt::Debug for AddressSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddressSpace")
            .field("base", &self.base)
            .field("arch", &self.arch)
            .finish()
    }
}
