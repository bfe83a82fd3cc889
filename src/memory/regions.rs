//! Memory region descriptions and address-space walking

use super::MemorySource;
use crate::core::types::{Address, HuntError};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const PAGE_NOACCESS: u32 = 0x01;
pub const PAGE_READONLY: u32 = 0x02;
pub const PAGE_READWRITE: u32 = 0x04;
pub const PAGE_WRITECOPY: u32 = 0x08;
pub const PAGE_EXECUTE: u32 = 0x10;
pub const PAGE_EXECUTE_READ: u32 = 0x20;
pub const PAGE_EXECUTE_READWRITE: u32 = 0x40;
pub const PAGE_EXECUTE_WRITECOPY: u32 = 0x80;
pub const PAGE_GUARD: u32 = 0x100;

/// Regions at or above this size are skipped by value scans
pub const DEFAULT_REGION_CAP: usize = 100 * 1024 * 1024;

/// State of a memory region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegionState {
    /// Memory is committed and accessible
    Committed,
    /// Memory is reserved but not committed
    Reserved,
    /// Memory is free/unallocated
    Free,
}

/// Information about a memory region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionInfo {
    /// Base address of the region
    pub base_address: Address,
    /// Size of the region in bytes
    pub size: usize,
    /// Current state of the region
    pub state: RegionState,
    /// Protection flags, Windows `PAGE_*` encoding
    pub protection: u32,
}

impl RegionInfo {
    pub fn new(base_address: Address, size: usize, state: RegionState, protection: u32) -> Self {
        RegionInfo {
            base_address,
            size,
            state,
            protection,
        }
    }

    /// Check if the region is readable
    pub fn is_readable(&self) -> bool {
        self.state == RegionState::Committed
            && self.protection & (PAGE_NOACCESS | PAGE_GUARD) == 0
            && self.protection != 0
    }

    /// Whether a value scan reads this region
    pub fn is_scannable(&self, cap: usize) -> bool {
        self.state == RegionState::Committed
            && self.protection & (PAGE_NOACCESS | PAGE_GUARD) == 0
            && self.size < cap
    }

    /// Get the end address of the region
    pub fn end_address(&self) -> Address {
        Address::new(self.base_address.as_usize().saturating_add(self.size))
    }

    /// Check if an address is within this region
    pub fn contains(&self, address: Address) -> bool {
        address >= self.base_address && address < self.end_address()
    }
}

/// Walks an address space region by region, from a start address up to a ceiling.
///
/// Iteration ends at the ceiling, on an empty region, or on the first query
/// failure; [`RegionEnumerator::aborted`] reports the latter.
pub struct RegionEnumerator<'a> {
    source: &'a dyn MemorySource,
    current_address: Address,
    max_address: Address,
    aborted: Option<HuntError>,
}

impl<'a> RegionEnumerator<'a> {
    /// Create a new region enumerator starting at address zero
    pub fn new(source: &'a dyn MemorySource, max_address: Address) -> Self {
        RegionEnumerator {
            source,
            current_address: Address::null(),
            max_address,
            aborted: None,
        }
    }

    /// Error that stopped the walk early, if any
    pub fn aborted(&self) -> Option<&HuntError> {
        self.aborted.as_ref()
    }

    pub fn take_aborted(&mut self) -> Option<HuntError> {
        self.aborted.take()
    }

    /// Get the next memory region
    pub fn next_region(&mut self) -> Option<RegionInfo> {
        if self.current_address >= self.max_address || self.aborted.is_some() {
            return None;
        }

        match self.source.query_region(self.current_address) {
            Ok(region) if region.size > 0 => {
                let next = region.base_address.checked_add(region.size);
                match next {
                    Some(next) if next > self.current_address => self.current_address = next,
                    _ => self.current_address = self.max_address,
                }
                Some(region)
            }
            Ok(_) => {
                debug!(address = %self.current_address, "empty region, stopping walk");
                self.current_address = self.max_address;
                None
            }
            Err(e) => {
                debug!(address = %self.current_address, error = %e, "region query failed");
                self.aborted = Some(HuntError::scan_aborted(self.current_address, e.to_string()));
                None
            }
        }
    }
}

impl Iterator for RegionEnumerator<'_> {
    type Item = RegionInfo;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_region()
    }
}
