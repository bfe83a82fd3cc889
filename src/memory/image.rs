//! In-process synthetic address space
//!
//! `MemoryImage` backs the reader, scanner and snapshot with plain byte
//! segments so that the whole read path can run without a live process.

use super::regions::{RegionInfo, RegionState, PAGE_READWRITE};
use super::MemorySource;
use crate::core::types::{Address, HuntError, HuntResult};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

#[derive(Debug, Clone)]
struct Segment {
    data: Vec<u8>,
    protection: u32,
    state: RegionState,
}

/// A set of mapped segments that implements [`MemorySource`]
#[derive(Debug, Default)]
pub struct MemoryImage {
    segments: RwLock<BTreeMap<usize, Segment>>,
    reads: AtomicUsize,
    exited: AtomicBool,
}

impl MemoryImage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps committed read-write bytes at `base`
    pub fn map(&mut self, base: Address, data: Vec<u8>) -> &mut Self {
        self.map_with(base, data, PAGE_READWRITE, RegionState::Committed)
    }

    /// Maps bytes with explicit protection and state
    pub fn map_with(
        &mut self,
        base: Address,
        data: Vec<u8>,
        protection: u32,
        state: RegionState,
    ) -> &mut Self {
        if let Ok(mut segments) = self.segments.write() {
            segments.insert(
                base.as_usize(),
                Segment {
                    data,
                    protection,
                    state,
                },
            );
        }
        self
    }

    /// Overwrites bytes inside an existing segment
    pub fn write_bytes(&self, address: Address, bytes: &[u8]) -> HuntResult<()> {
        let mut segments = self
            .segments
            .write()
            .map_err(|_| HuntError::read_failed(address, "image lock poisoned"))?;
        let (base, segment) = segments
            .range_mut(..=address.as_usize())
            .next_back()
            .ok_or_else(|| HuntError::read_failed(address, "address not mapped"))?;
        let start = address.as_usize() - *base;
        let end = start
            .checked_add(bytes.len())
            .filter(|end| *end <= segment.data.len())
            .ok_or_else(|| HuntError::read_failed(address, "write crosses segment end"))?;
        segment.data[start..end].copy_from_slice(bytes);
        Ok(())
    }

    pub fn write_u32(&self, address: Address, value: u32) -> HuntResult<()> {
        self.write_bytes(address, &value.to_ne_bytes())
    }

    pub fn write_u64(&self, address: Address, value: u64) -> HuntResult<()> {
        self.write_bytes(address, &value.to_ne_bytes())
    }

    /// Number of successful and failed `read_memory` calls so far
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    pub fn reset_read_count(&self) {
        self.reads.store(0, Ordering::Relaxed);
    }

    /// Simulates the owning process going away
    pub fn mark_exited(&self) {
        self.exited.store(true, Ordering::Relaxed);
    }
}

impl MemorySource for MemoryImage {
    fn read_memory(&self, address: Address, buffer: &mut [u8]) -> HuntResult<usize> {
        self.reads.fetch_add(1, Ordering::Relaxed);

        if self.exited.load(Ordering::Relaxed) {
            return Err(HuntError::ProcessExited(0));
        }

        let segments = self
            .segments
            .read()
            .map_err(|_| HuntError::read_failed(address, "image lock poisoned"))?;
        let (base, segment) = segments
            .range(..=address.as_usize())
            .next_back()
            .ok_or_else(|| HuntError::read_failed(address, "address not mapped"))?;

        let region = RegionInfo::new(
            Address::new(*base),
            segment.data.len(),
            segment.state,
            segment.protection,
        );
        if !region.is_readable() {
            return Err(HuntError::read_failed(address, "region not readable"));
        }

        let start = address.as_usize() - *base;
        let end = start
            .checked_add(buffer.len())
            .filter(|end| *end <= segment.data.len())
            .ok_or_else(|| HuntError::read_failed(address, "read crosses segment end"))?;
        buffer.copy_from_slice(&segment.data[start..end]);
        Ok(buffer.len())
    }

    fn query_region(&self, address: Address) -> HuntResult<RegionInfo> {
        let segments = self
            .segments
            .read()
            .map_err(|_| HuntError::scan_aborted(address, "image lock poisoned"))?;

        if let Some((base, segment)) = segments.range(..=address.as_usize()).next_back() {
            if address.as_usize() < base + segment.data.len() {
                return Ok(RegionInfo::new(
                    Address::new(*base),
                    segment.data.len(),
                    segment.state,
                    segment.protection,
                ));
            }
        }

        match segments.range(address.as_usize().saturating_add(1)..).next() {
            Some((next, _)) => Ok(RegionInfo::new(
                address,
                next - address.as_usize(),
                RegionState::Free,
                0,
            )),
            None => Err(HuntError::scan_aborted(address, "no region beyond last mapping")),
        }
    }

    fn is_alive(&self) -> bool {
        !self.exited.load(Ordering::Relaxed)
    }
}
