//! Full address-space scan for 4-byte values

use super::regions::{RegionEnumerator, RegionInfo, DEFAULT_REGION_CAP};
use super::AddressSpace;
use crate::core::types::Address;
use memchr::memmem;
use tracing::{debug, trace, warn};

/// Locates a 4-byte value anywhere in committed, readable memory.
///
/// Regions are visited in ascending address order, so the result for an
/// unchanging layout is deterministic.
pub struct MemoryScanner<'a> {
    space: &'a AddressSpace,
    region_cap: usize,
    ceiling: Address,
}

impl<'a> MemoryScanner<'a> {
    /// Create a new memory scanner bounded by the architecture's user-mode ceiling
    pub fn new(space: &'a AddressSpace) -> Self {
        MemoryScanner {
            space,
            region_cap: DEFAULT_REGION_CAP,
            ceiling: Address::new(space.architecture().scan_ceiling()),
        }
    }

    /// Overrides the size above which regions are skipped
    pub fn with_region_cap(mut self, cap: usize) -> Self {
        self.region_cap = cap;
        self
    }

    pub fn with_ceiling(mut self, ceiling: Address) -> Self {
        self.ceiling = ceiling;
        self
    }

    /// Returns the first address holding `value` (little-endian) other than `exclude`
    pub fn scan_for_u32(&self, value: u32, exclude: Option<Address>) -> Option<Address> {
        let needle = value.to_le_bytes();
        let finder = memmem::Finder::new(&needle);
        let mut regions = RegionEnumerator::new(self.space.source(), self.ceiling);

        for region in regions.by_ref() {
            if !region.is_scannable(self.region_cap) {
                continue;
            }

            let Some(buffer) = self.read_region(&region) else {
                continue;
            };

            let hit = first_match(&finder, &buffer, region.base_address, exclude);

            if let Some(address) = hit {
                debug!(value, address = %address, "value located");
                return Some(address);
            }
        }

        if let Some(e) = regions.take_aborted() {
            warn!(value, error = %e, "scan stopped before the ceiling");
        } else {
            debug!(value, "value not found below ceiling");
        }
        None
    }

    fn read_region(&self, region: &RegionInfo) -> Option<Vec<u8>> {
        let mut buffer = vec![0u8; region.size];
        match self.space.source().read_memory(region.base_address, &mut buffer) {
            Ok(read) => {
                buffer.truncate(read);
                Some(buffer)
            }
            Err(e) => {
                trace!(base = %region.base_address, size = region.size, error = %e, "skipping unreadable region");
                None
            }
        }
    }
}

/// Earliest match in `buffer` not at `exclude`; an excluded hit resumes one byte later
fn first_match(
    finder: &memmem::Finder<'_>,
    buffer: &[u8],
    base: Address,
    exclude: Option<Address>,
) -> Option<Address> {
    let mut pos = 0;
    while pos < buffer.len() {
        let offset = pos + finder.find(&buffer[pos..])?;
        let address = base.checked_add(offset)?;
        if Some(address) != exclude {
            return Some(address);
        }
        pos = offset + 1;
    }
    None
}
