//! `/proc/<pid>/maps` parsing for the Linux backend

use crate::core::types::{Address, HuntError, HuntResult};
use crate::memory::regions::{
    RegionInfo, RegionState, PAGE_EXECUTE, PAGE_EXECUTE_READ, PAGE_EXECUTE_READWRITE,
    PAGE_NOACCESS, PAGE_READONLY, PAGE_READWRITE,
};

/// One line of a maps file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapEntry {
    pub start: usize,
    pub end: usize,
    pub perms: String,
    pub path: Option<String>,
}

impl MapEntry {
    pub fn size(&self) -> usize {
        self.end - self.start
    }

    /// Permission string translated to `PAGE_*` protection flags
    pub fn protection(&self) -> u32 {
        let mut flags = self.perms.chars();
        let read = flags.next() == Some('r');
        let write = flags.next() == Some('w');
        let exec = flags.next() == Some('x');

        match (read, write, exec) {
            (true, false, false) => PAGE_READONLY,
            (true, true, false) => PAGE_READWRITE,
            (true, false, true) => PAGE_EXECUTE_READ,
            (true, true, true) => PAGE_EXECUTE_READWRITE,
            (false, _, true) => PAGE_EXECUTE,
            (false, _, false) => PAGE_NOACCESS,
        }
    }

    pub fn to_region(&self) -> RegionInfo {
        RegionInfo::new(
            Address::new(self.start),
            self.size(),
            RegionState::Committed,
            self.protection(),
        )
    }
}

/// Parses maps text; malformed lines are skipped
pub fn parse_maps(text: &str) -> Vec<MapEntry> {
    let mut entries = Vec::new();

    for line in text.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 2 {
            continue;
        }

        let Some((start, end)) = parts[0].split_once('-') else {
            continue;
        };
        let (Ok(start), Ok(end)) = (
            usize::from_str_radix(start, 16),
            usize::from_str_radix(end, 16),
        ) else {
            continue;
        };
        if end <= start {
            continue;
        }

        let path = (parts.len() >= 6).then(|| parts[5..].join(" "));
        entries.push(MapEntry {
            start,
            end,
            perms: parts[1].to_string(),
            path,
        });
    }

    entries.sort_by_key(|e| e.start);
    entries
}

/// Region containing `address`, or the unmapped gap up to the next mapping
pub fn region_at(entries: &[MapEntry], address: Address) -> HuntResult<RegionInfo> {
    let addr = address.as_usize();

    if let Some(entry) = entries.iter().find(|e| e.start <= addr && addr < e.end) {
        return Ok(entry.to_region());
    }

    match entries.iter().find(|e| e.start > addr) {
        Some(next) => Ok(RegionInfo::new(address, next.start - addr, RegionState::Free, 0)),
        None => Err(HuntError::scan_aborted(address, "no mapping at or above address")),
    }
}

/// Mapping that backs the executable, falling back to the lowest mapping
pub fn main_module<'a>(entries: &'a [MapEntry], exe_path: Option<&str>) -> Option<&'a MapEntry> {
    exe_path
        .and_then(|exe| entries.iter().find(|e| e.path.as_deref() == Some(exe)))
        .or_else(|| entries.first())
}
