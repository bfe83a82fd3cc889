//! Read-only handle to another process, one backend per platform

use crate::core::types::{Address, HuntError, HuntResult, ProcessId};
use crate::memory::{MemorySource, RegionInfo};
use std::fmt;

#[cfg(windows)]
use crate::windows::{kernel32, psapi, Handle};

#[cfg(target_os = "linux")]
use super::maps;

/// Read-only handle to the target process
pub struct ProcessHandle {
    pid: ProcessId,
    #[cfg(windows)]
    handle: Handle,
    #[cfg(target_os = "linux")]
    handle: process_memory::ProcessHandle,
}

#[cfg(windows)]
impl ProcessHandle {
    /// Opens the process with query and VM read access
    pub fn open(pid: ProcessId) -> HuntResult<Self> {
        use winapi::um::winnt::{PROCESS_QUERY_INFORMATION, PROCESS_VM_READ};

        let raw = kernel32::open_process(pid, PROCESS_QUERY_INFORMATION | PROCESS_VM_READ)?;
        let handle = Handle::from_raw(raw)
            .ok_or_else(|| HuntError::InvalidHandle(format!("null handle for PID {}", pid)))?;
        Ok(ProcessHandle { pid, handle })
    }

    /// Base address and file name of the main module
    pub fn main_module(&self) -> HuntResult<(Address, String)> {
        let (base, name) = unsafe { psapi::main_module(self.handle.as_raw())? };
        Ok((Address::new(base), name))
    }

    pub fn is_valid(&self) -> bool {
        !self.handle.as_raw().is_null()
    }
}

#[cfg(windows)]
impl MemorySource for ProcessHandle {
    fn read_memory(&self, address: Address, buffer: &mut [u8]) -> HuntResult<usize> {
        if !self.is_valid() {
            return Err(HuntError::InvalidHandle("process handle is null".to_string()));
        }
        unsafe { kernel32::read_process_memory(self.handle.as_raw(), address.as_usize(), buffer) }
    }

    fn query_region(&self, address: Address) -> HuntResult<RegionInfo> {
        use crate::memory::RegionState;

        const MEM_COMMIT: u32 = 0x1000;
        const MEM_RESERVE: u32 = 0x2000;

        let mbi = unsafe { kernel32::virtual_query_ex(self.handle.as_raw(), address.as_usize())? };
        let state = match mbi.State {
            MEM_COMMIT => RegionState::Committed,
            MEM_RESERVE => RegionState::Reserved,
            _ => RegionState::Free,
        };

        Ok(RegionInfo::new(
            Address::new(mbi.BaseAddress as usize),
            mbi.RegionSize,
            state,
            mbi.Protect,
        ))
    }

    fn is_alive(&self) -> bool {
        self.is_valid() && unsafe { kernel32::is_process_running(self.handle.as_raw()) }
    }
}

#[cfg(target_os = "linux")]
impl ProcessHandle {
    /// Prepares `process_vm_readv` access to the process
    pub fn open(pid: ProcessId) -> HuntResult<Self> {
        use process_memory::TryIntoProcessHandle;

        if !proc_path(pid, "").exists() {
            return Err(HuntError::ProcessNotFound(format!("PID {}", pid)));
        }

        let handle = (pid as process_memory::Pid)
            .try_into_process_handle()
            .map_err(|e| HuntError::access_denied(pid, e.to_string()))?;
        Ok(ProcessHandle { pid, handle })
    }

    /// Base address and file name of the main module
    pub fn main_module(&self) -> HuntResult<(Address, String)> {
        let entries = self.maps()?;
        let exe = std::fs::read_link(proc_path(self.pid, "exe"))
            .ok()
            .map(|p| p.to_string_lossy().into_owned());

        let entry = maps::main_module(&entries, exe.as_deref())
            .ok_or_else(|| HuntError::ProcessNotFound(format!("PID {} has no mappings", self.pid)))?;
        let name = entry
            .path
            .as_deref()
            .and_then(|p| p.rsplit('/').next())
            .unwrap_or_default()
            .to_string();
        Ok((Address::new(entry.start), name))
    }

    pub fn is_valid(&self) -> bool {
        true
    }

    fn maps(&self) -> HuntResult<Vec<maps::MapEntry>> {
        match std::fs::read_to_string(proc_path(self.pid, "maps")) {
            Ok(text) => Ok(maps::parse_maps(&text)),
            Err(_) if !self.is_alive() => Err(HuntError::ProcessExited(self.pid)),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(target_os = "linux")]
impl MemorySource for ProcessHandle {
    fn read_memory(&self, address: Address, buffer: &mut [u8]) -> HuntResult<usize> {
        use process_memory::CopyAddress;

        self.handle
            .copy_address(address.as_usize(), buffer)
            .map_err(|e| HuntError::read_failed(address, e.to_string()))?;
        Ok(buffer.len())
    }

    fn query_region(&self, address: Address) -> HuntResult<RegionInfo> {
        let entries = self
            .maps()
            .map_err(|e| HuntError::scan_aborted(address, e.to_string()))?;
        maps::region_at(&entries, address)
    }

    fn is_alive(&self) -> bool {
        proc_path(self.pid, "").exists()
    }
}

#[cfg(target_os = "linux")]
fn proc_path(pid: ProcessId, entry: &str) -> std::path::PathBuf {
    std::path::Path::new("/proc").join(pid.to_string()).join(entry)
}

#[cfg(not(any(windows, target_os = "linux")))]
impl ProcessHandle {
    pub fn open(_pid: ProcessId) -> HuntResult<Self> {
        Err(HuntError::UnsupportedPlatform(std::env::consts::OS.to_string()))
    }

    pub fn main_module(&self) -> HuntResult<(Address, String)> {
        Err(HuntError::UnsupportedPlatform(std::env::consts::OS.to_string()))
    }

    pub fn is_valid(&self) -> bool {
        false
    }
}

#[cfg(not(any(windows, target_os = "linux")))]
impl MemorySource for ProcessHandle {
    fn read_memory(&self, address: Address, _buffer: &mut [u8]) -> HuntResult<usize> {
        Err(HuntError::read_failed(address, "unsupported platform"))
    }

    fn query_region(&self, address: Address) -> HuntResult<RegionInfo> {
        Err(HuntError::scan_aborted(address, "unsupported platform"))
    }

    fn is_alive(&self) -> bool {
        false
    }
}

impl ProcessHandle {
    /// Get the process ID
    pub fn pid(&self) -> ProcessId {
        self.pid
    }
}

impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("pid", &self.pid)
            .field("valid", &self.is_valid())
            .finish()
    }
}
