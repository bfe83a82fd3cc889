//! Kernel32 wrappers for opening processes, reading memory and querying regions

use crate::core::types::{HuntError, HuntResult};
use std::mem;
use winapi::shared::minwindef::{DWORD, FALSE, LPVOID};
use winapi::um::errhandlingapi::GetLastError;
use winapi::um::handleapi::CloseHandle;
use winapi::um::memoryapi::{ReadProcessMemory, VirtualQueryEx};
use winapi::um::minwinbase::STILL_ACTIVE;
use winapi::um::processthreadsapi::{GetExitCodeProcess, OpenProcess};
use winapi::um::winnt::{HANDLE, MEMORY_BASIC_INFORMATION};

const ERROR_ACCESS_DENIED: DWORD = 5;

/// Opens a process with the requested access mask
pub fn open_process(pid: u32, desired_access: u32) -> HuntResult<HANDLE> {
    unsafe {
        let handle = OpenProcess(desired_access, FALSE, pid);
        if !handle.is_null() {
            return Ok(handle);
        }

        match GetLastError() {
            ERROR_ACCESS_DENIED => Err(HuntError::access_denied(pid, "OpenProcess refused access")),
            code => Err(HuntError::ProcessNotFound(format!(
                "PID {} (OpenProcess error {})",
                pid, code
            ))),
        }
    }
}

/// Closes a handle; null handles are accepted
///
/// # Safety
/// The handle must be a valid Windows handle or null
pub unsafe fn close_handle(handle: HANDLE) -> HuntResult<()> {
    if handle.is_null() {
        return Ok(());
    }

    if CloseHandle(handle) == FALSE {
        Err(HuntError::WindowsApi("CloseHandle failed".to_string()))
    } else {
        Ok(())
    }
}

/// Reads remote memory into `buffer`, returning the byte count copied
///
/// # Safety
/// The handle must be a valid process handle with PROCESS_VM_READ
pub unsafe fn read_process_memory(
    handle: HANDLE,
    address: usize,
    buffer: &mut [u8],
) -> HuntResult<usize> {
    let mut bytes_read = 0;

    let result = ReadProcessMemory(
        handle,
        address as LPVOID,
        buffer.as_mut_ptr() as LPVOID,
        buffer.len(),
        &mut bytes_read,
    );

    if result == FALSE {
        Err(HuntError::read_failed(
            format!("0x{:X}", address),
            format!("ReadProcessMemory failed (error {})", GetLastError()),
        ))
    } else {
        Ok(bytes_read)
    }
}

/// Describes the region containing `address`
///
/// # Safety
/// The handle must be a valid process handle with PROCESS_QUERY_INFORMATION
pub unsafe fn virtual_query_ex(
    handle: HANDLE,
    address: usize,
) -> HuntResult<MEMORY_BASIC_INFORMATION> {
    let mut mbi: MEMORY_BASIC_INFORMATION = mem::zeroed();

    let result = VirtualQueryEx(
        handle,
        address as LPVOID,
        &mut mbi,
        mem::size_of::<MEMORY_BASIC_INFORMATION>(),
    );

    if result == 0 {
        Err(HuntError::scan_aborted(
            format!("0x{:X}", address),
            format!("VirtualQueryEx failed (error {})", GetLastError()),
        ))
    } else {
        Ok(mbi)
    }
}

/// True while the process has not reported an exit code
///
/// # Safety
/// The handle must be a valid process handle with PROCESS_QUERY_INFORMATION
pub unsafe fn is_process_running(handle: HANDLE) -> bool {
    let mut code: DWORD = 0;
    GetExitCodeProcess(handle, &mut code) != FALSE && code == STILL_ACTIVE
}
