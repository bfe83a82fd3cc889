//! PSAPI wrappers for locating the main module

use crate::core::types::{HuntError, HuntResult};
use std::ffi::OsString;
use std::os::windows::ffi::OsStringExt;
use winapi::shared::minwindef::{FALSE, HMODULE, MAX_PATH};
use winapi::um::psapi::{EnumProcessModules, GetModuleBaseNameW, GetModuleInformation, MODULEINFO};
use winapi::um::winnt::HANDLE;

/// Lists loaded modules; the first entry is the main executable
///
/// # Safety
/// The handle must be a valid process handle
pub unsafe fn enum_process_modules(handle: HANDLE) -> HuntResult<Vec<HMODULE>> {
    let mut modules = vec![std::ptr::null_mut(); 1024];
    let mut bytes_needed = 0u32;

    let result = EnumProcessModules(
        handle,
        modules.as_mut_ptr(),
        (modules.len() * std::mem::size_of::<HMODULE>()) as u32,
        &mut bytes_needed,
    );

    if result == FALSE {
        return Err(HuntError::WindowsApi(
            "EnumProcessModules failed".to_string(),
        ));
    }

    let count = bytes_needed as usize / std::mem::size_of::<HMODULE>();
    modules.truncate(count.min(modules.len()));
    Ok(modules)
}

/// Load address and image size of a module
///
/// # Safety
/// The handle must be a valid process handle and module must be valid
pub unsafe fn get_module_information(handle: HANDLE, module: HMODULE) -> HuntResult<MODULEINFO> {
    let mut info = MODULEINFO {
        lpBaseOfDll: std::ptr::null_mut(),
        SizeOfImage: 0,
        EntryPoint: std::ptr::null_mut(),
    };

    let result = GetModuleInformation(
        handle,
        module,
        &mut info,
        std::mem::size_of::<MODULEINFO>() as u32,
    );

    if result == FALSE {
        return Err(HuntError::WindowsApi(
            "GetModuleInformation failed".to_string(),
        ));
    }

    Ok(info)
}

/// File name of a module, e.g. `client.exe`
///
/// # Safety
/// The handle must be a valid process handle and module must be valid
pub unsafe fn get_module_base_name(handle: HANDLE, module: HMODULE) -> HuntResult<String> {
    let mut buffer = vec![0u16; MAX_PATH];

    let length = GetModuleBaseNameW(handle, module, buffer.as_mut_ptr(), MAX_PATH as u32);
    if length == 0 {
        return Err(HuntError::WindowsApi(
            "GetModuleBaseNameW failed".to_string(),
        ));
    }

    buffer.truncate(length as usize);
    OsString::from_wide(&buffer)
        .into_string()
        .map_err(|_| HuntError::WindowsApi("module name is not valid UTF-16".to_string()))
}

/// Base address and name of the main executable module
///
/// # Safety
/// The handle must be a valid process handle with query and read access
pub unsafe fn main_module(handle: HANDLE) -> HuntResult<(usize, String)> {
    let modules = enum_process_modules(handle)?;
    let first = *modules
        .first()
        .ok_or_else(|| HuntError::WindowsApi("process has no modules".to_string()))?;

    let info = get_module_information(handle, first)?;
    let name = get_module_base_name(handle, first).unwrap_or_default();
    Ok((info.lpBaseOfDll as usize, name))
}
