//! SeDebugPrivilege handling

use crate::core::types::{HuntError, HuntResult};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;
use winapi::shared::minwindef::{DWORD, FALSE};
use winapi::um::handleapi::CloseHandle;
use winapi::um::processthreadsapi::{GetCurrentProcess, OpenProcessToken};
use winapi::um::securitybaseapi::AdjustTokenPrivileges;
use winapi::um::winbase::LookupPrivilegeValueW;
use winapi::um::winnt::{
    HANDLE, LUID, LUID_AND_ATTRIBUTES, SE_PRIVILEGE_ENABLED, TOKEN_ADJUST_PRIVILEGES,
    TOKEN_PRIVILEGES, TOKEN_QUERY,
};

static DEBUG_PRIVILEGE_ENABLED: AtomicBool = AtomicBool::new(false);

/// Whether a previous call enabled SeDebugPrivilege
pub fn has_debug_privilege() -> bool {
    DEBUG_PRIVILEGE_ENABLED.load(Ordering::Relaxed)
}

/// Enables SeDebugPrivilege on the current process token
pub fn enable_debug_privilege() -> HuntResult<()> {
    if has_debug_privilege() {
        return Ok(());
    }

    let pid = std::process::id();
    unsafe {
        let mut token: HANDLE = std::ptr::null_mut();
        if OpenProcessToken(
            GetCurrentProcess(),
            TOKEN_ADJUST_PRIVILEGES | TOKEN_QUERY,
            &mut token,
        ) == FALSE
        {
            return Err(HuntError::access_denied(pid, "failed to open process token"));
        }
        let _token_guard = TokenGuard(token);

        let mut luid = LUID {
            LowPart: 0,
            HighPart: 0,
        };
        let privilege_name: Vec<u16> = "SeDebugPrivilege".encode_utf16().chain(Some(0)).collect();
        if LookupPrivilegeValueW(std::ptr::null(), privilege_name.as_ptr(), &mut luid) == FALSE {
            return Err(HuntError::access_denied(pid, "failed to look up SeDebugPrivilege"));
        }

        let mut privileges = TOKEN_PRIVILEGES {
            PrivilegeCount: 1,
            Privileges: [LUID_AND_ATTRIBUTES {
                Luid: luid,
                Attributes: SE_PRIVILEGE_ENABLED,
            }],
        };

        if AdjustTokenPrivileges(
            token,
            FALSE,
            &mut privileges,
            std::mem::size_of::<TOKEN_PRIVILEGES>() as DWORD,
            std::ptr::null_mut(),
            std::ptr::null_mut(),
        ) == FALSE
        {
            return Err(HuntError::access_denied(pid, "failed to enable SeDebugPrivilege"));
        }
    }

    debug!("SeDebugPrivilege enabled");
    DEBUG_PRIVILEGE_ENABLED.store(true, Ordering::Relaxed);
    Ok(())
}

struct TokenGuard(HANDLE);

impl Drop for TokenGuard {
    fn drop(&mut self) {
        if !self.0.is_null() {
            unsafe {
                CloseHandle(self.0);
            }
        }
    }
}
