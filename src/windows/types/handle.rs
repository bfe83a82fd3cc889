//! Process handle ownership

use crate::windows::bindings::kernel32;
use winapi::um::winnt::HANDLE;

/// A non-null process HANDLE, closed when dropped
pub struct Handle(HANDLE);

impl Handle {
    /// Takes ownership of `raw`; `None` when it is null
    pub fn from_raw(raw: HANDLE) -> Option<Self> {
        (!raw.is_null()).then_some(Handle(raw))
    }

    pub fn as_raw(&self) -> HANDLE {
        self.0
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        unsafe {
            let _ = kernel32::close_handle(self.0);
        }
    }
}

// Kernel handles may be used from any thread of the owning process
unsafe impl Send for Handle {}
unsafe impl Sync for Handle {}
