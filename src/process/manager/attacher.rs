//! Attaching to the game client and binding its address space

use crate::core::types::{Address, Architecture, HuntError, HuntResult, ProcessId};
use crate::memory::{AddressSpace, MemorySource};
use crate::process::{privileges, ProcessHandle};
use std::sync::Arc;
use tracing::{info, warn};

/// Options for process attachment
#[derive(Debug, Clone)]
pub struct AttachOptions {
    /// Enable debug privileges before opening the process
    pub enable_debug_privilege: bool,
    /// Pointer width of the target
    pub architecture: Architecture,
    /// Use this base instead of the main module's load address
    pub base_override: Option<Address>,
}

impl Default for AttachOptions {
    fn default() -> Self {
        AttachOptions {
            enable_debug_privilege: true,
            architecture: Architecture::host(),
            base_override: None,
        }
    }
}

/// An opened process with its module base resolved
#[derive(Debug, Clone)]
pub struct AttachedProcess {
    pid: ProcessId,
    module_name: String,
    handle: Arc<ProcessHandle>,
    space: AddressSpace,
}

impl AttachedProcess {
    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn base(&self) -> Address {
        self.space.base()
    }

    /// Address space every reader and scanner for this process shares
    pub fn address_space(&self) -> AddressSpace {
        self.space.clone()
    }

    /// Explicit handle-validity check used to tell exit apart from transient read failures
    pub fn is_alive(&self) -> bool {
        self.handle.is_alive()
    }
}

/// Opens processes for reading
pub struct ProcessAttacher {
    options: AttachOptions,
}

impl ProcessAttacher {
    pub fn new() -> Self {
        Self::with_options(AttachOptions::default())
    }

    pub fn with_options(options: AttachOptions) -> Self {
        ProcessAttacher { options }
    }

    /// Attach to a process by ID
    pub fn attach(&self, pid: ProcessId) -> HuntResult<AttachedProcess> {
        if self.options.enable_debug_privilege {
            if let Err(e) = privileges::enable_debug_privilege() {
                warn!(error = %e, "continuing without debug privilege");
            }
        }

        let handle = Arc::new(ProcessHandle::open(pid)?);
        if !handle.is_valid() {
            return Err(HuntError::InvalidHandle(format!(
                "failed to attach to process {}",
                pid
            )));
        }

        let (module_base, module_name) = handle.main_module()?;
        let base = self.options.base_override.unwrap_or(module_base);

        let mut probe = [0u8; 1];
        handle
            .read_memory(base, &mut probe)
            .map_err(|e| HuntError::access_denied(pid, format!("probe read at {} failed: {}", base, e)))?;

        info!(
            pid,
            module = %module_name,
            base = %base,
            arch = ?self.options.architecture,
            "attached to process"
        );

        let source: Arc<dyn MemorySource> = handle.clone();
        Ok(AttachedProcess {
            pid,
            module_name,
            space: AddressSpace::new(source, base, self.options.architecture),
            handle,
        })
    }
}

impl Default for ProcessAttacher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = AttachOptions::default();
        assert!(options.enable_debug_privilege);
        assert_eq!(options.architecture, Architecture::host());
        assert!(options.base_override.is_none());
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_attach_missing_process() {
        let attacher = ProcessAttacher::with_options(AttachOptions {
            enable_debug_privilege: false,
            ..AttachOptions::default()
        });
        assert!(attacher.attach(u32::MAX - 7).is_err());
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn test_attach_self() {
        let attacher = ProcessAttacher::with_options(AttachOptions {
            enable_debug_privilege: false,
            ..AttachOptions::default()
        });
        // ptrace scope may forbid even self reads in sandboxes
        if let Ok(process) = attacher.attach(std::process::id()) {
            assert!(process.is_alive());
            assert!(!process.base().is_null());
            assert_eq!(process.address_space().pointer_width(), std::mem::size_of::<usize>());
        }
    }
}
