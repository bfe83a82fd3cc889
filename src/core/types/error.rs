//! Error taxonomy for hunt-core

use std::fmt;
use thiserror::Error;

/// Main error type for memory, pathing and engagement operations
#[derive(Error, Debug)]
pub enum HuntError {
    #[error("Failed to read memory at {address}: {reason}")]
    ReadFailed { address: String, reason: String },

    #[error("Failed to decode {kind} value: {reason}")]
    DecodeFailed { kind: String, reason: String },

    #[error("Region scan aborted at {address}: {reason}")]
    ScanAborted { address: String, reason: String },

    #[error("No path from {from} to {to}")]
    PathNotFound { from: String, to: String },

    #[error("Walking ownership held by {holder}, requested by {requester}")]
    OwnershipConflict { holder: String, requester: String },

    #[error("Pointer chain broken at hop {hop}: {reason}")]
    PointerChainBroken { hop: usize, reason: String },

    #[error("Process not found: {0}")]
    ProcessNotFound(String),

    #[error("Access denied to process {pid}: {reason}")]
    AccessDenied { pid: u32, reason: String },

    #[error("Invalid handle: {0}")]
    InvalidHandle(String),

    #[error("Process {0} has exited")]
    ProcessExited(u32),

    #[error("Invalid architecture: {0}")]
    InvalidArchitecture(String),

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Windows API: {0}")]
    WindowsApi(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for hunt-core operations
pub type HuntResult<T> = Result<T, HuntError>;

impl HuntError {
    /// Creates a read failed error
    pub fn read_failed(address: impl fmt::Display, reason: impl Into<String>) -> Self {
        HuntError::ReadFailed {
            address: address.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a decode failed error
    pub fn decode_failed(kind: impl fmt::Display, reason: impl Into<String>) -> Self {
        HuntError::DecodeFailed {
            kind: kind.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a scan aborted error
    pub fn scan_aborted(address: impl fmt::Display, reason: impl Into<String>) -> Self {
        HuntError::ScanAborted {
            address: address.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a path not found error
    pub fn path_not_found(from: impl fmt::Display, to: impl fmt::Display) -> Self {
        HuntError::PathNotFound {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Creates an ownership conflict error
    pub fn ownership_conflict(holder: impl fmt::Display, requester: impl fmt::Display) -> Self {
        HuntError::OwnershipConflict {
            holder: holder.to_string(),
            requester: requester.to_string(),
        }
    }

    /// Creates a pointer chain broken error
    pub fn pointer_chain_broken(hop: usize, reason: impl Into<String>) -> Self {
        HuntError::PointerChainBroken {
            hop,
            reason: reason.into(),
        }
    }

    /// Creates an access denied error for a process
    pub fn access_denied(pid: u32, reason: impl Into<String>) -> Self {
        HuntError::AccessDenied {
            pid,
            reason: reason.into(),
        }
    }

    /// True for errors that mean the attached process itself is gone
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            HuntError::ProcessExited(_) | HuntError::InvalidHandle(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HuntError::read_failed("0x00000000DEADBEEF", "page not mapped");
        assert_eq!(
            err.to_string(),
            "Failed to read memory at 0x00000000DEADBEEF: page not mapped"
        );

        let err = HuntError::access_denied(1234, "SeDebugPrivilege required");
        assert_eq!(
            err.to_string(),
            "Access denied to process 1234: SeDebugPrivilege required"
        );
    }

    #[test]
    fn test_taxonomy_variants() {
        let errors: Vec<(HuntError, &str)> = vec![
            (
                HuntError::decode_failed("utf8", "invalid sequence"),
                "Failed to decode utf8 value: invalid sequence",
            ),
            (
                HuntError::scan_aborted("0x1000", "VirtualQueryEx failed"),
                "Region scan aborted at 0x1000: VirtualQueryEx failed",
            ),
            (
                HuntError::path_not_found("(0, 0)", "(5, 5)"),
                "No path from (0, 0) to (5, 5)",
            ),
            (
                HuntError::ownership_conflict("waypoints", "engagement"),
                "Walking ownership held by waypoints, requested by engagement",
            ),
            (
                HuntError::pointer_chain_broken(2, "null pointer"),
                "Pointer chain broken at hop 2: null pointer",
            ),
            (HuntError::ProcessExited(77), "Process 77 has exited"),
        ];

        for (error, expected) in errors {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_fatal_classification() {
        assert!(HuntError::ProcessExited(1).is_fatal());
        assert!(HuntError::InvalidHandle("closed".to_string()).is_fatal());
        assert!(!HuntError::read_failed("0x0", "unmapped").is_fatal());
        assert!(!HuntError::path_not_found("a", "b").is_fatal());
    }

    #[test]
    fn test_from_implementations() {
        use std::io;

        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "test");
        let err: HuntError = io_err.into();
        assert!(matches!(err, HuntError::IoError(_)));

        let json_err = serde_json::from_str::<String>("invalid json").unwrap_err();
        let err: HuntError = json_err.into();
        assert!(matches!(err, HuntError::JsonError(_)));
    }
}
