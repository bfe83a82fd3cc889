//! Target process architecture

use serde::{Deserialize, Serialize};

/// Pointer width of the attached process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "ArchitectureRepr", into = "u32")]
pub enum Architecture {
    X86,
    #[default]
    X64,
}

impl Architecture {
    /// Returns the pointer size in bytes for this architecture
    pub const fn pointer_size(&self) -> usize {
        match self {
            Architecture::X86 => 4,
            Architecture::X64 => 8,
        }
    }

    /// Checks if this is a 64-bit architecture
    pub const fn is_64bit(&self) -> bool {
        matches!(self, Architecture::X64)
    }

    /// Highest user-mode address a scan walks up to
    pub const fn scan_ceiling(&self) -> usize {
        match self {
            Architecture::X86 => 0x7FFF_FFFF,
            Architecture::X64 => 0x7FFF_FFFF_FFFF,
        }
    }

    /// Architecture of the running binary
    pub const fn host() -> Self {
        if cfg!(target_pointer_width = "64") {
            Architecture::X64
        } else {
            Architecture::X86
        }
    }
}

/// Config form: bit width or name
#[derive(Deserialize)]
#[serde(untagged)]
enum ArchitectureRepr {
    Bits(u32),
    Name(String),
}

impl TryFrom<ArchitectureRepr> for Architecture {
    type Error = String;

    fn try_from(repr: ArchitectureRepr) -> Result<Self, Self::Error> {
        match repr {
            ArchitectureRepr::Bits(bits) => Architecture::try_from(bits),
            ArchitectureRepr::Name(name) => match name.to_ascii_lowercase().as_str() {
                "x86" | "i386" | "win32" => Ok(Architecture::X86),
                "x64" | "x86_64" | "amd64" => Ok(Architecture::X64),
                other => Err(format!("unknown architecture '{}'", other)),
            },
        }
    }
}

impl TryFrom<u32> for Architecture {
    type Error = String;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        match bits {
            32 => Ok(Architecture::X86),
            64 => Ok(Architecture::X64),
            other => Err(format!("architecture must be 32 or 64, got {}", other)),
        }
    }
}

impl From<Architecture> for u32 {
    fn from(arch: Architecture) -> Self {
        match arch {
            Architecture::X86 => 32,
            Architecture::X64 => 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_sizes() {
        assert_eq!(Architecture::X86.pointer_size(), 4);
        assert_eq!(Architecture::X64.pointer_size(), 8);
        assert!(!Architecture::X86.is_64bit());
    }

    #[test]
    fn test_bits_conversion() {
        assert_eq!(Architecture::try_from(32), Ok(Architecture::X86));
        assert_eq!(Architecture::try_from(64), Ok(Architecture::X64));
        assert!(Architecture::try_from(16).is_err());
        assert_eq!(u32::from(Architecture::X86), 32);
    }

    #[test]
    fn test_config_accepts_bits_or_name() {
        #[derive(Deserialize)]
        struct Wrapper {
            architecture: Architecture,
        }
        let parse = |s: &str| toml::from_str::<Wrapper>(s).map(|w| w.architecture);

        assert_eq!(parse("architecture = 32").unwrap(), Architecture::X86);
        assert_eq!(parse("architecture = \"x64\"").unwrap(), Architecture::X64);
        assert_eq!(parse("architecture = \"AMD64\"").unwrap(), Architecture::X64);
        assert!(parse("architecture = \"arm\"").is_err());
        assert!(parse("architecture = 16").is_err());
    }
}
