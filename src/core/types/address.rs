//! Memory address wrapper type with hex parsing and signed offsets

use super::error::HuntError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Represents an absolute address in the attached process
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub usize);

impl Address {
    /// Creates a new address from a usize value
    pub const fn new(value: usize) -> Self {
        Address(value)
    }

    /// Creates a null address (0x0)
    pub const fn null() -> Self {
        Address(0)
    }

    /// Checks if the address is null
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Returns the raw usize value
    pub const fn as_usize(&self) -> usize {
        self.0
    }

    /// Adds a signed offset, returning `None` on wrap-around
    pub fn checked_offset(&self, offset: i64) -> Option<Self> {
        let offset = isize::try_from(offset).ok()?;
        self.0.checked_add_signed(offset).map(Address)
    }

    /// Adds an unsigned length, returning `None` on overflow
    pub fn checked_add(&self, len: usize) -> Option<Self> {
        self.0.checked_add(len).map(Address)
    }

    /// Signed distance from `origin` to this address
    pub fn offset_from(&self, origin: Address) -> i64 {
        (self.0 as i128 - origin.0 as i128) as i64
    }
}

impl FromStr for Address {
    type Err = HuntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        let value = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            usize::from_str_radix(hex, 16)
        } else if s.chars().any(|c| c.is_ascii_alphabetic()) {
            usize::from_str_radix(s, 16)
        } else {
            s.parse::<usize>()
        };

        value
            .map(Address::new)
            .map_err(|_| HuntError::read_failed(s, "not a valid address"))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}

impl From<usize> for Address {
    fn from(value: usize) -> Self {
        Address::new(value)
    }
}

impl From<u64> for Address {
    fn from(value: u64) -> Self {
        Address::new(value as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_parsing() {
        assert_eq!(Address::from_str("0x1000").unwrap(), Address::new(0x1000));
        assert_eq!(Address::from_str("0X1000").unwrap(), Address::new(0x1000));
        assert_eq!(
            Address::from_str("DEADBEEF").unwrap(),
            Address::new(0xDEADBEEF)
        );
        assert_eq!(Address::from_str("4096").unwrap(), Address::new(4096));
        assert!(Address::from_str("0xZZ").is_err());
    }

    #[test]
    fn test_checked_offset() {
        let addr = Address::new(0x1000);
        assert_eq!(addr.checked_offset(0x10), Some(Address::new(0x1010)));
        assert_eq!(addr.checked_offset(-0x10), Some(Address::new(0x0FF0)));
        assert_eq!(addr.checked_offset(-0x2000), None);
        assert_eq!(Address::new(usize::MAX).checked_offset(1), None);
    }

    #[test]
    fn test_offset_from() {
        let base = Address::new(0x400000);
        assert_eq!(Address::new(0x400120).offset_from(base), 0x120);
        assert_eq!(Address::new(0x300000).offset_from(base), -0x100000);
    }

    #[test]
    fn test_address_display() {
        let addr = Address::new(0xDEADBEEF);
        assert_eq!(format!("{}", addr), "0x00000000DEADBEEF");
    }
}
