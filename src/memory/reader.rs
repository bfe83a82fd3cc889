//! Typed reads and pointer-chain resolution

use super::AddressSpace;
use crate::core::types::{Address, HuntError, HuntResult, Value, ValueKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Hop list marking a value that needs no pointer indirection
pub const DIRECT_SENTINEL: i64 = -1;

/// Where a value lives relative to the module base
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PointerChain {
    #[serde(default)]
    pub base_offset: i64,
    #[serde(default = "direct_hops")]
    pub hops: Vec<i64>,
}

fn direct_hops() -> Vec<i64> {
    vec![DIRECT_SENTINEL]
}

impl PointerChain {
    /// A chain that reads the addressed value itself
    pub fn direct() -> Self {
        PointerChain {
            base_offset: 0,
            hops: direct_hops(),
        }
    }

    pub fn new(base_offset: i64, hops: Vec<i64>) -> Self {
        PointerChain { base_offset, hops }
    }

    /// True when the chain is the single sentinel hop
    pub fn is_direct(&self) -> bool {
        self.hops.as_slice() == [DIRECT_SENTINEL]
    }
}

/// Reads typed values out of an [`AddressSpace`].
///
/// Every public read absorbs failures: an unmapped page, a revoked handle or
/// an undecodable buffer is logged at debug level and surfaces as `None`.
#[derive(Debug, Clone)]
pub struct TypedMemoryReader {
    space: AddressSpace,
}

impl TypedMemoryReader {
    pub fn new(space: AddressSpace) -> Self {
        TypedMemoryReader { space }
    }

    pub fn space(&self) -> &AddressSpace {
        &self.space
    }

    /// Reads a value at `base + address_offset`, walking `chain` unless it is direct
    pub fn read_direct(
        &self,
        address_offset: i64,
        chain: &PointerChain,
        kind: ValueKind,
    ) -> Option<Value> {
        let offset = address_offset.checked_add(chain.base_offset)?;
        if !chain.is_direct() {
            return self.read_chain(offset, &chain.hops, kind);
        }

        let result = self
            .absolute(offset)
            .and_then(|address| self.read_value(address, kind, false));
        absorb(result, offset, kind)
    }

    /// Walks `hops` from `base + address_offset` and reads the final value.
    ///
    /// N hops issue N pointer reads followed by one typed read.
    pub fn read_chain(&self, address_offset: i64, hops: &[i64], kind: ValueKind) -> Option<Value> {
        let result = self
            .resolve_chain(address_offset, hops)
            .and_then(|address| self.read_value(address, kind, true));
        absorb(result, address_offset, kind)
    }

    /// Follows the pointer hops and returns the address of the final value
    pub fn resolve_chain(&self, address_offset: i64, hops: &[i64]) -> HuntResult<Address> {
        let mut current = self.absolute(address_offset)?;

        for (hop, offset) in hops.iter().enumerate() {
            let pointer = self.read_pointer(current).map_err(|e| {
                HuntError::pointer_chain_broken(hop, e.to_string())
            })?;
            if pointer.is_null() {
                return Err(HuntError::pointer_chain_broken(hop, format!("null pointer at {}", current)));
            }
            current = pointer.checked_offset(*offset).ok_or_else(|| {
                HuntError::pointer_chain_broken(hop, "offset leaves the address space")
            })?;
        }

        Ok(current)
    }

    /// Reads one pointer-width value, zero-extended
    pub fn read_pointer(&self, address: Address) -> HuntResult<Address> {
        let width = self.space.pointer_width();
        let mut buffer = [0u8; 8];
        self.read_exact(address, &mut buffer[..width])?;

        let value = if width == 4 {
            u32::from_ne_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]) as u64
        } else {
            u64::from_ne_bytes(buffer)
        };
        usize::try_from(value)
            .map(Address::new)
            .map_err(|_| HuntError::read_failed(address, "pointer exceeds host address width"))
    }

    /// Reads a 4-byte unsigned value at an absolute address
    pub fn read_u32(&self, address: Address) -> Option<u32> {
        let mut buffer = [0u8; 4];
        match self.read_exact(address, &mut buffer) {
            Ok(()) => Some(u32::from_ne_bytes(buffer)),
            Err(e) => {
                debug!(address = %address, error = %e, "u32 read failed");
                None
            }
        }
    }

    /// Reads and decodes `kind` at an absolute address
    pub fn read_value(&self, address: Address, kind: ValueKind, through_chain: bool) -> HuntResult<Value> {
        let mut buffer = vec![0u8; kind.buffer_len(self.space.pointer_width(), through_chain)];
        let read = self.space.source().read_memory(address, &mut buffer)?;
        buffer.truncate(read);

        kind.decode(&buffer)
            .ok_or_else(|| HuntError::decode_failed(kind, format!("{} bytes at {}", read, address)))
    }

    fn read_exact(&self, address: Address, buffer: &mut [u8]) -> HuntResult<()> {
        let read = self.space.source().read_memory(address, buffer)?;
        if read < buffer.len() {
            return Err(HuntError::read_failed(
                address,
                format!("short read: {} of {} bytes", read, buffer.len()),
            ));
        }
        Ok(())
    }

    fn absolute(&self, offset: i64) -> HuntResult<Address> {
        self.space
            .base()
            .checked_offset(offset)
            .ok_or_else(|| HuntError::read_failed(format!("base{:+#x}", offset), "offset leaves the address space"))
    }
}

fn absorb(result: HuntResult<Value>, offset: i64, kind: ValueKind) -> Option<Value> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(offset, %kind, error = %e, "typed read failed");
            None
        }
    }
}
