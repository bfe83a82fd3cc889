//! Where each tracked value lives in the client

use crate::core::types::ValueKind;
use crate::memory::reader::DIRECT_SENTINEL;
use crate::memory::PointerChain;
use serde::{Deserialize, Serialize};

/// A module-relative address, optionally behind a pointer chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueLocation {
    /// Offset from the main module base
    #[serde(default)]
    pub address: i64,
    /// Pointer hops; `[-1]` reads the address itself
    #[serde(default = "direct_offsets")]
    pub offsets: Vec<i64>,
    #[serde(default = "default_kind")]
    pub kind: ValueKind,
}

fn direct_offsets() -> Vec<i64> {
    vec![DIRECT_SENTINEL]
}

fn default_kind() -> ValueKind {
    ValueKind::I32
}

impl ValueLocation {
    pub fn direct(address: i64, kind: ValueKind) -> Self {
        ValueLocation {
            address,
            offsets: direct_offsets(),
            kind,
        }
    }

    pub fn chained(address: i64, offsets: Vec<i64>, kind: ValueKind) -> Self {
        ValueLocation {
            address,
            offsets,
            kind,
        }
    }

    pub fn chain(&self) -> PointerChain {
        PointerChain::new(0, self.offsets.clone())
    }

    pub fn is_direct(&self) -> bool {
        self.offsets.as_slice() == [DIRECT_SENTINEL]
    }
}

impl Default for ValueLocation {
    fn default() -> Self {
        ValueLocation::direct(0, default_kind())
    }
}

/// A field at a fixed offset inside the targeted entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldLocation {
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "default_kind")]
    pub kind: ValueKind,
}

impl FieldLocation {
    pub const fn new(offset: i64, kind: ValueKind) -> Self {
        FieldLocation { offset, kind }
    }
}

impl Default for FieldLocation {
    fn default() -> Self {
        FieldLocation::new(0, default_kind())
    }
}

/// Player vitals, all read through their own chains
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VitalsLocations {
    pub hp: ValueLocation,
    pub hp_max: ValueLocation,
    pub mp: ValueLocation,
    pub mp_max: ValueLocation,
}

/// Every address the engagement loop reads
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressMap {
    /// Attacked-entity id; direct mode means entity lookup by scanning
    pub attack: ValueLocation,
    pub my_x: ValueLocation,
    pub my_y: ValueLocation,
    pub my_z: ValueLocation,
    pub vitals: Option<VitalsLocations>,
    pub target_x: FieldLocation,
    pub target_y: FieldLocation,
    pub target_z: FieldLocation,
    pub target_name: FieldLocation,
    pub target_hp: FieldLocation,
}
