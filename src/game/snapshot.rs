//! Snapshot reads of player and target state

use super::{AddressMap, FieldLocation, GameState, TargetInfo, ValueLocation, Vitals};
use crate::core::types::{Address, Value, Waypoint};
use crate::memory::{AddressSpace, MemoryScanner, PointerChain, TypedMemoryReader};
use tracing::{debug, trace};

/// Reads game state from an attached address space.
///
/// In direct-id mode the entity behind the current id is found by scanning;
/// the address is cached per id and revalidated with one 4-byte read.
pub struct GameStateSnapshot {
    reader: TypedMemoryReader,
    addresses: AddressMap,
    scan_cache: Option<(u32, Address)>,
    region_cap: Option<usize>,
}

impl GameStateSnapshot {
    pub fn new(space: AddressSpace, addresses: AddressMap) -> Self {
        GameStateSnapshot {
            reader: TypedMemoryReader::new(space),
            addresses,
            scan_cache: None,
            region_cap: None,
        }
    }

    /// Overrides the scanner's region size cap
    pub fn with_region_cap(mut self, cap: usize) -> Self {
        self.region_cap = Some(cap);
        self
    }

    pub fn reader(&self) -> &TypedMemoryReader {
        &self.reader
    }

    fn read_location(&self, location: &ValueLocation) -> Option<Value> {
        self.reader
            .read_direct(location.address, &location.chain(), location.kind)
    }

    fn read_number(&self, location: &ValueLocation) -> Option<i64> {
        self.read_location(location)?.as_i64()
    }

    fn read_field(&self, entity: Address, field: &FieldLocation) -> Option<Value> {
        let base = self.reader.space().base();
        self.reader.read_direct(
            entity.offset_from(base),
            &PointerChain {
                base_offset: field.offset,
                ..PointerChain::direct()
            },
            field.kind,
        )
    }

    /// Address of the entity the current id refers to
    fn entity_address(&mut self, id: u32) -> Option<Address> {
        let attack = &self.addresses.attack;

        if !attack.is_direct() {
            let pointer = self
                .reader
                .read_direct(attack.address, &PointerChain::direct(), attack.kind)?
                .as_u64()?;
            let address = Address::new(usize::try_from(pointer).ok()?);
            return (!address.is_null()).then_some(address);
        }

        if let Some((cached_id, address)) = self.scan_cache {
            if cached_id == id && self.reader.read_u32(address) == Some(id) {
                trace!(id, address = %address, "scan cache hit");
                return Some(address);
            }
        }

        let space = self.reader.space();
        let exclude = space.base().checked_offset(attack.address);
        let mut scanner = MemoryScanner::new(space);
        if let Some(cap) = self.region_cap {
            scanner = scanner.with_region_cap(cap);
        }

        let found = scanner.scan_for_u32(id, exclude);
        self.scan_cache = found.map(|address| (id, address));
        found
    }

    /// Player hit and mana points, when vitals are configured
    pub fn read_vitals(&self) -> Option<Vitals> {
        let vitals = self.addresses.vitals.as_ref()?;
        Some(Vitals {
            hp: self.read_number(&vitals.hp)?,
            hp_max: self.read_number(&vitals.hp_max)?,
            mp: self.read_number(&vitals.mp)?,
            mp_max: self.read_number(&vitals.mp_max)?,
        })
    }
}

fn coordinate(value: Option<Value>) -> Option<i32> {
    value?.as_i64().and_then(|v| i32::try_from(v).ok())
}

impl GameState for GameStateSnapshot {
    fn target_id(&mut self) -> Option<u32> {
        let raw = self.read_number(&self.addresses.attack)?;
        if raw <= 0 {
            self.scan_cache = None;
            return Some(0);
        }
        u32::try_from(raw).ok()
    }

    fn target_info(&mut self) -> Option<TargetInfo> {
        let id = self.target_id().filter(|id| *id > 0)?;
        let entity = match self.entity_address(id) {
            Some(entity) => entity,
            None => {
                debug!(id, "entity for target not located");
                return None;
            }
        };

        let x = coordinate(self.read_field(entity, &self.addresses.target_x))?;
        let y = coordinate(self.read_field(entity, &self.addresses.target_y))?;
        let z = coordinate(self.read_field(entity, &self.addresses.target_z))?;
        let name = match self.read_field(entity, &self.addresses.target_name) {
            Some(Value::Text(text)) => text,
            Some(other) => other.to_string(),
            None => String::new(),
        };
        let hp = self
            .read_field(entity, &self.addresses.target_hp)
            .and_then(|v| v.as_i64());

        Some(TargetInfo {
            id,
            position: Waypoint::new(x, y, z),
            name,
            hp,
        })
    }

    fn my_position(&mut self) -> Option<Waypoint> {
        let x = coordinate(self.read_location(&self.addresses.my_x))?;
        let y = coordinate(self.read_location(&self.addresses.my_y))?;
        let z = coordinate(self.read_location(&self.addresses.my_z))?;
        Some(Waypoint::new(x, y, z))
    }

    fn my_vitals(&mut self) -> Option<Vitals> {
        self.read_vitals()
    }

    fn is_attached(&self) -> bool {
        self.reader.space().is_alive()
    }
}
