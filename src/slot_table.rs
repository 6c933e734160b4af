//! Open-addressed hash table mapping a managed region's address to its
//! [`Slot`]. Keyed on the numeric address of the region, linear-probed,
//! with tombstones left behind by sweep and reallocation.

use crate::config::{GROW_FACTOR, INITIAL_CAPACITY, MAX_LOAD};
use crate::slot::{Flags, Slot};

/// The address's low bits are poorly distributed (allocator alignment
/// zeroes them), so a mixing hash is required to avoid pathological
/// clustering under linear probing. FNV-1a over the four low bytes of the
/// address, truncated to its low 32 bits before mixing and before the
/// table-size modulus -- the low 32 bits are what carries any entropy an
/// allocator's addresses have.
#[inline]
fn hash_address(address: usize) -> u32 {
    const FNV_OFFSET: u32 = 0x811c_9dc5;
    const FNV_PRIME: u32 = 0x0100_0193;
    let bytes = (address as u32).to_le_bytes();
    let mut hash = FNV_OFFSET;
    for b in bytes {
        hash ^= b as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Result of probing the table for an address.
pub enum Lookup {
    /// An `IN_USE` slot already holds this address.
    Hit(usize),
    /// The address is absent; insertion should happen at this index.
    Miss(usize),
    /// The table has no capacity yet.
    NoTable,
}

pub struct SlotTable {
    slots: Vec<Slot>,
    count: usize,
    #[cfg(feature = "debug_ids")]
    last_id: i64,
}

impl SlotTable {
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            count: 0,
            #[cfg(feature = "debug_ids")]
            last_id: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn get(&self, idx: usize) -> &Slot {
        &self.slots[idx]
    }

    #[inline]
    pub fn get_mut(&mut self, idx: usize) -> &mut Slot {
        &mut self.slots[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter()
    }

    pub fn iter_indices(&self) -> impl Iterator<Item = usize> {
        0..self.slots.len()
    }

    /// Locate the slot for `address`, or the insertion point (first
    /// tombstone seen, else the first unused entry) if absent. Probing
    /// always terminates because load is kept below [`MAX_LOAD`],
    /// guaranteeing an `UNUSED` entry exists on every probe sequence.
    pub fn find_slot(&self, address: usize) -> Lookup {
        let capacity = self.slots.len();
        if capacity == 0 {
            return Lookup::NoTable;
        }
        let mut idx = (hash_address(address) as usize) % capacity;
        let mut tombstone: Option<usize> = None;
        loop {
            let slot = &self.slots[idx];
            if slot.address == 0 {
                if slot.flags.is_unused() {
                    return Lookup::Miss(tombstone.unwrap_or(idx));
                }
                if tombstone.is_none() {
                    tombstone = Some(idx);
                }
            } else if slot.address == address {
                return Lookup::Hit(idx);
            }
            idx = (idx + 1) % capacity;
        }
    }

    /// Find-or-insert. Grows the table first if it is empty or
    /// inserting would push the load factor above [`MAX_LOAD`]. Returns the
    /// index of the (possibly freshly marked `IN_USE`) slot.
    pub fn get_slot(&mut self, address: usize) -> usize {
        let mut lookup = self.find_slot(address);
        let needs_growth = match lookup {
            Lookup::NoTable => true,
            Lookup::Miss(_) => (self.count + 1) as f64 > self.slots.len() as f64 * MAX_LOAD,
            Lookup::Hit(_) => false,
        };
        if needs_growth {
            self.grow();
            lookup = self.find_slot(address);
        }
        match lookup {
            Lookup::Hit(idx) => idx,
            Lookup::Miss(idx) => {
                #[cfg(feature = "debug_ids")]
                let id = {
                    let id = self.last_id;
                    self.last_id += 1;
                    id
                };
                let slot = &mut self.slots[idx];
                if slot.flags.is_unused() {
                    self.count += 1;
                }
                slot.address = address;
                slot.flags = Flags::IN_USE;
                #[cfg(feature = "debug_ids")]
                {
                    slot.id = id;
                }
                idx
            }
            Lookup::NoTable => unreachable!("grow() always produces a table"),
        }
    }

    /// Convert a slot to a tombstone: used by sweep (region already freed by
    /// the caller) and by reallocation-with-address-change.
    pub fn tombstone(&mut self, idx: usize) {
        let slot = &mut self.slots[idx];
        slot.address = 0;
        slot.size = 0;
        slot.flags = Flags::TOMBSTONE;
    }

    /// Grow the table by [`GROW_FACTOR`] (or to [`INITIAL_CAPACITY`] from
    /// empty), re-inserting every `IN_USE` entry and discarding tombstones.
    /// Because the new table is strictly larger and every re-insertion uses
    /// `find_slot`, no secondary resize occurs mid-growth.
    fn grow(&mut self) {
        let new_capacity = if self.slots.is_empty() {
            INITIAL_CAPACITY
        } else {
            self.slots.len() * GROW_FACTOR
        };
        #[cfg(feature = "collision_diagnostics")]
        #[cfg(feature = "verbose")]
        eprintln!(
            "[sgc] growing slot table {} -> {}",
            self.slots.len(),
            new_capacity
        );

        let old = std::mem::replace(&mut self.slots, vec![Slot::empty(); new_capacity]);
        self.count = 0;
        for slot in old {
            if !slot.flags.is_in_use() {
                continue;
            }
            let idx = match self.find_slot(slot.address) {
                Lookup::Miss(idx) => idx,
                _ => unreachable!("address was unique in the old table"),
            };
            self.slots[idx] = slot;
            self.count += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_has_no_capacity() {
        let t = SlotTable::new();
        assert!(matches!(t.find_slot(4096), Lookup::NoTable));
    }

    #[test]
    fn insert_then_find_hits() {
        let mut t = SlotTable::new();
        let idx = t.get_slot(0x1000);
        assert!(t.get(idx).flags.is_in_use());
        assert!(matches!(t.find_slot(0x1000), Lookup::Hit(i) if i == idx));
    }

    #[test]
    fn growth_preserves_all_live_entries() {
        let mut t = SlotTable::new();
        let mut addresses = vec![];
        // INITIAL_CAPACITY=8, MAX_LOAD=0.75: the 7th insertion (count 6->7)
        // already sits at the load boundary, the 8th must grow first.
        for i in 0..8 {
            let addr = 0x1000 + i * 0x40;
            addresses.push(addr);
            t.get_slot(addr);
        }
        assert_eq!(t.len(), 8);
        assert_eq!(t.capacity(), 16);
        for addr in addresses {
            assert!(matches!(t.find_slot(addr), Lookup::Hit(_)));
        }
    }

    #[test]
    fn tombstone_does_not_break_probing_for_later_entries() {
        let mut t = SlotTable::new();
        let a = t.get_slot(0x2000);
        let _b = t.get_slot(0x2008);
        t.tombstone(a);
        // 0x2008 must still be reachable even though an earlier probe slot
        // in its chain became a tombstone.
        assert!(matches!(t.find_slot(0x2008), Lookup::Hit(_)));
    }

    #[test]
    fn reinsert_into_tombstone_does_not_double_count() {
        let mut t = SlotTable::new();
        let a = t.get_slot(0x3000);
        t.tombstone(a);
        assert_eq!(t.len(), 1);
        t.get_slot(0x3000);
        assert_eq!(t.len(), 1);
    }
}
