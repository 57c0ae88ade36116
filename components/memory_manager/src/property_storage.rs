//! Per-object named property storage.
//!
//! The first [`DIRECT_PROPERTY_SLOTS`] slots live inline in the object;
//! higher slots spill into a heap-allocated overflow vector that only grows.

use core_types::Value;

use crate::error::AllocError;
use crate::hidden_class::SlotIndex;

/// Number of property slots stored inline in every object.
pub const DIRECT_PROPERTY_SLOTS: usize = 5;

/// Slot array holding an object's named property values.
///
/// Slot indices are assigned by the object's hidden class. Reading or writing
/// a slot the class never assigned is a caller bug; reads of such slots
/// return `undefined` and writes are ignored.
///
/// # Example
///
/// ```
/// use core_types::Value;
/// use memory_manager::PropertyStorage;
///
/// let mut storage = PropertyStorage::new();
/// storage.ensure_capacity(8).unwrap();
/// storage.set(7, Value::Smi(1));
/// assert_eq!(storage.get(7), Value::Smi(1));
/// assert_eq!(storage.capacity(), 8);
/// ```
#[derive(Debug, Clone)]
pub struct PropertyStorage {
    direct: [Value; DIRECT_PROPERTY_SLOTS],
    overflow: Vec<Value>,
}

impl PropertyStorage {
    /// Creates storage with only the inline slots.
    pub fn new() -> Self {
        Self {
            direct: std::array::from_fn(|_| Value::Undefined),
            overflow: Vec::new(),
        }
    }

    /// Number of slots currently backed by memory.
    pub fn capacity(&self) -> usize {
        DIRECT_PROPERTY_SLOTS + self.overflow.len()
    }

    /// Reads a slot.
    #[inline]
    pub fn get(&self, slot: SlotIndex) -> Value {
        let slot = slot as usize;
        if slot < DIRECT_PROPERTY_SLOTS {
            self.direct[slot].clone()
        } else {
            self.overflow
                .get(slot - DIRECT_PROPERTY_SLOTS)
                .cloned()
                .unwrap_or(Value::Undefined)
        }
    }

    /// Writes a slot.
    #[inline]
    pub fn set(&mut self, slot: SlotIndex, value: Value) {
        let slot = slot as usize;
        if slot < DIRECT_PROPERTY_SLOTS {
            self.direct[slot] = value;
        } else if let Some(cell) = self.overflow.get_mut(slot - DIRECT_PROPERTY_SLOTS) {
            *cell = value;
        } else {
            debug_assert!(false, "store to unallocated property slot {}", slot);
        }
    }

    /// Makes sure at least `min_slots` slots are backed, growing the
    /// overflow vector if needed. Never shrinks.
    pub fn ensure_capacity(&mut self, min_slots: usize) -> Result<(), AllocError> {
        if min_slots <= self.capacity() {
            return Ok(());
        }
        let needed = min_slots - DIRECT_PROPERTY_SLOTS;
        // Grow geometrically so a run of additions does not reallocate each time.
        let target = needed.max(self.overflow.len() * 2);
        self.overflow
            .try_reserve_exact(target - self.overflow.len())
            .map_err(|_| AllocError::StorageGrowth(min_slots))?;
        self.overflow.resize(needed, Value::Undefined);
        Ok(())
    }
}

impl Default for PropertyStorage {
    fn default() -> Self {
        Self::new()
    }
}
