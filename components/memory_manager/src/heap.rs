//! Object heap.
//!
//! Objects are allocated into an arena and addressed by [`ObjectId`].
//! Objects are never moved, so an id resolved at the start of a property
//! access stays valid for the whole access. Reclamation is not modelled:
//! every object lives as long as the heap.

use core_types::ObjectId;
use tracing::trace;

use crate::error::AllocError;
use crate::object::JSObject;

/// Heap usage counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeapStats {
    /// Number of live objects.
    pub objects: usize,
    /// Sum of backed property slots over all objects.
    pub property_slots: usize,
}

/// Arena holding every object of a runtime.
#[derive(Debug, Default)]
pub struct ObjectHeap {
    objects: Vec<JSObject>,
}

impl ObjectHeap {
    /// Creates an empty heap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves `object` into the heap and returns its handle.
    pub fn allocate(&mut self, object: JSObject) -> Result<ObjectId, AllocError> {
        let id = u32::try_from(self.objects.len())
            .map(ObjectId)
            .map_err(|_| AllocError::HeapExhausted)?;
        self.objects
            .try_reserve(1)
            .map_err(|_| AllocError::HeapExhausted)?;
        self.objects.push(object);
        trace!(object = id.0, "allocated object");
        Ok(id)
    }

    /// Borrows an object.
    #[inline]
    pub fn get(&self, id: ObjectId) -> &JSObject {
        &self.objects[id.index()]
    }

    /// Mutably borrows an object.
    #[inline]
    pub fn get_mut(&mut self, id: ObjectId) -> &mut JSObject {
        &mut self.objects[id.index()]
    }

    /// True if `id` refers to an allocated object.
    pub fn contains(&self, id: ObjectId) -> bool {
        id.index() < self.objects.len()
    }

    /// Number of allocated objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True if nothing has been allocated.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Current usage counters.
    pub fn stats(&self) -> HeapStats {
        HeapStats {
            objects: self.objects.len(),
            property_slots: self.objects.iter().map(|o| o.storage().capacity()).sum(),
        }
    }
}
