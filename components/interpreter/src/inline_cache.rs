//! Inline caching for named property access
//!
//! Each static `GetById`/`PutById` instruction owns one [`InlineCache`]
//! remembering which hidden class it last resolved and in which slot the
//! property lived. A probe is a plain identity comparison of class ids, so a
//! stale entry can only cause a miss, never a wrong hit.

use arrayvec::ArrayVec;
use memory_manager::{ClassId, SlotIndex};
use tracing::trace;

use crate::config::MAX_INLINE_CACHE_ENTRIES;

/// Inline cache for one property access site
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InlineCache {
    /// Nothing cached yet
    #[default]
    Uninitialized,
    /// Single class cached (the common case)
    Monomorphic {
        /// The cached class
        class: ClassId,
        /// Slot of the property in objects of that class
        slot: SlotIndex,
    },
    /// Several classes cached, oldest first
    Polymorphic {
        /// (class, slot) pairs
        entries: ArrayVec<(ClassId, SlotIndex), MAX_INLINE_CACHE_ENTRIES>,
    },
}

impl InlineCache {
    /// Create a new uninitialized cache
    pub fn new() -> Self {
        InlineCache::Uninitialized
    }

    /// Returns the cached slot if `class` is one of the observed classes.
    #[inline]
    pub fn probe(&self, class: ClassId) -> Option<SlotIndex> {
        match self {
            InlineCache::Uninitialized => None,
            InlineCache::Monomorphic {
                class: cached,
                slot,
            } => (*cached == class).then_some(*slot),
            InlineCache::Polymorphic { entries } => entries
                .iter()
                .find(|(c, _)| *c == class)
                .map(|(_, slot)| *slot),
        }
    }

    /// Records that objects of `class` keep the property in `slot`.
    ///
    /// With `max_entries == 1` this overwrites the entry. Wider caches keep up
    /// to `max_entries` classes and drop the oldest when full. Returns true
    /// if a different class was evicted.
    pub fn populate(&mut self, class: ClassId, slot: SlotIndex, max_entries: usize) -> bool {
        let max_entries = max_entries.clamp(1, MAX_INLINE_CACHE_ENTRIES);
        match self {
            InlineCache::Uninitialized => {
                *self = InlineCache::Monomorphic { class, slot };
                false
            }
            InlineCache::Monomorphic {
                class: cached,
                slot: cached_slot,
            } => {
                if *cached == class {
                    *cached_slot = slot;
                    return false;
                }
                if max_entries == 1 {
                    trace!(old = cached.0, new = class.0, "inline cache overwritten");
                    *self = InlineCache::Monomorphic { class, slot };
                    return true;
                }
                let mut entries = ArrayVec::new();
                entries.push((*cached, *cached_slot));
                entries.push((class, slot));
                *self = InlineCache::Polymorphic { entries };
                false
            }
            InlineCache::Polymorphic { entries } => {
                if let Some(entry) = entries.iter_mut().find(|(c, _)| *c == class) {
                    entry.1 = slot;
                    return false;
                }
                let mut evicted = false;
                while entries.len() >= max_entries {
                    let (old, _) = entries.remove(0);
                    trace!(old = old.0, new = class.0, "inline cache entry evicted");
                    evicted = true;
                }
                entries.push((class, slot));
                evicted
            }
        }
    }

    /// Number of classes currently remembered.
    pub fn len(&self) -> usize {
        match self {
            InlineCache::Uninitialized => 0,
            InlineCache::Monomorphic { .. } => 1,
            InlineCache::Polymorphic { entries } => entries.len(),
        }
    }

    /// True if nothing has been cached.
    pub fn is_empty(&self) -> bool {
        matches!(self, InlineCache::Uninitialized)
    }
}

/// The cache sites of one compiled code block, indexed by the cache index
/// the emitter assigned to each access instruction.
#[derive(Debug, Clone, Default)]
pub struct PropertyCacheTable {
    entries: Vec<InlineCache>,
}

impl PropertyCacheTable {
    /// Creates a table with `size` sites. Index 0 is never handed out.
    pub fn new(size: u32) -> Self {
        Self {
            entries: vec![InlineCache::Uninitialized; size as usize],
        }
    }

    /// The cache entry for `index`, or `None` when caching is disabled for
    /// this access (index 0) or the index is out of range.
    #[inline]
    pub fn entry(&mut self, index: u32) -> Option<&mut InlineCache> {
        if index == bytecode_system::PROPERTY_CACHING_DISABLED {
            return None;
        }
        self.entries.get_mut(index as usize)
    }

    /// Read-only view of an entry.
    pub fn get(&self, index: u32) -> Option<&InlineCache> {
        if index == bytecode_system::PROPERTY_CACHING_DISABLED {
            return None;
        }
        self.entries.get(index as usize)
    }

    /// Number of sites, including the reserved index 0.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the table has no sites.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forgets everything cached.
    pub fn clear(&mut self) {
        self.entries.fill(InlineCache::Uninitialized);
    }
}
