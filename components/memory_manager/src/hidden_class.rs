//! Hidden class system for optimizing JavaScript object property access.
//!
//! A hidden class describes the ordered set of named properties of an object
//! together with each property's slot index and flags. Objects that gain the
//! same properties in the same order share one class, found by following
//! transition edges keyed on `(name, flags)`.
//!
//! Classes live in an arena owned by [`HiddenClassRegistry`] and are
//! referred to by [`ClassId`]. Ids are never reused, so a stale id held by an
//! inline cache can only ever fail to match; it can never alias a newer class.
//!
//! A class that is shared never changes. The one exception is dictionary
//! mode: an object that accumulates too many properties, fans out too many
//! transitions or deletes a property gets a private class that is updated in
//! place from then on and is never entered into any transition map.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::AllocError;
use crate::identifier_table::SymbolId;

/// Index into an object's property storage.
pub type SlotIndex = u32;

/// Classes with at most this many properties are searched linearly.
const LINEAR_SCAN_LIMIT: usize = 8;

/// Identity of a hidden class in the registry arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub u32);

impl ClassId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Per-property attribute flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PropertyFlags {
    /// Property shows up in enumeration.
    pub enumerable: bool,
    /// Data property value can be changed.
    pub writable: bool,
    /// Property can be deleted or reconfigured.
    pub configurable: bool,
    /// The slot holds a getter/setter pair rather than a value.
    pub accessor: bool,
    /// Stores must go through the owning object's internal setter.
    pub internal_setter: bool,
}

impl PropertyFlags {
    /// Flags of a property created by plain assignment.
    pub const fn default_new_named() -> Self {
        Self {
            enumerable: true,
            writable: true,
            configurable: true,
            accessor: false,
            internal_setter: false,
        }
    }

    /// Flags of an accessor property.
    pub const fn accessor(enumerable: bool, configurable: bool) -> Self {
        Self {
            enumerable,
            writable: false,
            configurable,
            accessor: true,
            internal_setter: false,
        }
    }

    /// True for a writable data property with no internal setter, i.e. one
    /// whose slot may be stored into directly.
    pub const fn is_plain_writable_data(&self) -> bool {
        !self.accessor && self.writable && !self.internal_setter
    }
}

/// Where and how a named property is stored. Recomputed from the class on
/// every lookup, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedPropertyDescriptor {
    /// Slot in the object's property storage.
    pub slot: SlotIndex,
    /// Attribute flags.
    pub flags: PropertyFlags,
}

/// Thresholds that push objects into dictionary mode.
///
/// These are tuning knobs; any values produce correct behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionaryPolicy {
    /// Adding a property to a class that already has this many properties
    /// switches the object to dictionary mode.
    pub max_properties: u32,
    /// Adding a new transition to a class that already has this many
    /// outgoing transitions switches the object to dictionary mode instead.
    pub max_transitions: usize,
}

impl Default for DictionaryPolicy {
    fn default() -> Self {
        Self {
            max_properties: 64,
            max_transitions: 64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Transition {
    symbol: SymbolId,
    flags: PropertyFlags,
}

#[derive(Debug, Clone)]
struct PropertyEntry {
    symbol: SymbolId,
    desc: NamedPropertyDescriptor,
}

/// Shape of an object: its properties in creation order with slots and flags.
#[derive(Debug)]
pub struct HiddenClass {
    id: ClassId,
    parent: Option<ClassId>,
    properties: Vec<PropertyEntry>,
    /// Symbol to position in `properties`; only built for larger classes.
    index: Option<FxHashMap<SymbolId, usize>>,
    transitions: FxHashMap<Transition, ClassId>,
    dictionary: bool,
    /// Number of storage slots the class has handed out.
    slot_count: u32,
    /// Slots released by deletes, reused by later additions (dictionary only).
    free_slots: Vec<SlotIndex>,
}

impl HiddenClass {
    fn new_root(id: ClassId) -> Self {
        Self {
            id,
            parent: None,
            properties: Vec::new(),
            index: None,
            transitions: FxHashMap::default(),
            dictionary: false,
            slot_count: 0,
            free_slots: Vec::new(),
        }
    }

    fn derived(
        id: ClassId,
        parent: Option<ClassId>,
        properties: Vec<PropertyEntry>,
        slot_count: u32,
        dictionary: bool,
    ) -> Self {
        let mut class = Self {
            id,
            parent,
            properties,
            index: None,
            transitions: FxHashMap::default(),
            dictionary,
            slot_count,
            free_slots: Vec::new(),
        };
        class.rebuild_index();
        class
    }

    fn rebuild_index(&mut self) {
        if self.properties.len() > LINEAR_SCAN_LIMIT {
            let index = self
                .properties
                .iter()
                .enumerate()
                .map(|(pos, entry)| (entry.symbol, pos))
                .collect();
            self.index = Some(index);
        } else {
            self.index = None;
        }
    }

    fn position(&self, name: SymbolId) -> Option<usize> {
        match &self.index {
            Some(index) => index.get(&name).copied(),
            None => self.properties.iter().position(|e| e.symbol == name),
        }
    }

    /// Identity of this class.
    pub fn id(&self) -> ClassId {
        self.id
    }

    /// Class this one was transitioned from, if any.
    pub fn parent(&self) -> Option<ClassId> {
        self.parent
    }

    /// True if this class is in dictionary mode.
    pub fn is_dictionary(&self) -> bool {
        self.dictionary
    }

    /// Number of own properties described by this class.
    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    /// Number of storage slots an object of this class needs.
    pub fn slot_count(&self) -> u32 {
        self.slot_count
    }

    /// Number of outgoing transitions recorded on this class.
    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    /// Looks up an own property.
    ///
    /// Small classes are scanned linearly, larger ones use a hash index;
    /// the two strategies always agree.
    pub fn lookup(&self, name: SymbolId) -> Option<NamedPropertyDescriptor> {
        self.position(name).map(|pos| self.properties[pos].desc)
    }

    /// Iterates own properties in creation order.
    pub fn properties(&self) -> impl Iterator<Item = (SymbolId, NamedPropertyDescriptor)> + '_ {
        self.properties.iter().map(|e| (e.symbol, e.desc))
    }

    fn allocate_slot(&mut self) -> SlotIndex {
        match self.free_slots.pop() {
            Some(slot) => slot,
            None => {
                let slot = self.slot_count;
                self.slot_count += 1;
                slot
            }
        }
    }

    fn push_property(&mut self, name: SymbolId, desc: NamedPropertyDescriptor) {
        self.properties.push(PropertyEntry { symbol: name, desc });
        match &mut self.index {
            Some(index) => {
                index.insert(name, self.properties.len() - 1);
            }
            None => self.rebuild_index(),
        }
    }
}

/// Arena and transition graph of all hidden classes.
///
/// # Example
///
/// ```
/// use memory_manager::{HiddenClassRegistry, IdentifierTable, PropertyFlags};
///
/// let mut ids = IdentifierTable::new();
/// let (x, y) = (ids.intern("x"), ids.intern("y"));
///
/// let mut registry = HiddenClassRegistry::new();
/// let root = registry.root_class();
/// let flags = PropertyFlags::default_new_named();
///
/// let (with_x, _) = registry.class_for_new_property(root, x, flags).unwrap();
/// let (with_xy, y_desc) = registry.class_for_new_property(with_x, y, flags).unwrap();
/// assert_eq!(y_desc.slot, 1);
///
/// // The same history reaches the same class.
/// let (again, _) = registry.class_for_new_property(root, x, flags).unwrap();
/// assert_eq!(again, with_x);
/// assert_eq!(registry.lookup_own(with_xy, x).map(|d| d.slot), Some(0));
/// ```
#[derive(Debug)]
pub struct HiddenClassRegistry {
    classes: Vec<HiddenClass>,
    root: ClassId,
    policy: DictionaryPolicy,
    dictionary_conversions: u64,
}

impl HiddenClassRegistry {
    /// Creates a registry with the default dictionary policy.
    pub fn new() -> Self {
        Self::with_policy(DictionaryPolicy::default())
    }

    /// Creates a registry with the given dictionary policy.
    pub fn with_policy(policy: DictionaryPolicy) -> Self {
        let root = ClassId(0);
        Self {
            classes: vec![HiddenClass::new_root(root)],
            root,
            policy,
            dictionary_conversions: 0,
        }
    }

    /// The empty class every new ordinary object starts from.
    pub fn root_class(&self) -> ClassId {
        self.root
    }

    /// Active dictionary policy.
    pub fn policy(&self) -> DictionaryPolicy {
        self.policy
    }

    /// Borrows a class.
    pub fn class(&self, id: ClassId) -> &HiddenClass {
        &self.classes[id.index()]
    }

    /// Number of classes ever created, including the root.
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Number of dictionary-mode conversions performed.
    pub fn dictionary_conversions(&self) -> u64 {
        self.dictionary_conversions
    }

    /// True if the class is in dictionary mode.
    pub fn is_dictionary(&self, id: ClassId) -> bool {
        self.class(id).dictionary
    }

    /// Looks up an own property of a class.
    pub fn lookup_own(&self, id: ClassId, name: SymbolId) -> Option<NamedPropertyDescriptor> {
        self.class(id).lookup(name)
    }

    /// Iterates the properties of a class in creation order.
    pub fn own_properties(
        &self,
        id: ClassId,
    ) -> impl Iterator<Item = (SymbolId, NamedPropertyDescriptor)> + '_ {
        self.class(id).properties()
    }

    fn next_id(&self) -> Result<ClassId, AllocError> {
        u32::try_from(self.classes.len())
            .map(ClassId)
            .map_err(|_| AllocError::ClassArenaExhausted)
    }

    fn push_class(&mut self, class: HiddenClass) -> ClassId {
        let id = class.id;
        self.classes.push(class);
        id
    }

    /// Returns the class an object of class `current` has after gaining the
    /// new property `name` with `flags`, together with the new property's
    /// descriptor.
    ///
    /// For shared classes this follows (or records) a transition edge. For
    /// dictionary classes the class is updated in place and `current` is
    /// returned. Calling this for a property `current` already has is a
    /// logic error.
    pub fn class_for_new_property(
        &mut self,
        current: ClassId,
        name: SymbolId,
        flags: PropertyFlags,
    ) -> Result<(ClassId, NamedPropertyDescriptor), AllocError> {
        debug_assert!(
            self.lookup_own(current, name).is_none(),
            "class_for_new_property called for an existing property"
        );

        if self.class(current).dictionary {
            let class = &mut self.classes[current.index()];
            let desc = NamedPropertyDescriptor {
                slot: class.allocate_slot(),
                flags,
            };
            class.push_property(name, desc);
            return Ok((current, desc));
        }

        let key = Transition {
            symbol: name,
            flags,
        };
        if let Some(&next) = self.class(current).transitions.get(&key) {
            if let Some(desc) = self.lookup_own(next, name) {
                return Ok((next, desc));
            }
        }

        let parent = self.class(current);
        if parent.properties.len() as u64 >= u64::from(self.policy.max_properties)
            || parent.transitions.len() >= self.policy.max_transitions
        {
            let dictionary = self.convert_to_dictionary(current)?;
            return self.class_for_new_property(dictionary, name, flags);
        }

        let id = self.next_id()?;
        let parent = self.class(current);
        let desc = NamedPropertyDescriptor {
            slot: parent.slot_count,
            flags,
        };
        let mut properties = parent.properties.clone();
        properties.push(PropertyEntry { symbol: name, desc });
        let child = HiddenClass::derived(
            id,
            Some(current),
            properties,
            parent.slot_count + 1,
            false,
        );
        self.push_class(child);
        self.classes[current.index()].transitions.insert(key, id);
        trace!(parent = current.0, child = id.0, slot = desc.slot, "new hidden class");
        Ok((id, desc))
    }

    /// Returns the class after changing the flags of the existing property
    /// `name`. The property keeps its slot.
    pub fn update_property_flags(
        &mut self,
        current: ClassId,
        name: SymbolId,
        flags: PropertyFlags,
    ) -> Result<ClassId, AllocError> {
        let Some(pos) = self.class(current).position(name) else {
            debug_assert!(false, "update_property_flags called for a missing property");
            return Ok(current);
        };
        if self.class(current).properties[pos].desc.flags == flags {
            return Ok(current);
        }

        if self.class(current).dictionary {
            self.classes[current.index()].properties[pos].desc.flags = flags;
            return Ok(current);
        }

        let key = Transition {
            symbol: name,
            flags,
        };
        if let Some(&next) = self.class(current).transitions.get(&key) {
            return Ok(next);
        }
        if self.class(current).transitions.len() >= self.policy.max_transitions {
            let dictionary = self.convert_to_dictionary(current)?;
            return self.update_property_flags(dictionary, name, flags);
        }

        let id = self.next_id()?;
        let parent = self.class(current);
        let mut properties = parent.properties.clone();
        properties[pos].desc.flags = flags;
        let child = HiddenClass::derived(id, Some(current), properties, parent.slot_count, false);
        self.push_class(child);
        self.classes[current.index()].transitions.insert(key, id);
        Ok(id)
    }

    /// Removes the property `name`, returning the resulting class and the
    /// slot that was freed.
    ///
    /// Deletion always leaves the object in dictionary mode: a shared class
    /// is first copied into a private dictionary class. The freed slot goes
    /// on the free list and is handed out by the next addition.
    pub fn delete_property(
        &mut self,
        current: ClassId,
        name: SymbolId,
    ) -> Result<(ClassId, Option<SlotIndex>), AllocError> {
        if self.lookup_own(current, name).is_none() {
            return Ok((current, None));
        }
        let id = self.convert_to_dictionary(current)?;
        let class = &mut self.classes[id.index()];
        let Some(pos) = class.position(name) else {
            return Ok((id, None));
        };
        let entry = class.properties.remove(pos);
        class.free_slots.push(entry.desc.slot);
        class.rebuild_index();
        Ok((id, Some(entry.desc.slot)))
    }

    /// Returns a private dictionary-mode copy of `current`.
    ///
    /// Converting a class that is already a dictionary returns it unchanged;
    /// dictionary classes are never shared.
    pub fn convert_to_dictionary(&mut self, current: ClassId) -> Result<ClassId, AllocError> {
        if self.class(current).dictionary {
            return Ok(current);
        }
        let id = self.next_id()?;
        let source = self.class(current);
        let copy = HiddenClass::derived(
            id,
            None,
            source.properties.clone(),
            source.slot_count,
            true,
        );
        debug!(
            from = current.0,
            to = id.0,
            properties = copy.properties.len(),
            "converted hidden class to dictionary mode"
        );
        self.push_class(copy);
        self.dictionary_conversions += 1;
        Ok(id)
    }

    /// Returns a class with every property non-configurable, and every data
    /// property also non-writable.
    pub fn make_all_read_only(&mut self, current: ClassId) -> Result<ClassId, AllocError> {
        self.rewrite_all_flags(current, |flags| {
            flags.configurable = false;
            if !flags.accessor {
                flags.writable = false;
            }
        })
    }

    /// Returns a class with every property non-configurable.
    pub fn make_all_non_configurable(&mut self, current: ClassId) -> Result<ClassId, AllocError> {
        self.rewrite_all_flags(current, |flags| flags.configurable = false)
    }

    /// Applies `rewrite` to every property through `update_property_flags`,
    /// so the result is reached by transitions and shared. Returns `current`
    /// when no flag changes.
    fn rewrite_all_flags(
        &mut self,
        current: ClassId,
        rewrite: impl Fn(&mut PropertyFlags),
    ) -> Result<ClassId, AllocError> {
        let updates: Vec<(SymbolId, PropertyFlags)> = self
            .class(current)
            .properties
            .iter()
            .filter_map(|entry| {
                let mut flags = entry.desc.flags;
                rewrite(&mut flags);
                (flags != entry.desc.flags).then_some((entry.symbol, flags))
            })
            .collect();
        updates
            .into_iter()
            .try_fold(current, |class, (name, flags)| {
                self.update_property_flags(class, name, flags)
            })
    }
}

impl Default for HiddenClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}
