//! JavaScript object representation
//!
//! Provides the core JSObject type: a hidden class reference, exclusively
//! owned slot storage and a prototype link.

use core_types::{ObjectId, Value};

use crate::hidden_class::{ClassId, SlotIndex};
use crate::property_storage::PropertyStorage;

/// Index of a native function in the runtime's function table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionId(pub u32);

/// Object-level flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjectFlags {
    /// New properties may not be added.
    pub no_extend: bool,
    /// Set by `seal`: not extensible and all properties non-configurable.
    pub sealed: bool,
    /// Set by `freeze`: sealed and all data properties read-only.
    pub frozen: bool,
}

/// What kind of object this is, with any kind-specific payload.
#[derive(Debug, Clone)]
pub enum ObjectKind {
    /// Plain object.
    Ordinary,
    /// Callable object backed by a native function.
    Function(FunctionId),
    /// Array with dense element storage.
    Array(Vec<Value>),
    /// Wrapper around a primitive, as created when a primitive `this` is boxed.
    PrimitiveBox(Value),
    /// Getter/setter pair stored in the slot of an accessor property.
    Accessor {
        /// Getter function, if any.
        getter: Option<ObjectId>,
        /// Setter function, if any.
        setter: Option<ObjectId>,
    },
}

/// JavaScript object with hidden class-based property storage
#[derive(Debug, Clone)]
pub struct JSObject {
    /// The hidden class describing this object's named properties
    pub class: ClassId,
    /// Prototype link
    pub prototype: Option<ObjectId>,
    /// Extensibility flags
    pub flags: ObjectFlags,
    /// Kind-specific data
    pub kind: ObjectKind,
    storage: PropertyStorage,
}

impl JSObject {
    /// Creates an object with the given class, prototype and kind.
    pub fn new(class: ClassId, prototype: Option<ObjectId>, kind: ObjectKind) -> Self {
        Self {
            class,
            prototype,
            flags: ObjectFlags::default(),
            kind,
            storage: PropertyStorage::new(),
        }
    }

    /// Named property storage.
    pub fn storage(&self) -> &PropertyStorage {
        &self.storage
    }

    /// Mutable named property storage.
    pub fn storage_mut(&mut self) -> &mut PropertyStorage {
        &mut self.storage
    }

    /// Reads the value in a named property slot.
    #[inline]
    pub fn named_slot_value(&self, slot: SlotIndex) -> Value {
        self.storage.get(slot)
    }

    /// Writes the value in a named property slot.
    #[inline]
    pub fn set_named_slot_value(&mut self, slot: SlotIndex, value: Value) {
        self.storage.set(slot, value);
    }

    /// True if new properties may be added.
    pub fn is_extensible(&self) -> bool {
        !self.flags.no_extend
    }

    /// The native function backing this object, if it is callable.
    pub fn function_id(&self) -> Option<FunctionId> {
        match self.kind {
            ObjectKind::Function(id) => Some(id),
            _ => None,
        }
    }

    /// Dense elements of an array object.
    pub fn elements(&self) -> Option<&Vec<Value>> {
        match &self.kind {
            ObjectKind::Array(elements) => Some(elements),
            _ => None,
        }
    }

    /// Mutable dense elements of an array object.
    pub fn elements_mut(&mut self) -> Option<&mut Vec<Value>> {
        match &mut self.kind {
            ObjectKind::Array(elements) => Some(elements),
            _ => None,
        }
    }
}
