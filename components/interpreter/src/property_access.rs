//! Property access dispatcher
//!
//! `get_by_id`/`put_by_id` first probe the access site's inline cache. On a
//! miss, or when the receiver is not an object, the dispatcher resolves the
//! name against the receiver's hidden class and prototype chain, invokes
//! accessors, boxes primitives for accessor calls and adds new properties.
//!
//! Only non-dictionary classes are ever cached. Reads cache plain data
//! properties found on the receiver or its direct prototype; writes cache
//! writable data properties without an internal setter. Errors never touch
//! the cache.

use core_types::{to_array_index, JsError, ObjectId, Value};
use memory_manager::{
    intern, symbol_display, symbol_name, AllocError, ClassId, JSObject, NamedPropertyDescriptor,
    ObjectKind, PropertyFlags, SlotIndex, SymbolId,
};
use tracing::trace;

use crate::error::{VmError, VmResult};
use crate::inline_cache::InlineCache;
use crate::runtime::Runtime;

/// Modifiers for a single property operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropOpFlags {
    /// A read that finds nothing is a ReferenceError; in strict code a write
    /// that would create the property is a ReferenceError too
    pub must_exist: bool,
    /// Failed writes, deletes and definitions throw instead of failing
    /// silently (strict mode)
    pub throw_on_error: bool,
}

impl PropOpFlags {
    /// Flags for an access in strict or sloppy code
    pub const fn strict(strict: bool) -> Self {
        Self {
            must_exist: false,
            throw_on_error: strict,
        }
    }

    /// The same flags with `must_exist` set
    pub const fn with_must_exist(self) -> Self {
        Self {
            must_exist: true,
            ..self
        }
    }
}

/// Value side of a property definition
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Plain data property
    Data(Value),
    /// Getter/setter pair; either half may be absent
    Accessor {
        /// Getter function
        getter: Option<ObjectId>,
        /// Setter function
        setter: Option<ObjectId>,
    },
}

/// Where a name resolved along a prototype chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyLookup {
    /// Data property on `owner`, `depth` steps up the chain
    Data {
        /// Object holding the property
        owner: ObjectId,
        /// Slot and flags
        desc: NamedPropertyDescriptor,
        /// 0 for an own property, 1 for the direct prototype
        depth: u32,
    },
    /// Accessor property on `owner`
    Accessor {
        /// Object holding the property
        owner: ObjectId,
        /// Slot of the accessor cell and flags
        desc: NamedPropertyDescriptor,
    },
    /// Not found anywhere on the chain
    NotFound,
}

fn fail(flags: PropOpFlags, error: impl FnOnce() -> JsError) -> VmResult<()> {
    if flags.throw_on_error {
        Err(error().into())
    } else {
        Ok(())
    }
}

fn precondition_violated(receiver: &Value, name: &str) -> VmError {
    JsError::type_error(format!(
        "precondition violated: cannot access property '{}' of {}",
        name, receiver
    ))
    .into()
}

fn not_extensible(name: &str) -> JsError {
    JsError::type_error(format!(
        "Cannot add property '{}', object is not extensible",
        name
    ))
}

fn read_only(name: &str) -> JsError {
    JsError::type_error(format!("Cannot assign to read-only property '{}'", name))
}

impl Runtime {
    /// Resolve `name` starting at `start` and walking the prototype chain
    pub fn lookup_property(&self, start: ObjectId, name: SymbolId) -> PropertyLookup {
        let mut current = Some(start);
        let mut depth = 0;
        while let Some(id) = current {
            let object = self.heap.get(id);
            if let Some(desc) = self.classes.lookup_own(object.class, name) {
                return if desc.flags.accessor {
                    PropertyLookup::Accessor { owner: id, desc }
                } else {
                    PropertyLookup::Data {
                        owner: id,
                        desc,
                        depth,
                    }
                };
            }
            current = object.prototype;
            depth += 1;
        }
        PropertyLookup::NotFound
    }

    fn symbol_array_index(name: SymbolId) -> Option<u32> {
        symbol_name(name).and_then(|s| to_array_index(&s))
    }

    fn populate_cache(
        &mut self,
        entry: &mut InlineCache,
        class: ClassId,
        slot: SlotIndex,
        write: bool,
    ) {
        if self.classes.is_dictionary(class) {
            return;
        }
        let evicted = entry.populate(class, slot, self.config.cache_entries());
        if evicted {
            let counters = if write {
                &mut self.stats.writes
            } else {
                &mut self.stats.reads
            };
            counters.evictions += 1;
        }
    }

    fn accessor_pair(
        &self,
        owner: ObjectId,
        slot: SlotIndex,
    ) -> (Option<ObjectId>, Option<ObjectId>) {
        let cell = self.heap.get(owner).named_slot_value(slot);
        match cell.as_object().map(|id| &self.heap.get(id).kind) {
            Some(ObjectKind::Accessor { getter, setter }) => (*getter, *setter),
            _ => (None, None),
        }
    }

    fn invoke_getter(&mut self, owner: ObjectId, slot: SlotIndex, this: &Value) -> VmResult<Value> {
        match self.accessor_pair(owner, slot).0 {
            Some(getter) => self.call(&Value::Object(getter), this, &[]),
            None => Ok(Value::Undefined),
        }
    }

    fn invoke_setter(
        &mut self,
        owner: ObjectId,
        slot: SlotIndex,
        this: &Value,
        value: Value,
        name: SymbolId,
        flags: PropOpFlags,
    ) -> VmResult<()> {
        match self.accessor_pair(owner, slot).1 {
            Some(setter) => self
                .call(&Value::Object(setter), this, &[value])
                .map(|_| ()),
            None => fail(flags, || {
                JsError::type_error(format!(
                    "Cannot assign to property '{}' which has only a getter",
                    symbol_display(name)
                ))
            }),
        }
    }

    fn not_found(name: SymbolId, flags: PropOpFlags) -> VmResult<Value> {
        if flags.must_exist {
            return Err(JsError::reference_error(format!(
                "Property '{}' doesn't exist",
                symbol_display(name)
            ))
            .into());
        }
        Ok(Value::Undefined)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Read `receiver.name` through the cache site `cache`.
    ///
    /// Passing `None` disables caching for this access.
    #[inline]
    pub fn get_by_id(
        &mut self,
        cache: Option<&mut InlineCache>,
        receiver: &Value,
        name: SymbolId,
        flags: PropOpFlags,
    ) -> VmResult<Value> {
        if let (Some(entry), Value::Object(id)) = (cache.as_deref(), receiver) {
            let object = self.heap.get(*id);
            if let Some(slot) = entry.probe(object.class) {
                self.stats.reads.cache_hits += 1;
                return Ok(object.named_slot_value(slot));
            }
            if let Some(proto) = object.prototype {
                let proto_object = self.heap.get(proto);
                if let Some(slot) = entry.probe(proto_object.class) {
                    if object.elements().is_none()
                        && self.classes.lookup_own(object.class, name).is_none()
                    {
                        self.stats.reads.proto_cache_hits += 1;
                        return Ok(proto_object.named_slot_value(slot));
                    }
                }
            }
        }
        self.get_property_impl(receiver, name, flags, cache)
    }

    /// Read `receiver.name` without an inline cache
    pub fn get_property(
        &mut self,
        receiver: &Value,
        name: SymbolId,
        flags: PropOpFlags,
    ) -> VmResult<Value> {
        self.get_property_impl(receiver, name, flags, None)
    }

    fn get_property_impl(
        &mut self,
        receiver: &Value,
        name: SymbolId,
        flags: PropOpFlags,
        cache: Option<&mut InlineCache>,
    ) -> VmResult<Value> {
        match receiver {
            Value::Object(id) => {
                if self.heap.get(*id).elements().is_some() {
                    if let Some(index) = Self::symbol_array_index(name) {
                        return self.get_indexed(*id, index);
                    }
                }
                self.get_named(*id, name, flags, cache)
            }
            Value::Undefined | Value::Null => {
                Err(precondition_violated(receiver, &symbol_display(name)))
            }
            _ => self.get_transient(receiver, name, flags),
        }
    }

    fn get_named(
        &mut self,
        obj: ObjectId,
        name: SymbolId,
        flags: PropOpFlags,
        cache: Option<&mut InlineCache>,
    ) -> VmResult<Value> {
        self.stats.reads.slow_paths += 1;
        match self.lookup_property(obj, name) {
            PropertyLookup::Data { owner, desc, depth } => {
                let owner_object = self.heap.get(owner);
                let owner_class = owner_object.class;
                let value = owner_object.named_slot_value(desc.slot);
                if depth == 0 {
                    self.stats.reads.own_fast_paths += 1;
                }
                if depth <= 1 {
                    if let Some(entry) = cache {
                        self.populate_cache(entry, owner_class, desc.slot, false);
                    }
                }
                Ok(value)
            }
            PropertyLookup::Accessor { owner, desc } => {
                trace!(object = obj.0, name = name.0, "invoking getter");
                self.invoke_getter(owner, desc.slot, &Value::Object(obj))
            }
            PropertyLookup::NotFound => Self::not_found(name, flags),
        }
    }

    fn get_transient(
        &mut self,
        receiver: &Value,
        name: SymbolId,
        flags: PropOpFlags,
    ) -> VmResult<Value> {
        self.stats.reads.transient += 1;
        if let Value::String(s) = receiver {
            if name == self.length_symbol {
                return Ok(Value::number(s.encode_utf16().count() as f64));
            }
            if let Some(index) = Self::symbol_array_index(name) {
                if let Some(unit) = s.encode_utf16().nth(index as usize) {
                    return Ok(Value::string(&String::from_utf16_lossy(&[unit])));
                }
            }
        }
        let proto = self
            .primitive_prototype(receiver)
            .ok_or_else(|| precondition_violated(receiver, &symbol_display(name)))?;
        match self.lookup_property(proto, name) {
            PropertyLookup::Data { owner, desc, .. } => {
                Ok(self.heap.get(owner).named_slot_value(desc.slot))
            }
            PropertyLookup::Accessor { owner, desc } => {
                let this = Value::Object(self.box_primitive(receiver)?);
                self.invoke_getter(owner, desc.slot, &this)
            }
            PropertyLookup::NotFound => Self::not_found(name, flags),
        }
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Store `receiver.name = value` through the cache site `cache`.
    ///
    /// `flags.throw_on_error` selects strict mode semantics.
    #[inline]
    pub fn put_by_id(
        &mut self,
        cache: Option<&mut InlineCache>,
        receiver: &Value,
        name: SymbolId,
        value: Value,
        flags: PropOpFlags,
    ) -> VmResult<()> {
        if let (Some(entry), Value::Object(id)) = (cache.as_deref(), receiver) {
            let object = self.heap.get_mut(*id);
            if let Some(slot) = entry.probe(object.class) {
                object.set_named_slot_value(slot, value);
                self.stats.writes.cache_hits += 1;
                return Ok(());
            }
        }
        self.put_property_impl(receiver, name, value, flags, cache)
    }

    /// Store `receiver.name = value` without an inline cache
    pub fn put_property(
        &mut self,
        receiver: &Value,
        name: SymbolId,
        value: Value,
        flags: PropOpFlags,
    ) -> VmResult<()> {
        self.put_property_impl(receiver, name, value, flags, None)
    }

    fn put_property_impl(
        &mut self,
        receiver: &Value,
        name: SymbolId,
        value: Value,
        flags: PropOpFlags,
        cache: Option<&mut InlineCache>,
    ) -> VmResult<()> {
        match receiver {
            Value::Object(id) => {
                if self.heap.get(*id).elements().is_some() {
                    if let Some(index) = Self::symbol_array_index(name) {
                        return self.put_indexed(*id, index, value, flags);
                    }
                }
                self.put_named(*id, name, value, flags, cache)
            }
            Value::Undefined | Value::Null => {
                Err(precondition_violated(receiver, &symbol_display(name)))
            }
            _ => self.put_transient(receiver, name, value, flags),
        }
    }

    fn put_named(
        &mut self,
        obj: ObjectId,
        name: SymbolId,
        value: Value,
        flags: PropOpFlags,
        cache: Option<&mut InlineCache>,
    ) -> VmResult<()> {
        self.stats.writes.slow_paths += 1;
        let class = self.heap.get(obj).class;

        if let Some(desc) = self.classes.lookup_own(class, name) {
            if desc.flags.accessor {
                trace!(object = obj.0, name = name.0, "invoking setter");
                return self.invoke_setter(obj, desc.slot, &Value::Object(obj), value, name, flags);
            }
            if !desc.flags.writable {
                return fail(flags, || read_only(&symbol_display(name)));
            }
            if desc.flags.internal_setter {
                return self.internal_set(obj, name, desc, value, flags);
            }
            self.heap.get_mut(obj).set_named_slot_value(desc.slot, value);
            self.stats.writes.own_fast_paths += 1;
            if let Some(entry) = cache {
                self.populate_cache(entry, class, desc.slot, true);
            }
            return Ok(());
        }

        if let Some(proto) = self.heap.get(obj).prototype {
            match self.lookup_property(proto, name) {
                PropertyLookup::Accessor { owner, desc } => {
                    trace!(object = obj.0, name = name.0, "invoking inherited setter");
                    return self.invoke_setter(
                        owner,
                        desc.slot,
                        &Value::Object(obj),
                        value,
                        name,
                        flags,
                    );
                }
                PropertyLookup::Data { desc, .. } if !desc.flags.writable => {
                    return fail(flags, || read_only(&symbol_display(name)));
                }
                _ => {}
            }
        }

        if flags.must_exist && flags.throw_on_error {
            return Err(JsError::reference_error(format!(
                "Property '{}' doesn't exist",
                symbol_display(name)
            ))
            .into());
        }
        if !self.heap.get(obj).is_extensible() {
            return fail(flags, || not_extensible(&symbol_display(name)));
        }
        self.add_own_property(obj, name, PropertyFlags::default_new_named(), value)
    }

    fn put_transient(
        &mut self,
        receiver: &Value,
        name: SymbolId,
        value: Value,
        flags: PropOpFlags,
    ) -> VmResult<()> {
        self.stats.writes.transient += 1;
        let proto = self
            .primitive_prototype(receiver)
            .ok_or_else(|| precondition_violated(receiver, &symbol_display(name)))?;
        match self.lookup_property(proto, name) {
            PropertyLookup::Accessor { owner, desc } => {
                let this = Value::Object(self.box_primitive(receiver)?);
                self.invoke_setter(owner, desc.slot, &this, value, name, flags)
            }
            _ => fail(flags, || {
                JsError::type_error(format!(
                    "Cannot create property '{}' on {} '{}'",
                    symbol_display(name),
                    receiver.type_of(),
                    receiver
                ))
            }),
        }
    }

    /// Store through a property flagged `internal_setter`.
    fn internal_set(
        &mut self,
        obj: ObjectId,
        name: SymbolId,
        desc: NamedPropertyDescriptor,
        value: Value,
        flags: PropOpFlags,
    ) -> VmResult<()> {
        if name == self.length_symbol && self.heap.get(obj).elements().is_some() {
            return self.set_array_length(obj, &value, flags);
        }
        self.heap.get_mut(obj).set_named_slot_value(desc.slot, value);
        Ok(())
    }

    /// Store to the `length` of array `obj`.
    ///
    /// Shrinking truncates dense storage and deletes indexed properties past
    /// the new end. Growing only records the new length; elements are
    /// materialised by later stores.
    fn set_array_length(
        &mut self,
        obj: ObjectId,
        value: &Value,
        flags: PropOpFlags,
    ) -> VmResult<()> {
        let new_len = match value.as_number() {
            Some(n) if n >= 0.0 && n.fract() == 0.0 && n <= f64::from(u32::MAX) => n as usize,
            _ => return Err(JsError::range_error("Invalid array length").into()),
        };
        let old_len = self.array_length(obj);
        let object = self.heap.get_mut(obj);
        let extensible = object.is_extensible();
        let Some(elements) = object.elements_mut() else {
            return Ok(());
        };
        if new_len > old_len && !extensible {
            return fail(flags, || not_extensible(&new_len.to_string()));
        }
        elements.truncate(new_len);

        if new_len < old_len {
            let stale: Vec<SymbolId> = self
                .classes
                .own_properties(self.heap.get(obj).class)
                .map(|(name, _)| name)
                .filter(|&name| {
                    Self::symbol_array_index(name).is_some_and(|i| i as usize >= new_len)
                })
                .collect();
            for name in stale {
                self.delete_own_named(obj, name, flags)?;
            }
        }
        self.write_array_length(obj, new_len);
        Ok(())
    }

    /// Value of the `length` slot of array `obj`
    fn array_length(&self, obj: ObjectId) -> usize {
        let object = self.heap.get(obj);
        self.classes
            .lookup_own(object.class, self.length_symbol)
            .and_then(|desc| object.named_slot_value(desc.slot).as_number())
            .map_or(0, |n| n as usize)
    }

    fn write_array_length(&mut self, obj: ObjectId, len: usize) {
        let class = self.heap.get(obj).class;
        if let Some(desc) = self.classes.lookup_own(class, self.length_symbol) {
            self.heap
                .get_mut(obj)
                .set_named_slot_value(desc.slot, Value::number(len as f64));
        }
    }

    /// Give `obj` the new own property `name`.
    ///
    /// Moves the object to the class the registry returns and grows its
    /// storage when the new slot is past the current capacity.
    pub(crate) fn add_own_property(
        &mut self,
        obj: ObjectId,
        name: SymbolId,
        flags: PropertyFlags,
        value: Value,
    ) -> VmResult<()> {
        let class = self.heap.get(obj).class;
        let (next, desc) = self.classes.class_for_new_property(class, name, flags)?;
        let object = self.heap.get_mut(obj);
        object.storage_mut().ensure_capacity(desc.slot as usize + 1)?;
        object.class = next;
        object.set_named_slot_value(desc.slot, value);
        trace!(
            object = obj.0,
            from = class.0,
            to = next.0,
            slot = desc.slot,
            "added property"
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Definitions, deletion and integrity levels
    // ------------------------------------------------------------------

    /// Define (or redefine) own property `name` of `obj` with exactly the
    /// given flags. The `accessor` flag is derived from `value`.
    ///
    /// Redefining an accessor with one half absent keeps that half from the
    /// existing accessor.
    pub fn define_own_property(
        &mut self,
        obj: ObjectId,
        name: SymbolId,
        flags: PropertyFlags,
        value: PropertyValue,
    ) -> VmResult<()> {
        let flags = match value {
            PropertyValue::Data(_) => PropertyFlags {
                accessor: false,
                ..flags
            },
            PropertyValue::Accessor { .. } => PropertyFlags {
                accessor: true,
                writable: false,
                ..flags
            },
        };
        let class = self.heap.get(obj).class;
        let existing = self.classes.lookup_own(class, name);

        if let Some(desc) = existing {
            if !desc.flags.configurable {
                let unchanged_value = match &value {
                    PropertyValue::Data(v) => {
                        !desc.flags.accessor
                            && (desc.flags.writable
                                || self.heap.get(obj).named_slot_value(desc.slot) == *v)
                    }
                    PropertyValue::Accessor { .. } => false,
                };
                if desc.flags != flags || !unchanged_value {
                    return Err(JsError::type_error(format!(
                        "Cannot redefine property: {}",
                        symbol_display(name)
                    ))
                    .into());
                }
            }
        } else if !self.heap.get(obj).is_extensible() {
            return Err(not_extensible(&symbol_display(name)).into());
        }

        let slot_value = match value {
            PropertyValue::Data(v) => v,
            PropertyValue::Accessor { getter, setter } => {
                let (old_getter, old_setter) = match existing {
                    Some(desc) if desc.flags.accessor => self.accessor_pair(obj, desc.slot),
                    _ => (None, None),
                };
                let root = self.classes.root_class();
                let cell = self.heap.allocate(JSObject::new(
                    root,
                    None,
                    ObjectKind::Accessor {
                        getter: getter.or(old_getter),
                        setter: setter.or(old_setter),
                    },
                ))?;
                Value::Object(cell)
            }
        };

        match existing {
            Some(desc) => {
                let next = self.classes.update_property_flags(class, name, flags)?;
                let object = self.heap.get_mut(obj);
                object.class = next;
                object.set_named_slot_value(desc.slot, slot_value);
                Ok(())
            }
            None => self.add_own_property(obj, name, flags, slot_value),
        }
    }

    /// `delete receiver.name`. Returns false when a non-configurable
    /// property refuses deletion in sloppy mode.
    pub fn delete_named(
        &mut self,
        receiver: &Value,
        name: SymbolId,
        flags: PropOpFlags,
    ) -> VmResult<bool> {
        let obj = match receiver {
            Value::Object(id) => *id,
            Value::Undefined | Value::Null => {
                return Err(precondition_violated(receiver, &symbol_display(name)))
            }
            _ => return Ok(true),
        };

        if self.heap.get(obj).elements().is_some() {
            if let Some(index) = Self::symbol_array_index(name) {
                return self.delete_element(obj, index, flags);
            }
        }

        self.delete_own_named(obj, name, flags)
    }

    fn delete_element(&mut self, obj: ObjectId, index: u32, flags: PropOpFlags) -> VmResult<bool> {
        let object = self.heap.get_mut(obj);
        let sealed = object.flags.sealed;
        let Some(elements) = object.elements_mut() else {
            return Ok(true);
        };
        let Some(element) = elements.get_mut(index as usize) else {
            let name = intern(&index.to_string());
            return self.delete_own_named(obj, name, flags);
        };
        if sealed {
            fail(flags, || {
                JsError::type_error(format!("Property '{}' is not configurable", index))
            })?;
            return Ok(false);
        }
        *element = Value::Undefined;
        Ok(true)
    }

    fn delete_own_named(
        &mut self,
        obj: ObjectId,
        name: SymbolId,
        flags: PropOpFlags,
    ) -> VmResult<bool> {
        let class = self.heap.get(obj).class;
        let Some(desc) = self.classes.lookup_own(class, name) else {
            return Ok(true);
        };
        if !desc.flags.configurable {
            fail(flags, || {
                JsError::type_error(format!(
                    "Property '{}' is not configurable",
                    symbol_display(name)
                ))
            })?;
            return Ok(false);
        }
        let (next, freed) = self.classes.delete_property(class, name)?;
        let object = self.heap.get_mut(obj);
        object.class = next;
        if let Some(slot) = freed {
            object.set_named_slot_value(slot, Value::Undefined);
        }
        trace!(object = obj.0, name = name.0, class = next.0, "deleted property");
        Ok(true)
    }

    /// True if `name` is found on `obj` or its prototype chain
    pub fn has_property(&self, obj: ObjectId, name: SymbolId) -> bool {
        if self.has_element(obj, name) {
            return true;
        }
        self.lookup_property(obj, name) != PropertyLookup::NotFound
    }

    /// True if `name` is an own property of `obj`
    pub fn has_own_property(&self, obj: ObjectId, name: SymbolId) -> bool {
        self.has_element(obj, name)
            || self
                .classes
                .lookup_own(self.heap.get(obj).class, name)
                .is_some()
    }

    fn has_element(&self, obj: ObjectId, name: SymbolId) -> bool {
        match self.heap.get(obj).elements() {
            Some(elements) => Self::symbol_array_index(name)
                .map_or(false, |index| (index as usize) < elements.len()),
            None => false,
        }
    }

    /// Own property names of `obj`: array indices first, then named
    /// properties in insertion order
    pub fn own_property_keys(&self, obj: ObjectId, only_enumerable: bool) -> Vec<SymbolId> {
        let object = self.heap.get(obj);
        let mut keys: Vec<SymbolId> = object
            .elements()
            .map(|elements| (0..elements.len()).map(|i| intern(&i.to_string())).collect())
            .unwrap_or_default();
        keys.extend(
            self.classes
                .own_properties(object.class)
                .filter(|(_, desc)| !only_enumerable || desc.flags.enumerable)
                .map(|(name, _)| name),
        );
        keys
    }

    /// Forbid adding properties to `obj`
    pub fn prevent_extensions(&mut self, obj: ObjectId) {
        self.heap.get_mut(obj).flags.no_extend = true;
    }

    /// `Object.seal`: not extensible, every property non-configurable
    pub fn seal(&mut self, obj: ObjectId) -> VmResult<()> {
        let class = self.heap.get(obj).class;
        let next = self.classes.make_all_non_configurable(class)?;
        let object = self.heap.get_mut(obj);
        object.class = next;
        object.flags.no_extend = true;
        object.flags.sealed = true;
        Ok(())
    }

    /// `Object.freeze`: sealed and every data property read-only
    pub fn freeze(&mut self, obj: ObjectId) -> VmResult<()> {
        let class = self.heap.get(obj).class;
        let next = self.classes.make_all_read_only(class)?;
        let object = self.heap.get_mut(obj);
        object.class = next;
        object.flags.no_extend = true;
        object.flags.sealed = true;
        object.flags.frozen = true;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Computed and indexed access
    // ------------------------------------------------------------------

    /// Read `receiver[key]`
    pub fn get_by_val(
        &mut self,
        receiver: &Value,
        key: &Value,
        flags: PropOpFlags,
    ) -> VmResult<Value> {
        if let (Value::Object(id), Some(index)) = (receiver, key.to_array_index()) {
            if self.heap.get(*id).elements().is_some() {
                return self.get_indexed(*id, index);
            }
        }
        let name = intern(&key.to_property_key());
        self.get_property(receiver, name, flags)
    }

    /// Store `receiver[key] = value`
    pub fn put_by_val(
        &mut self,
        receiver: &Value,
        key: &Value,
        value: Value,
        flags: PropOpFlags,
    ) -> VmResult<()> {
        if let (Value::Object(id), Some(index)) = (receiver, key.to_array_index()) {
            if self.heap.get(*id).elements().is_some() {
                return self.put_indexed(*id, index, value, flags);
            }
        }
        let name = intern(&key.to_property_key());
        self.put_property(receiver, name, value, flags)
    }

    /// Read element `index`, from dense storage when the object is a fast
    /// array holding it, otherwise through the named path
    pub fn get_indexed(&mut self, obj: ObjectId, index: u32) -> VmResult<Value> {
        if let Some(value) = self
            .heap
            .get(obj)
            .elements()
            .and_then(|elements| elements.get(index as usize))
        {
            return Ok(value.clone());
        }
        let name = intern(&index.to_string());
        self.get_named(obj, name, PropOpFlags::default(), None)
    }

    /// Store element `index`.
    ///
    /// Fast arrays take the store into dense storage when the index is in
    /// range or at most `fast_array_max_gap` past the end; anything else goes
    /// through the named path.
    pub fn put_indexed(
        &mut self,
        obj: ObjectId,
        index: u32,
        value: Value,
        flags: PropOpFlags,
    ) -> VmResult<()> {
        let max_gap = self.config.fast_array_max_gap as usize;
        let length = self
            .heap
            .get(obj)
            .elements()
            .map(|_| self.array_length(obj));
        let object = self.heap.get_mut(obj);
        let frozen = object.flags.frozen;
        let extensible = object.is_extensible();
        if let Some(elements) = object.elements_mut() {
            let index = index as usize;
            let len = elements.len();
            if index < len {
                if frozen {
                    return fail(flags, || read_only(&index.to_string()));
                }
                elements[index] = value;
                return Ok(());
            }
            if index - len <= max_gap {
                if !extensible {
                    return fail(flags, || not_extensible(&index.to_string()));
                }
                elements
                    .try_reserve(index + 1 - len)
                    .map_err(|_| AllocError::ElementGrowth(index + 1))?;
                elements.resize(index, Value::Undefined);
                elements.push(value);
                if length.is_some_and(|length| index >= length) {
                    self.write_array_length(obj, index + 1);
                }
                return Ok(());
            }
        }
        let name = intern(&index.to_string());
        self.put_named(obj, name, value, flags, None)?;
        let grows = length.is_some_and(|length| index as usize >= length);
        if grows && self.has_own_property(obj, name) {
            self.write_array_length(obj, index as usize + 1);
        }
        Ok(())
    }
}
