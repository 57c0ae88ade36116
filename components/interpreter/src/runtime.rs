//! Runtime state shared by the dispatcher and the dispatch loop
//!
//! A [`Runtime`] owns the object heap, the hidden class registry, the native
//! function table and the intrinsic objects (prototypes and the global
//! object). Property access itself lives in [`crate::property_access`].

use std::fmt;
use std::rc::Rc;

use core_types::{JsError, ObjectId, Value};
use memory_manager::{
    intern, ClassId, FunctionId, HiddenClassRegistry, JSObject, ObjectHeap, ObjectKind,
    PropertyFlags, SymbolId,
};
use tracing::debug;

use crate::config::RuntimeConfig;
use crate::error::VmResult;
use crate::property_access::{PropOpFlags, PropertyValue};
use crate::stats::PropertyAccessStats;

/// A host function callable from script.
///
/// Receives the runtime, the `this` value and the argument list.
pub type NativeFunction = Rc<dyn Fn(&mut Runtime, &Value, &[Value]) -> VmResult<Value>>;

/// Objects every runtime creates at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intrinsics {
    /// `Object.prototype`, the end of every prototype chain
    pub object_prototype: ObjectId,
    /// `Function.prototype`
    pub function_prototype: ObjectId,
    /// `Array.prototype`
    pub array_prototype: ObjectId,
    /// `Number.prototype`
    pub number_prototype: ObjectId,
    /// `String.prototype`
    pub string_prototype: ObjectId,
    /// `Boolean.prototype`
    pub boolean_prototype: ObjectId,
    /// The global object
    pub global: ObjectId,
}

/// Heap, classes and intrinsics of one JavaScript realm
pub struct Runtime {
    pub(crate) heap: ObjectHeap,
    pub(crate) classes: HiddenClassRegistry,
    natives: Vec<NativeFunction>,
    intrinsics: Intrinsics,
    pub(crate) config: RuntimeConfig,
    pub(crate) stats: PropertyAccessStats,
    pub(crate) length_symbol: SymbolId,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("objects", &self.heap.len())
            .field("classes", &self.classes.class_count())
            .field("natives", &self.natives.len())
            .field("intrinsics", &self.intrinsics)
            .field("config", &self.config)
            .finish()
    }
}

impl Runtime {
    /// Create a runtime with the default configuration
    pub fn new() -> VmResult<Self> {
        Self::with_config(RuntimeConfig::default())
    }

    /// Create a runtime with the given configuration
    pub fn with_config(config: RuntimeConfig) -> VmResult<Self> {
        let mut heap = ObjectHeap::new();
        let classes = HiddenClassRegistry::with_policy(config.dictionary);
        let root = classes.root_class();

        let object_prototype = heap.allocate(JSObject::new(root, None, ObjectKind::Ordinary))?;
        let proto = Some(object_prototype);
        let function_prototype = heap.allocate(JSObject::new(root, proto, ObjectKind::Ordinary))?;
        let array_prototype =
            heap.allocate(JSObject::new(root, proto, ObjectKind::Array(Vec::new())))?;
        let number_prototype = heap.allocate(JSObject::new(
            root,
            proto,
            ObjectKind::PrimitiveBox(Value::Smi(0)),
        ))?;
        let string_prototype = heap.allocate(JSObject::new(
            root,
            proto,
            ObjectKind::PrimitiveBox(Value::string("")),
        ))?;
        let boolean_prototype = heap.allocate(JSObject::new(
            root,
            proto,
            ObjectKind::PrimitiveBox(Value::Boolean(false)),
        ))?;
        let global = heap.allocate(JSObject::new(root, proto, ObjectKind::Ordinary))?;

        let intrinsics = Intrinsics {
            object_prototype,
            function_prototype,
            array_prototype,
            number_prototype,
            string_prototype,
            boolean_prototype,
            global,
        };
        debug!(
            cache_entries = config.cache_entries(),
            max_properties = config.dictionary.max_properties,
            max_transitions = config.dictionary.max_transitions,
            "runtime initialised"
        );

        let mut runtime = Self {
            heap,
            classes,
            natives: Vec::new(),
            intrinsics,
            config,
            stats: PropertyAccessStats::new(),
            length_symbol: intern("length"),
        };
        runtime.install_array_length(array_prototype)?;
        Ok(runtime)
    }

    /// The intrinsic objects
    pub fn intrinsics(&self) -> &Intrinsics {
        &self.intrinsics
    }

    /// The configuration this runtime was created with
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// The object heap
    pub fn heap(&self) -> &ObjectHeap {
        &self.heap
    }

    /// The hidden class registry
    pub fn classes(&self) -> &HiddenClassRegistry {
        &self.classes
    }

    /// Property access counters collected so far
    pub fn stats(&self) -> PropertyAccessStats {
        self.stats
    }

    /// Zero the property access counters
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Current hidden class of an object
    pub fn class_of(&self, object: ObjectId) -> ClassId {
        self.heap.get(object).class
    }

    /// Allocate an empty object inheriting from `Object.prototype`
    pub fn new_object(&mut self) -> VmResult<ObjectId> {
        self.new_object_with_prototype(Some(self.intrinsics.object_prototype))
    }

    /// Allocate an empty object with the given prototype
    pub fn new_object_with_prototype(&mut self, prototype: Option<ObjectId>) -> VmResult<ObjectId> {
        let root = self.classes.root_class();
        Ok(self
            .heap
            .allocate(JSObject::new(root, prototype, ObjectKind::Ordinary))?)
    }

    /// Allocate a dense array holding `elements`
    pub fn new_array(&mut self, elements: Vec<Value>) -> VmResult<ObjectId> {
        let root = self.classes.root_class();
        let id = self.heap.allocate(JSObject::new(
            root,
            Some(self.intrinsics.array_prototype),
            ObjectKind::Array(elements),
        ))?;
        self.install_array_length(id)?;
        Ok(id)
    }

    fn install_array_length(&mut self, array: ObjectId) -> VmResult<()> {
        let len = self.heap.get(array).elements().map_or(0, Vec::len);
        let flags = PropertyFlags {
            enumerable: false,
            writable: true,
            configurable: false,
            accessor: false,
            internal_setter: true,
        };
        self.add_own_property(
            array,
            self.length_symbol,
            flags,
            Value::number(len as f64),
        )
    }

    /// Register a native function and allocate the function object for it
    pub fn new_function<F>(&mut self, function: F) -> VmResult<ObjectId>
    where
        F: Fn(&mut Runtime, &Value, &[Value]) -> VmResult<Value> + 'static,
    {
        let id = u32::try_from(self.natives.len())
            .map(FunctionId)
            .map_err(|_| JsError::range_error("too many native functions"))?;
        self.natives.push(Rc::new(function));
        let root = self.classes.root_class();
        Ok(self.heap.allocate(JSObject::new(
            root,
            Some(self.intrinsics.function_prototype),
            ObjectKind::Function(id),
        ))?)
    }

    /// True if `value` can be called
    pub fn is_callable(&self, value: &Value) -> bool {
        value
            .as_object()
            .and_then(|id| self.heap.get(id).function_id())
            .is_some()
    }

    /// Call `callee` with the given `this` and arguments
    pub fn call(&mut self, callee: &Value, this: &Value, args: &[Value]) -> VmResult<Value> {
        let function = callee
            .as_object()
            .and_then(|id| self.heap.get(id).function_id())
            .and_then(|f| self.natives.get(f.0 as usize).cloned())
            .ok_or_else(|| JsError::type_error(format!("{} is not a function", callee.type_of())))?;
        function(self, this, args)
    }

    /// The prototype a primitive value's property lookups start from
    pub fn primitive_prototype(&self, value: &Value) -> Option<ObjectId> {
        match value {
            Value::Boolean(_) => Some(self.intrinsics.boolean_prototype),
            Value::Smi(_) | Value::Double(_) => Some(self.intrinsics.number_prototype),
            Value::String(_) => Some(self.intrinsics.string_prototype),
            Value::Object(_) | Value::Undefined | Value::Null => None,
        }
    }

    /// Wrap a primitive in a fresh wrapper object.
    ///
    /// Only accessor invocations on primitive receivers need this; plain
    /// reads and writes never materialize a wrapper.
    pub fn box_primitive(&mut self, value: &Value) -> VmResult<ObjectId> {
        if let Value::Object(id) = value {
            return Ok(*id);
        }
        let prototype = self.primitive_prototype(value).ok_or_else(|| {
            JsError::type_error(format!("cannot convert {} to object", value))
        })?;
        let root = self.classes.root_class();
        Ok(self.heap.allocate(JSObject::new(
            root,
            Some(prototype),
            ObjectKind::PrimitiveBox(value.clone()),
        ))?)
    }

    /// Read a property of the global object
    pub fn get_global(&mut self, name: &str) -> VmResult<Value> {
        let global = Value::Object(self.intrinsics.global);
        self.get_property(&global, intern(name), PropOpFlags::default())
    }

    /// Define or overwrite a writable, enumerable, configurable global
    pub fn set_global(&mut self, name: &str, value: Value) -> VmResult<()> {
        self.define_own_property(
            self.intrinsics.global,
            intern(name),
            PropertyFlags::default_new_named(),
            PropertyValue::Data(value),
        )
    }
}
