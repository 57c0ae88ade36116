//! Bytecode opcodes for property-access programs
//!
//! Defines the stack-based instruction set the interpreter executes. Every
//! named property access carries the identifier it names and the cache index
//! the emitter assigned to that static access site.

use std::fmt;

/// Register identifier for local variable slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegisterId(pub u32);

/// Index into a chunk's identifier list.
pub type IdentifierIndex = u32;

/// Index into a code block's property cache table.
pub type CacheIndex = u32;

/// Cache index telling the interpreter not to cache this access.
pub const PROPERTY_CACHING_DISABLED: CacheIndex = 0;

/// Bytecode opcodes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Opcode {
    // Literals
    /// Load constant from constant pool at given index
    LoadConstant(usize),
    /// Load undefined value
    LoadUndefined,
    /// Load the global object
    LoadGlobalObject,

    // Allocation
    /// Push a new empty object whose prototype is `Object.prototype`
    NewObject,
    /// Pop `n` values (first element deepest) and push a new array of them
    NewArray(u32),

    // Variables
    /// Load local variable from register
    LoadLocal(RegisterId),
    /// Pop top of stack into register
    StoreLocal(RegisterId),

    // Stack manipulation
    /// Duplicate top of stack
    Dup,
    /// Discard top of stack
    Pop,

    // Named property access
    /// Pop object, push `object.name`
    GetById {
        /// Property name
        name: IdentifierIndex,
        /// Cache site
        cache: CacheIndex,
    },
    /// Like `GetById`, but a missing property is a ReferenceError
    TryGetById {
        /// Property name
        name: IdentifierIndex,
        /// Cache site
        cache: CacheIndex,
    },
    /// Pop value and object, store `object.name = value`, push value
    PutById {
        /// Property name
        name: IdentifierIndex,
        /// Cache site
        cache: CacheIndex,
    },
    /// Like `PutById`, but creating the property in strict code is a
    /// ReferenceError
    TryPutById {
        /// Property name
        name: IdentifierIndex,
        /// Cache site
        cache: CacheIndex,
    },
    /// Pop setter, getter and object; define accessor `name` on the object
    PutOwnGetterSetter {
        /// Property name
        name: IdentifierIndex,
    },
    /// Pop object, push the result of `delete object.name`
    DeleteById(IdentifierIndex),

    // Computed property access
    /// Pop key and object, push `object[key]`
    GetByVal,
    /// Pop value, key and object, store `object[key] = value`, push value
    PutByVal,

    // Calls
    /// Pop `argc` arguments, `this` and callee; push the call result
    Call(u32),
    /// Return top of stack
    Return,
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opcode::LoadConstant(idx) => write!(f, "LoadConstant {}", idx),
            Opcode::LoadUndefined => write!(f, "LoadUndefined"),
            Opcode::LoadGlobalObject => write!(f, "LoadGlobalObject"),
            Opcode::NewObject => write!(f, "NewObject"),
            Opcode::NewArray(n) => write!(f, "NewArray {}", n),
            Opcode::LoadLocal(r) => write!(f, "LoadLocal r{}", r.0),
            Opcode::StoreLocal(r) => write!(f, "StoreLocal r{}", r.0),
            Opcode::Dup => write!(f, "Dup"),
            Opcode::Pop => write!(f, "Pop"),
            Opcode::GetById { name, cache } => write!(f, "GetById {}, cache {}", name, cache),
            Opcode::TryGetById { name, cache } => {
                write!(f, "TryGetById {}, cache {}", name, cache)
            }
            Opcode::PutById { name, cache } => write!(f, "PutById {}, cache {}", name, cache),
            Opcode::TryPutById { name, cache } => {
                write!(f, "TryPutById {}, cache {}", name, cache)
            }
            Opcode::PutOwnGetterSetter { name } => write!(f, "PutOwnGetterSetter {}", name),
            Opcode::DeleteById(name) => write!(f, "DeleteById {}", name),
            Opcode::GetByVal => write!(f, "GetByVal"),
            Opcode::PutByVal => write!(f, "PutByVal"),
            Opcode::Call(argc) => write!(f, "Call {}", argc),
            Opcode::Return => write!(f, "Return"),
        }
    }
}
