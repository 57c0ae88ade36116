//! Memory Manager - object layout and heap management
//!
//! This component provides:
//! - The identifier table that interns property names into symbols
//! - Hidden classes (shapes) and their transition graph
//! - Per-object property storage with inline and overflow slots
//! - The object heap the runtime allocates into

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod heap;
pub mod hidden_class;
pub mod identifier_table;
pub mod object;
pub mod property_storage;

// Re-export main types
pub use error::AllocError;
pub use heap::{HeapStats, ObjectHeap};
pub use hidden_class::{
    ClassId, DictionaryPolicy, HiddenClass, HiddenClassRegistry, NamedPropertyDescriptor,
    PropertyFlags, SlotIndex,
};
pub use identifier_table::{intern, symbol_display, symbol_name, IdentifierTable, SymbolId};
pub use object::{FunctionId, JSObject, ObjectFlags, ObjectKind};
pub use property_storage::{PropertyStorage, DIRECT_PROPERTY_SLOTS};
