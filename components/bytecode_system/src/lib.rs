//! Bytecode system for property-access programs
//!
//! This crate stands in for the bytecode emitter: it defines the instruction
//! set the interpreter runs and assigns one property cache index per static
//! named-access instruction.
//!
//! # Example
//!
//! ```
//! use bytecode_system::{BytecodeChunk, Opcode, Value};
//!
//! let mut chunk = BytecodeChunk::new();
//!
//! // var x = {}; x.foo = 5; return x.foo;
//! let five = chunk.add_constant(Value::Number(5.0));
//! chunk.emit(Opcode::NewObject);
//! chunk.emit(Opcode::Dup);
//! chunk.emit(Opcode::LoadConstant(five));
//! chunk.emit_put_by_id("foo");
//! chunk.emit(Opcode::Pop);
//! chunk.emit_get_by_id("foo");
//! chunk.emit(Opcode::Return);
//!
//! assert_eq!(chunk.cache_size, 3);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk;
pub mod opcode;
pub mod value;

// Re-export main types at crate root
pub use chunk::BytecodeChunk;
pub use opcode::{CacheIndex, IdentifierIndex, Opcode, RegisterId, PROPERTY_CACHING_DISABLED};
pub use value::Value;
