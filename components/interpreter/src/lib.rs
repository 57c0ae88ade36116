//! Bytecode interpreter with an inline-cached property access fast path
//!
//! This crate provides:
//! - Per-site inline caches keyed by hidden class identity
//! - The property access dispatcher used on every cache miss
//! - A stack-based dispatch loop over `bytecode_system` opcodes
//! - Property access statistics and runtime configuration
//!
//! # Example
//!
//! ```
//! use interpreter::{CodeBlock, VM};
//! use bytecode_system::{BytecodeChunk, Opcode, Value as BcValue};
//! use core_types::Value;
//!
//! let mut vm = VM::new().unwrap();
//! let mut chunk = BytecodeChunk::new();
//!
//! // var x = {}; x.foo = 5; x.foo = 7; return x.foo;
//! let five = chunk.add_constant(BcValue::Number(5.0));
//! let seven = chunk.add_constant(BcValue::Number(7.0));
//! chunk.emit(Opcode::NewObject);
//! chunk.emit(Opcode::Dup);
//! chunk.emit(Opcode::LoadConstant(five));
//! chunk.emit_put_by_id("foo");
//! chunk.emit(Opcode::Pop);
//! chunk.emit(Opcode::Dup);
//! chunk.emit(Opcode::LoadConstant(seven));
//! chunk.emit_put_by_id("foo");
//! chunk.emit(Opcode::Pop);
//! chunk.emit_get_by_id("foo");
//! chunk.emit(Opcode::Return);
//!
//! let mut block = CodeBlock::new(chunk);
//! assert_eq!(vm.execute(&mut block).unwrap(), Value::Smi(7));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod code_block;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod inline_cache;
pub mod property_access;
pub mod runtime;
pub mod stats;
pub mod vm;

// Re-export main types at crate root
pub use code_block::CodeBlock;
pub use config::{RuntimeConfig, MAX_INLINE_CACHE_ENTRIES};
pub use context::ExecutionContext;
pub use error::{VmError, VmResult};
pub use inline_cache::{InlineCache, PropertyCacheTable};
pub use property_access::{PropOpFlags, PropertyLookup, PropertyValue};
pub use runtime::{Intrinsics, NativeFunction, Runtime};
pub use stats::{AccessCounters, PropertyAccessStats};
pub use vm::VM;
