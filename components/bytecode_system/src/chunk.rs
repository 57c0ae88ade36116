//! Bytecode chunk - compiled bytecode container
//!
//! Contains instructions, constants, identifiers and the number of property
//! cache sites the emitter allocated.

use std::fmt::Write as _;

use crate::opcode::{CacheIndex, IdentifierIndex, Opcode, PROPERTY_CACHING_DISABLED};
use crate::value::Value;

/// A compiled bytecode chunk
#[derive(Debug, Clone, PartialEq)]
pub struct BytecodeChunk {
    /// Sequence of bytecode instructions
    pub instructions: Vec<Opcode>,
    /// Constant pool for literal values
    pub constants: Vec<Value>,
    /// Property names referenced by named accesses
    pub identifiers: Vec<String>,
    /// Number of registers needed for execution
    pub register_count: u32,
    /// Whether the code is strict mode code
    pub strict: bool,
    /// Number of cache indices handed out, including the reserved index 0
    pub cache_size: u32,
}

impl BytecodeChunk {
    /// Create a new empty bytecode chunk
    pub fn new() -> Self {
        Self {
            instructions: Vec::new(),
            constants: Vec::new(),
            identifiers: Vec::new(),
            register_count: 0,
            strict: false,
            cache_size: PROPERTY_CACHING_DISABLED + 1,
        }
    }

    /// Create a new empty chunk of strict mode code
    pub fn new_strict() -> Self {
        Self {
            strict: true,
            ..Self::new()
        }
    }

    /// Emit an instruction
    pub fn emit(&mut self, opcode: Opcode) {
        self.instructions.push(opcode);
    }

    /// Add a constant to the constant pool and return its index
    pub fn add_constant(&mut self, value: Value) -> usize {
        let idx = self.constants.len();
        self.constants.push(value);
        idx
    }

    /// Return the index of `name` in the identifier list, adding it if new
    pub fn add_identifier(&mut self, name: &str) -> IdentifierIndex {
        if let Some(pos) = self.identifiers.iter().position(|s| s == name) {
            return pos as IdentifierIndex;
        }
        self.identifiers.push(name.to_string());
        (self.identifiers.len() - 1) as IdentifierIndex
    }

    /// Look up an identifier by index
    pub fn identifier(&self, idx: IdentifierIndex) -> Option<&str> {
        self.identifiers.get(idx as usize).map(String::as_str)
    }

    /// Allocate a fresh cache index for one static access site
    pub fn allocate_cache_index(&mut self) -> CacheIndex {
        let idx = self.cache_size;
        self.cache_size += 1;
        idx
    }

    /// Emit `GetById` for `name` with a fresh cache site
    pub fn emit_get_by_id(&mut self, name: &str) -> CacheIndex {
        let name = self.add_identifier(name);
        let cache = self.allocate_cache_index();
        self.emit(Opcode::GetById { name, cache });
        cache
    }

    /// Emit `PutById` for `name` with a fresh cache site
    pub fn emit_put_by_id(&mut self, name: &str) -> CacheIndex {
        let name = self.add_identifier(name);
        let cache = self.allocate_cache_index();
        self.emit(Opcode::PutById { name, cache });
        cache
    }

    /// Get the number of instructions
    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }

    /// Render a listing of the chunk, one instruction per line
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "chunk: {} instructions, {} cache sites{}",
            self.instructions.len(),
            self.cache_size - 1,
            if self.strict { ", strict" } else { "" }
        );
        for (idx, name) in self.identifiers.iter().enumerate() {
            let _ = writeln!(out, "  id {}: {}", idx, name);
        }
        for (pc, op) in self.instructions.iter().enumerate() {
            let _ = writeln!(out, "  {:04} {}", pc, op);
        }
        out
    }
}

impl Default for BytecodeChunk {
    fn default() -> Self {
        Self::new()
    }
}
