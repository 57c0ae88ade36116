//! Compiled code blocks
//!
//! A code block pairs a bytecode chunk with the cache table its access
//! instructions index into, so each compiled function owns its own sites.

use bytecode_system::BytecodeChunk;
use memory_manager::{intern, SymbolId};

use crate::inline_cache::PropertyCacheTable;

/// Bytecode plus its property cache sites
#[derive(Debug, Clone)]
pub struct CodeBlock {
    /// The bytecode
    pub chunk: BytecodeChunk,
    /// One cache entry per cache index the chunk allocated
    pub caches: PropertyCacheTable,
    symbols: Vec<SymbolId>,
}

impl CodeBlock {
    /// Wraps a chunk, interning its identifiers and sizing its cache table
    pub fn new(chunk: BytecodeChunk) -> Self {
        let symbols = chunk.identifiers.iter().map(|name| intern(name)).collect();
        let caches = PropertyCacheTable::new(chunk.cache_size);
        Self {
            chunk,
            caches,
            symbols,
        }
    }

    /// Symbol for an identifier index of the chunk
    #[inline]
    pub fn symbol(&self, index: u32) -> Option<SymbolId> {
        self.symbols.get(index as usize).copied()
    }
}

impl From<BytecodeChunk> for CodeBlock {
    fn from(chunk: BytecodeChunk) -> Self {
        Self::new(chunk)
    }
}
