//! Identifier interning.
//!
//! Property names are interned into small integer [`SymbolId`]s so that
//! hidden classes, transition maps and inline caches compare integers
//! instead of strings. Symbols are never freed or reused.

use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Interned identity of a property name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

/// A table mapping property-name strings to stable symbols.
///
/// # Example
///
/// ```
/// use memory_manager::IdentifierTable;
///
/// let mut table = IdentifierTable::new();
/// let foo = table.intern("foo");
/// assert_eq!(table.intern("foo"), foo);
/// assert_eq!(table.name(foo).as_deref(), Some("foo"));
/// ```
#[derive(Debug, Default)]
pub struct IdentifierTable {
    names: Vec<Arc<str>>,
    lookup: FxHashMap<Arc<str>, SymbolId>,
}

impl IdentifierTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the symbol for `name`, creating it on first use.
    pub fn intern(&mut self, name: &str) -> SymbolId {
        if let Some(id) = self.lookup.get(name) {
            return *id;
        }
        // Running out of u32 symbols means the process is out of memory anyway.
        let id = SymbolId(self.names.len() as u32);
        let name: Arc<str> = Arc::from(name);
        self.names.push(Arc::clone(&name));
        self.lookup.insert(name, id);
        id
    }

    /// Returns the symbol for `name` without creating one.
    pub fn get(&self, name: &str) -> Option<SymbolId> {
        self.lookup.get(name).copied()
    }

    /// Returns the string a symbol was interned from.
    pub fn name(&self, id: SymbolId) -> Option<Arc<str>> {
        self.names.get(id.0 as usize).cloned()
    }

    /// Number of interned symbols.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True if nothing has been interned.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

static IDENTIFIERS: OnceLock<RwLock<IdentifierTable>> = OnceLock::new();

fn identifiers() -> &'static RwLock<IdentifierTable> {
    IDENTIFIERS.get_or_init(|| RwLock::new(IdentifierTable::new()))
}

/// Interns `name` in the process-wide identifier table.
pub fn intern(name: &str) -> SymbolId {
    if let Some(id) = identifiers().read().get(name) {
        return id;
    }
    identifiers().write().intern(name)
}

/// Looks up the string for a symbol in the process-wide table.
pub fn symbol_name(id: SymbolId) -> Option<Arc<str>> {
    identifiers().read().name(id)
}

/// Display helper used in error messages.
pub fn symbol_display(id: SymbolId) -> String {
    match symbol_name(id) {
        Some(name) => name.to_string(),
        None => format!("#{}", id.0),
    }
}
