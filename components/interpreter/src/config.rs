//! Runtime configuration
//!
//! Tuning knobs for the property-access fast path. None of them affect
//! observable results, only which path an access takes.

use memory_manager::DictionaryPolicy;
use serde::{Deserialize, Serialize};

/// Largest number of classes one inline cache site remembers.
pub const MAX_INLINE_CACHE_ENTRIES: usize = 4;

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// When objects switch to dictionary mode
    pub dictionary: DictionaryPolicy,
    /// Classes remembered per cache site; 1 is a monomorphic cache
    pub inline_cache_entries: usize,
    /// Largest hole an indexed store may open past the end of a fast array
    pub fast_array_max_gap: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            dictionary: DictionaryPolicy::default(),
            inline_cache_entries: 1,
            fast_array_max_gap: 1024,
        }
    }
}

impl RuntimeConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::normalized)
    }

    /// Cache site width, clamped to `1..=MAX_INLINE_CACHE_ENTRIES`.
    pub fn cache_entries(&self) -> usize {
        self.inline_cache_entries.clamp(1, MAX_INLINE_CACHE_ENTRIES)
    }

    fn normalized(mut self) -> Self {
        self.inline_cache_entries = self.cache_entries();
        self
    }
}
