//! Property access statistics
//!
//! Counts which path each named access took. Collected per runtime and
//! reported by the benchmark harness.

use serde::Serialize;

/// Counters for one direction of access (reads or writes)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AccessCounters {
    /// Accesses answered by the cache from the receiver's own class
    pub cache_hits: u64,
    /// Reads answered by the cache from the direct prototype's class
    pub proto_cache_hits: u64,
    /// Dispatcher runs that resolved to an own data property
    pub own_fast_paths: u64,
    /// Dispatcher runs on object receivers (cache misses and uncached accesses)
    pub slow_paths: u64,
    /// Accesses on primitive receivers
    pub transient: u64,
    /// Populates that replaced a different cached class
    pub evictions: u64,
}

impl AccessCounters {
    /// Total number of accesses counted
    pub fn total(&self) -> u64 {
        self.cache_hits + self.proto_cache_hits + self.slow_paths + self.transient
    }

    /// Fraction of accesses answered by the cache, 0.0 when nothing ran
    pub fn hit_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.cache_hits + self.proto_cache_hits) as f64 / total as f64
    }
}

/// Read and write counters for a runtime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PropertyAccessStats {
    /// Named reads
    pub reads: AccessCounters,
    /// Named writes
    pub writes: AccessCounters,
}

impl PropertyAccessStats {
    /// Create zeroed statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero all counters
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
