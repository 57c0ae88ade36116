//! Allocation failures.
//!
//! These are fatal to the VM: they are never turned into catchable
//! JavaScript exceptions.

use thiserror::Error;

/// An allocation in the hidden-class arena, object heap or property
/// storage could not be satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocError {
    /// The hidden class arena ran out of class ids.
    #[error("hidden class arena exhausted")]
    ClassArenaExhausted,
    /// The object heap ran out of object ids.
    #[error("object heap exhausted")]
    HeapExhausted,
    /// Growing an object's property storage failed.
    #[error("failed to grow property storage to {0} slots")]
    StorageGrowth(usize),
    /// Growing an array's dense element storage failed.
    #[error("failed to grow array elements to {0} entries")]
    ElementGrowth(usize),
}
