//! Interpreter error types

use core_types::JsError;
use memory_manager::AllocError;
use thiserror::Error;

/// Failure of a VM operation.
///
/// `Exception` is a script-visible error the caller turns into a thrown JS
/// value. `OutOfMemory` is fatal and not catchable by script.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VmError {
    /// A JavaScript exception.
    #[error(transparent)]
    Exception(#[from] JsError),
    /// Hidden class or property storage allocation failed.
    #[error("out of memory: {0}")]
    OutOfMemory(#[from] AllocError),
}

impl VmError {
    /// The JavaScript exception, if this is one.
    pub fn as_exception(&self) -> Option<&JsError> {
        match self {
            VmError::Exception(error) => Some(error),
            VmError::OutOfMemory(_) => None,
        }
    }
}

/// Result type of VM operations.
pub type VmResult<T> = Result<T, VmError>;
