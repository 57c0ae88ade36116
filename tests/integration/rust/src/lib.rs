//! Integration test suite for the property access fast path
//!
//! This crate provides integration tests that run bytecode programs through
//! the interpreter and check hidden classes, cache sites and accessor calls
//! across component boundaries.

use std::cell::RefCell;
use std::rc::Rc;

use core_types::{ObjectId, Value};
use interpreter::{PropOpFlags, VM};
use memory_manager::intern;

/// Re-export components for test convenience
pub mod components {
    pub use bytecode_system;
    pub use core_types;
    pub use interpreter;
    pub use memory_manager;
}

/// Shared log native functions append to
pub type CallLog = Rc<RefCell<Vec<String>>>;

/// Create an empty call log
pub fn call_log() -> CallLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Allocate an ordinary object and assign `props` to it in order
pub fn object_with(vm: &mut VM, props: &[(&str, i32)]) -> ObjectId {
    let rt = vm.runtime_mut();
    let id = rt.new_object().expect("allocation failed");
    for (name, value) in props {
        rt.put_property(
            &Value::Object(id),
            intern(name),
            Value::Smi(*value),
            PropOpFlags::default(),
        )
        .expect("assignment failed");
    }
    id
}
