//! Virtual Machine for bytecode execution
//!
//! Main entry point for executing property-access bytecode.

use core_types::Value;

use crate::code_block::CodeBlock;
use crate::config::RuntimeConfig;
use crate::error::VmResult;
use crate::runtime::Runtime;
use crate::stats::PropertyAccessStats;

/// Virtual Machine for executing JavaScript bytecode
///
/// The VM owns one [`Runtime`]. Code blocks are owned by the caller so that
/// their cache sites survive across executions.
#[derive(Debug)]
pub struct VM {
    runtime: Runtime,
}

impl VM {
    /// Create a new VM instance with the default configuration
    pub fn new() -> VmResult<Self> {
        Self::with_config(RuntimeConfig::default())
    }

    /// Create a new VM instance
    pub fn with_config(config: RuntimeConfig) -> VmResult<Self> {
        Ok(Self {
            runtime: Runtime::with_config(config)?,
        })
    }

    /// Execute a code block and return the result
    ///
    /// # Example
    ///
    /// ```
    /// use interpreter::{CodeBlock, VM};
    /// use bytecode_system::{BytecodeChunk, Opcode, Value as BcValue};
    /// use core_types::Value;
    ///
    /// let mut vm = VM::new().unwrap();
    /// let mut chunk = BytecodeChunk::new();
    ///
    /// let idx = chunk.add_constant(BcValue::Number(42.0));
    /// chunk.emit(Opcode::LoadConstant(idx));
    /// chunk.emit(Opcode::Return);
    ///
    /// let mut block = CodeBlock::new(chunk);
    /// assert_eq!(vm.execute(&mut block).unwrap(), Value::Smi(42));
    /// ```
    pub fn execute(&mut self, block: &mut CodeBlock) -> VmResult<Value> {
        self.runtime.run(block)
    }

    /// Get a property of the global object
    pub fn get_global(&mut self, name: &str) -> VmResult<Value> {
        self.runtime.get_global(name)
    }

    /// Set a property of the global object
    pub fn set_global(&mut self, name: &str, value: Value) -> VmResult<()> {
        self.runtime.set_global(name, value)
    }

    /// The runtime
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// The runtime, mutably
    pub fn runtime_mut(&mut self) -> &mut Runtime {
        &mut self.runtime
    }

    /// Property access counters
    pub fn stats(&self) -> PropertyAccessStats {
        self.runtime.stats()
    }
}
