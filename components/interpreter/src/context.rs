//! Execution context for VM

use bytecode_system::{BytecodeChunk, Opcode};
use core_types::{ErrorKind, JsError, Value};

use crate::error::VmResult;

/// Per-execution state of one code block
///
/// Holds the register file, the operand stack and the instruction pointer.
/// The bytecode itself stays in the [`crate::CodeBlock`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionContext {
    /// Register file for local variable storage
    pub registers: Vec<Value>,
    /// Operand stack
    pub stack: Vec<Value>,
    /// Current instruction pointer
    pub instruction_pointer: usize,
}

impl ExecutionContext {
    /// Create a new execution context sized for a bytecode chunk
    pub fn new(bytecode: &BytecodeChunk) -> Self {
        let register_count = bytecode.register_count as usize;
        Self {
            registers: vec![Value::Undefined; register_count],
            stack: Vec::with_capacity(16),
            instruction_pointer: 0,
        }
    }

    /// Advance instruction pointer and return current instruction
    pub fn fetch(&mut self, bytecode: &BytecodeChunk) -> Option<Opcode> {
        let op = bytecode.instructions.get(self.instruction_pointer).copied()?;
        self.instruction_pointer += 1;
        Some(op)
    }

    /// Get register value
    pub fn get_register(&self, index: usize) -> Value {
        self.registers
            .get(index)
            .cloned()
            .unwrap_or(Value::Undefined)
    }

    /// Set register value
    pub fn set_register(&mut self, index: usize, value: Value) {
        if index >= self.registers.len() {
            self.registers.resize(index + 1, Value::Undefined);
        }
        self.registers[index] = value;
    }

    /// Push onto the operand stack
    #[inline]
    pub fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    /// Pop the operand stack
    #[inline]
    pub fn pop(&mut self) -> VmResult<Value> {
        self.stack.pop().ok_or_else(stack_underflow)
    }

    /// Top of the operand stack
    pub fn peek(&self) -> VmResult<&Value> {
        self.stack.last().ok_or_else(stack_underflow)
    }

    /// Pop `n` values, returned in push order
    pub fn pop_n(&mut self, n: usize) -> VmResult<Vec<Value>> {
        let len = self.stack.len();
        if n > len {
            return Err(stack_underflow());
        }
        Ok(self.stack.split_off(len - n))
    }
}

fn stack_underflow() -> crate::error::VmError {
    JsError::new(ErrorKind::InternalError, "operand stack underflow").into()
}
