//! Dispatch loop for bytecode execution
//!
//! Handles individual opcode execution. Named accesses hand the cache entry
//! of their site to the property access fast path.

use bytecode_system::Opcode;
use core_types::{ErrorKind, JsError, ObjectId, Value};
use memory_manager::{PropertyFlags, SymbolId};

use crate::code_block::CodeBlock;
use crate::context::ExecutionContext;
use crate::error::VmResult;
use crate::property_access::{PropOpFlags, PropertyValue};
use crate::runtime::Runtime;

fn resolve(block: &CodeBlock, index: u32) -> VmResult<SymbolId> {
    block.symbol(index).ok_or_else(|| {
        JsError::new(
            ErrorKind::InternalError,
            format!("invalid identifier index {}", index),
        )
        .into()
    })
}

fn constant(block: &CodeBlock, index: usize) -> VmResult<Value> {
    block
        .chunk
        .constants
        .get(index)
        .map(|c| c.to_runtime())
        .ok_or_else(|| {
            JsError::new(
                ErrorKind::InternalError,
                format!("invalid constant index {}", index),
            )
            .into()
        })
}

fn accessor_half(runtime: &Runtime, value: &Value) -> VmResult<Option<ObjectId>> {
    match value {
        Value::Undefined => Ok(None),
        Value::Object(id) if runtime.is_callable(value) => Ok(Some(*id)),
        other => Err(JsError::type_error(format!(
            "accessor must be a function, got {}",
            other.type_of()
        ))
        .into()),
    }
}

impl Runtime {
    /// Run `block` from its first instruction until `Return` or the end of
    /// the bytecode.
    pub fn run(&mut self, block: &mut CodeBlock) -> VmResult<Value> {
        let mut ctx = ExecutionContext::new(&block.chunk);
        let strict = block.chunk.strict;
        let put_flags = PropOpFlags::strict(strict);

        while let Some(op) = ctx.fetch(&block.chunk) {
            match op {
                Opcode::LoadConstant(idx) => {
                    let value = constant(block, idx)?;
                    ctx.push(value);
                }
                Opcode::LoadUndefined => ctx.push(Value::Undefined),
                Opcode::LoadGlobalObject => ctx.push(Value::Object(self.intrinsics().global)),
                Opcode::NewObject => {
                    let id = self.new_object()?;
                    ctx.push(Value::Object(id));
                }
                Opcode::NewArray(count) => {
                    let elements = ctx.pop_n(count as usize)?;
                    let id = self.new_array(elements)?;
                    ctx.push(Value::Object(id));
                }
                Opcode::LoadLocal(reg) => {
                    let value = ctx.get_register(reg.0 as usize);
                    ctx.push(value);
                }
                Opcode::StoreLocal(reg) => {
                    let value = ctx.pop()?;
                    ctx.set_register(reg.0 as usize, value);
                }
                Opcode::Dup => {
                    let value = ctx.peek()?.clone();
                    ctx.push(value);
                }
                Opcode::Pop => {
                    ctx.pop()?;
                }
                Opcode::GetById { name, cache } => {
                    let object = ctx.pop()?;
                    let name = resolve(block, name)?;
                    let value = self.get_by_id(
                        block.caches.entry(cache),
                        &object,
                        name,
                        PropOpFlags::default(),
                    )?;
                    ctx.push(value);
                }
                Opcode::TryGetById { name, cache } => {
                    let object = ctx.pop()?;
                    let name = resolve(block, name)?;
                    let value = self.get_by_id(
                        block.caches.entry(cache),
                        &object,
                        name,
                        PropOpFlags::default().with_must_exist(),
                    )?;
                    ctx.push(value);
                }
                Opcode::PutById { name, cache } => {
                    let value = ctx.pop()?;
                    let object = ctx.pop()?;
                    let name = resolve(block, name)?;
                    self.put_by_id(
                        block.caches.entry(cache),
                        &object,
                        name,
                        value.clone(),
                        put_flags,
                    )?;
                    ctx.push(value);
                }
                Opcode::TryPutById { name, cache } => {
                    let value = ctx.pop()?;
                    let object = ctx.pop()?;
                    let name = resolve(block, name)?;
                    self.put_by_id(
                        block.caches.entry(cache),
                        &object,
                        name,
                        value.clone(),
                        put_flags.with_must_exist(),
                    )?;
                    ctx.push(value);
                }
                Opcode::PutOwnGetterSetter { name } => {
                    let setter = ctx.pop()?;
                    let getter = ctx.pop()?;
                    let object = ctx.pop()?;
                    let name = resolve(block, name)?;
                    let target = object.as_object().ok_or_else(|| {
                        JsError::type_error("cannot define an accessor on a primitive")
                    })?;
                    let getter = accessor_half(self, &getter)?;
                    let setter = accessor_half(self, &setter)?;
                    self.define_own_property(
                        target,
                        name,
                        PropertyFlags::accessor(true, true),
                        PropertyValue::Accessor { getter, setter },
                    )?;
                }
                Opcode::DeleteById(name) => {
                    let object = ctx.pop()?;
                    let name = resolve(block, name)?;
                    let deleted = self.delete_named(&object, name, put_flags)?;
                    ctx.push(Value::Boolean(deleted));
                }
                Opcode::GetByVal => {
                    let key = ctx.pop()?;
                    let object = ctx.pop()?;
                    let value = self.get_by_val(&object, &key, PropOpFlags::default())?;
                    ctx.push(value);
                }
                Opcode::PutByVal => {
                    let value = ctx.pop()?;
                    let key = ctx.pop()?;
                    let object = ctx.pop()?;
                    self.put_by_val(&object, &key, value.clone(), put_flags)?;
                    ctx.push(value);
                }
                Opcode::Call(argc) => {
                    let args = ctx.pop_n(argc as usize)?;
                    let this = ctx.pop()?;
                    let callee = ctx.pop()?;
                    let result = self.call(&callee, &this, &args)?;
                    ctx.push(result);
                }
                Opcode::Return => {
                    return Ok(ctx.stack.pop().unwrap_or(Value::Undefined));
                }
            }
        }
        Ok(Value::Undefined)
    }
}
