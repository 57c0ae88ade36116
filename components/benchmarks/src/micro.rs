//! Micro-benchmarks for named property access
//!
//! Each scenario stresses one path through the property access fast path:
//! monomorphic and polymorphic cache sites, prototype hits, dictionary-mode
//! add/delete churn and accessor calls on primitive receivers.

use std::cell::Cell;
use std::rc::Rc;

use bytecode_system::{BytecodeChunk, Opcode, Value as BcValue};
use core_types::{JsError, ObjectId, Value};
use interpreter::{
    CodeBlock, PropOpFlags, PropertyLookup, PropertyValue, RuntimeConfig, VmResult, VM,
};
use memory_manager::{intern, ObjectKind, PropertyFlags, DIRECT_PROPERTY_SLOTS};

use crate::runner::{Benchmark, BenchmarkResult};

/// Add/delete rounds in the dictionary churn scenario
pub const CHURN_ITERATIONS: u64 = 1_000_000;

const READ_ITERATIONS: u64 = 100_000;

fn object_with(
    vm: &mut VM,
    prototype: Option<ObjectId>,
    props: &[(&str, i32)],
) -> VmResult<ObjectId> {
    let rt = vm.runtime_mut();
    let id = match prototype {
        Some(proto) => rt.new_object_with_prototype(Some(proto))?,
        None => rt.new_object()?,
    };
    for (name, value) in props {
        rt.put_property(
            &Value::Object(id),
            intern(name),
            Value::Smi(*value),
            PropOpFlags::default(),
        )?;
    }
    Ok(id)
}

/// `return <global>.<name>`
fn read_global_property(global: &str, name: &str) -> CodeBlock {
    let mut chunk = BytecodeChunk::new();
    chunk.emit(Opcode::LoadGlobalObject);
    chunk.emit_get_by_id(global);
    chunk.emit_get_by_id(name);
    chunk.emit(Opcode::Return);
    CodeBlock::new(chunk)
}

fn global_object(vm: &VM, name: &str) -> Result<ObjectId, String> {
    let rt = vm.runtime();
    match rt.lookup_property(rt.intrinsics().global, intern(name)) {
        PropertyLookup::Data { owner, desc, .. } => rt
            .heap()
            .get(owner)
            .named_slot_value(desc.slot)
            .as_object()
            .ok_or_else(|| format!("global '{}' is not an object", name)),
        _ => Err(format!("global '{}' is missing", name)),
    }
}

fn setup_monomorphic_read(vm: &mut VM) -> VmResult<CodeBlock> {
    let obj = object_with(vm, None, &[("x", 1), ("y", 2), ("z", 3)])?;
    vm.set_global("mono", Value::Object(obj))?;
    Ok(read_global_property("mono", "x"))
}

fn setup_polymorphic_site(vm: &mut VM) -> VmResult<CodeBlock> {
    let shapes = vec![
        object_with(vm, None, &[("x", 1)])?,
        object_with(vm, None, &[("a", 0), ("x", 2)])?,
        object_with(vm, None, &[("b", 0), ("x", 3)])?,
        object_with(vm, None, &[("c", 0), ("d", 0), ("x", 4)])?,
    ];
    let cursor = Rc::new(Cell::new(0usize));
    let next = vm.runtime_mut().new_function(move |_, _, _| {
        let index = cursor.get();
        cursor.set((index + 1) % shapes.len());
        Ok(Value::Object(shapes[index]))
    })?;
    vm.set_global("nextShape", Value::Object(next))?;

    // return nextShape().x
    let mut chunk = BytecodeChunk::new();
    chunk.emit(Opcode::LoadGlobalObject);
    chunk.emit_get_by_id("nextShape");
    chunk.emit(Opcode::LoadUndefined);
    chunk.emit(Opcode::Call(0));
    chunk.emit_get_by_id("x");
    chunk.emit(Opcode::Return);
    Ok(CodeBlock::new(chunk))
}

fn setup_prototype_read(vm: &mut VM) -> VmResult<CodeBlock> {
    let proto = object_with(vm, None, &[("method", 7)])?;
    let obj = object_with(vm, Some(proto), &[("own", 1)])?;
    vm.set_global("child", Value::Object(obj))?;
    Ok(read_global_property("child", "method"))
}

fn setup_dictionary_churn(vm: &mut VM) -> VmResult<CodeBlock> {
    let set = vm.runtime_mut().new_object()?;
    vm.set_global("set", Value::Object(set))?;

    // set.key = true; return delete set.key
    let mut chunk = BytecodeChunk::new();
    let present = chunk.add_constant(BcValue::Boolean(true));
    let key = chunk.add_identifier("key");
    chunk.emit(Opcode::LoadGlobalObject);
    chunk.emit_get_by_id("set");
    chunk.emit(Opcode::Dup);
    chunk.emit(Opcode::LoadConstant(present));
    chunk.emit_put_by_id("key");
    chunk.emit(Opcode::Pop);
    chunk.emit(Opcode::DeleteById(key));
    chunk.emit(Opcode::Return);
    Ok(CodeBlock::new(chunk))
}

fn check_dictionary_churn(vm: &VM, _iterations: u64) -> Result<(), String> {
    let set = global_object(vm, "set")?;
    let rt = vm.runtime();
    let size = rt.own_property_keys(set, false).len();
    if size != 0 {
        return Err(format!("set size is {} after churn, expected 0", size));
    }
    let capacity = rt.heap().get(set).storage().capacity();
    if capacity > DIRECT_PROPERTY_SLOTS {
        return Err(format!("set storage grew to {} slots", capacity));
    }
    Ok(())
}

fn setup_transient_setter(vm: &mut VM) -> VmResult<CodeBlock> {
    let setter = vm.runtime_mut().new_function(|rt, this, args| {
        let boxed = this
            .as_object()
            .map(|id| &rt.heap().get(id).kind)
            .is_some_and(|kind| matches!(kind, ObjectKind::PrimitiveBox(Value::Smi(1))));
        if !boxed || args.first() != Some(&Value::Smi(10)) {
            return Err(JsError::type_error("setter called with unexpected receiver").into());
        }
        Ok(Value::Undefined)
    })?;
    let rt = vm.runtime_mut();
    let number_prototype = rt.intrinsics().number_prototype;
    rt.define_own_property(
        number_prototype,
        intern("accessor"),
        PropertyFlags::accessor(false, true),
        PropertyValue::Accessor {
            getter: None,
            setter: Some(setter),
        },
    )?;

    // (1).accessor = 10
    let mut chunk = BytecodeChunk::new();
    let one = chunk.add_constant(BcValue::Number(1.0));
    let ten = chunk.add_constant(BcValue::Number(10.0));
    chunk.emit(Opcode::LoadConstant(one));
    chunk.emit(Opcode::LoadConstant(ten));
    chunk.emit_put_by_id("accessor");
    chunk.emit(Opcode::Return);
    Ok(CodeBlock::new(chunk))
}

fn check_transient_setter(vm: &VM, iterations: u64) -> Result<(), String> {
    let rt = vm.runtime();
    let keys = rt.own_property_keys(rt.intrinsics().number_prototype, false);
    if keys != vec![intern("accessor")] {
        return Err(format!("Number.prototype gained properties: {:?}", keys));
    }
    let transient = vm.stats().writes.transient;
    if transient != iterations {
        return Err(format!("{} transient writes, expected {}", transient, iterations));
    }
    Ok(())
}

/// Create all micro-benchmarks
pub fn create_benchmarks() -> Vec<Benchmark> {
    vec![
        Benchmark {
            name: "monomorphic_read".to_string(),
            description: "100K reads of obj.x through a warm site".to_string(),
            iterations: READ_ITERATIONS,
            setup: setup_monomorphic_read,
            check: None,
        },
        Benchmark {
            name: "polymorphic_site".to_string(),
            description: "100K reads of .x over four shapes at one site".to_string(),
            iterations: READ_ITERATIONS,
            setup: setup_polymorphic_site,
            check: None,
        },
        Benchmark {
            name: "prototype_read".to_string(),
            description: "100K reads of a property on the direct prototype".to_string(),
            iterations: READ_ITERATIONS,
            setup: setup_prototype_read,
            check: None,
        },
        Benchmark {
            name: "dictionary_churn".to_string(),
            description: "1M add/delete rounds of the same key".to_string(),
            iterations: CHURN_ITERATIONS,
            setup: setup_dictionary_churn,
            check: Some(check_dictionary_churn),
        },
        Benchmark {
            name: "transient_primitive_setter".to_string(),
            description: "100K (1).accessor = 10 through a Number.prototype setter".to_string(),
            iterations: READ_ITERATIONS,
            setup: setup_transient_setter,
            check: Some(check_transient_setter),
        },
    ]
}

/// Run all micro-benchmarks
pub fn run_all(config: &RuntimeConfig) -> Vec<BenchmarkResult> {
    create_benchmarks().iter().map(|b| b.run(config)).collect()
}
