//! Integration tests for interpreter
//!
//! Bytecode programs exercising the dispatch loop, the cache sites of a
//! code block and the dispatcher together.

use bytecode_system::{BytecodeChunk, Opcode, RegisterId, Value as BcValue};
use core_types::{ErrorKind, Value};
use interpreter::{CodeBlock, InlineCache, RuntimeConfig, VM};
use memory_manager::{intern, DictionaryPolicy};

/// `function (o) { return o.x }` as a block reading register 0.
fn read_x_block() -> (CodeBlock, u32) {
    let mut chunk = BytecodeChunk::new();
    chunk.register_count = 1;
    chunk.emit(Opcode::LoadGlobalObject);
    chunk.emit_get_by_id("integration_target");
    let cache = chunk.emit_get_by_id("integration_x");
    chunk.emit(Opcode::Return);
    (CodeBlock::new(chunk), cache)
}

#[test]
fn test_site_misses_for_a_different_class() {
    let mut vm = VM::new().unwrap();
    let (mut block, cache) = read_x_block();
    let x = intern("integration_x");

    let rt = vm.runtime_mut();
    let a = rt.new_object().unwrap();
    rt.put_property(&Value::Object(a), x, Value::Smi(1), Default::default())
        .unwrap();
    let b = rt.new_object().unwrap();
    rt.put_property(&Value::Object(b), intern("integration_y"), Value::Smi(0), Default::default())
        .unwrap();
    rt.put_property(&Value::Object(b), x, Value::Smi(2), Default::default())
        .unwrap();

    vm.set_global("integration_target", Value::Object(a)).unwrap();
    assert_eq!(vm.execute(&mut block).unwrap(), Value::Smi(1));
    let class_a = vm.runtime().class_of(a);
    assert!(block.caches.get(cache).unwrap().probe(class_a).is_some());

    vm.set_global("integration_target", Value::Object(b)).unwrap();
    assert_eq!(vm.execute(&mut block).unwrap(), Value::Smi(2));
    let class_b = vm.runtime().class_of(b);
    let site: &InlineCache = block.caches.get(cache).unwrap();
    assert_eq!(site.probe(class_a), None);
    assert!(site.probe(class_b).is_some());
    assert_eq!(vm.stats().reads.evictions, 1);
}

#[test]
fn test_dictionary_conversion_invalidates_site() {
    let config = RuntimeConfig {
        dictionary: DictionaryPolicy {
            max_properties: 4,
            max_transitions: 64,
        },
        ..RuntimeConfig::default()
    };
    let mut vm = VM::with_config(config).unwrap();
    let (mut block, cache) = read_x_block();
    let x = intern("integration_x");

    let rt = vm.runtime_mut();
    let obj = rt.new_object().unwrap();
    rt.put_property(&Value::Object(obj), x, Value::Smi(1), Default::default())
        .unwrap();
    vm.set_global("integration_target", Value::Object(obj)).unwrap();
    assert_eq!(vm.execute(&mut block).unwrap(), Value::Smi(1));
    let before = vm.runtime().class_of(obj);

    let rt = vm.runtime_mut();
    for i in 0..8 {
        let name = intern(&format!("integration_fill_{}", i));
        rt.put_property(&Value::Object(obj), name, Value::Smi(i), Default::default())
            .unwrap();
    }
    let after = rt.class_of(obj);
    assert!(rt.classes().is_dictionary(after));
    assert_ne!(before, after);

    let site = block.caches.get(cache).unwrap();
    assert_eq!(site.probe(after), None);
    assert_eq!(vm.execute(&mut block).unwrap(), Value::Smi(1));
    // The dictionary resolution must not have replaced the cached class.
    assert!(block.caches.get(cache).unwrap().probe(before).is_some());
}

#[test]
fn test_try_get_by_id_missing_global() {
    let mut vm = VM::new().unwrap();
    let mut chunk = BytecodeChunk::new();
    let name = chunk.add_identifier("print");
    let cache = chunk.allocate_cache_index();
    chunk.emit(Opcode::LoadGlobalObject);
    chunk.emit(Opcode::TryGetById { name, cache });
    chunk.emit(Opcode::Return);

    let err = vm.execute(&mut CodeBlock::new(chunk)).unwrap_err();
    let exception = err.as_exception().unwrap();
    assert_eq!(exception.kind, ErrorKind::ReferenceError);
    assert_eq!(exception.message, "Property 'print' doesn't exist");
}

#[test]
fn test_try_put_by_id_strict_undeclared() {
    let mut vm = VM::new().unwrap();
    let mut chunk = BytecodeChunk::new_strict();
    let name = chunk.add_identifier("integration_undeclared");
    let cache = chunk.allocate_cache_index();
    let one = chunk.add_constant(BcValue::Number(1.0));
    chunk.emit(Opcode::LoadGlobalObject);
    chunk.emit(Opcode::LoadConstant(one));
    chunk.emit(Opcode::TryPutById { name, cache });
    chunk.emit(Opcode::Return);

    let err = vm.execute(&mut CodeBlock::new(chunk)).unwrap_err();
    assert_eq!(
        err.as_exception().map(|e| e.kind),
        Some(ErrorKind::ReferenceError)
    );
}

#[test]
fn test_put_by_id_cache_hits_on_second_store() {
    let mut vm = VM::new().unwrap();
    let mut chunk = BytecodeChunk::new();
    chunk.register_count = 1;
    let one = chunk.add_constant(BcValue::Number(1.0));
    let two = chunk.add_constant(BcValue::Number(2.0));

    // o = {}; o.p = 1 (adds); o.p = 2 at another site (misses, populates)
    chunk.emit(Opcode::NewObject);
    chunk.emit(Opcode::StoreLocal(RegisterId(0)));
    chunk.emit(Opcode::LoadLocal(RegisterId(0)));
    chunk.emit(Opcode::LoadConstant(one));
    chunk.emit_put_by_id("integration_p");
    chunk.emit(Opcode::Pop);
    chunk.emit(Opcode::LoadLocal(RegisterId(0)));
    chunk.emit(Opcode::LoadConstant(two));
    let store_site = chunk.emit_put_by_id("integration_p");
    chunk.emit(Opcode::Pop);
    chunk.emit(Opcode::LoadLocal(RegisterId(0)));
    chunk.emit(Opcode::Return);

    let mut block = CodeBlock::new(chunk);
    let first = vm.execute(&mut block).unwrap();
    let second = vm.execute(&mut block).unwrap();
    assert_ne!(first, second);
    assert!(!block.caches.get(store_site).unwrap().is_empty());
    // Second run: both objects share a class, so the second store hits.
    assert_eq!(vm.stats().writes.cache_hits, 1);
}

#[test]
fn test_string_length_and_index() {
    let mut vm = VM::new().unwrap();
    let mut chunk = BytecodeChunk::new();
    let s = chunk.add_constant(BcValue::String("abc".to_string()));
    chunk.emit(Opcode::LoadConstant(s));
    chunk.emit_get_by_id("length");
    chunk.emit(Opcode::Return);
    assert_eq!(
        vm.execute(&mut CodeBlock::new(chunk)).unwrap(),
        Value::Smi(3)
    );

    let mut chunk = BytecodeChunk::new();
    let s = chunk.add_constant(BcValue::String("abc".to_string()));
    let idx = chunk.add_constant(BcValue::Number(2.0));
    chunk.emit(Opcode::LoadConstant(s));
    chunk.emit(Opcode::LoadConstant(idx));
    chunk.emit(Opcode::GetByVal);
    chunk.emit(Opcode::Return);
    assert_eq!(
        vm.execute(&mut CodeBlock::new(chunk)).unwrap(),
        Value::string("c")
    );
}
