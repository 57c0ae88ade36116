//! Inline Cache Behaviour Tests
//!
//! Tests the cache sites of compiled blocks against the hidden class
//! registry: misses for foreign classes, structural sharing, dictionary-mode
//! invalidation, prototype hits and accessors that must never be cached.

use std::cell::Cell;
use std::rc::Rc;

use bytecode_system::{BytecodeChunk, CacheIndex, Opcode, Value as BcValue};
use core_types::{ErrorKind, JsError, Value};
use integration_tests::object_with;
use interpreter::{CodeBlock, InlineCache, PropOpFlags, PropertyValue, VmError, VM};
use memory_manager::{intern, PropertyFlags};

/// `return target.<name>` with the site index of the `<name>` read
fn read_target(name: &str) -> (CodeBlock, CacheIndex) {
    let mut chunk = BytecodeChunk::new();
    chunk.emit(Opcode::LoadGlobalObject);
    chunk.emit_get_by_id("target");
    let site = chunk.emit_get_by_id(name);
    chunk.emit(Opcode::Return);
    (CodeBlock::new(chunk), site)
}

/// Test: a site populated by one class misses for another
#[test]
fn test_distinct_classes_never_share_a_hit() {
    let mut vm = VM::new().unwrap();
    let a = object_with(&mut vm, &[("x", 1)]);
    let b = object_with(&mut vm, &[("y", 0), ("x", 2)]);
    let (mut block, site) = read_target("x");

    vm.set_global("target", Value::Object(a)).unwrap();
    assert_eq!(vm.execute(&mut block).unwrap(), Value::Smi(1));
    vm.runtime_mut().reset_stats();

    vm.set_global("target", Value::Object(b)).unwrap();
    assert_eq!(vm.execute(&mut block).unwrap(), Value::Smi(2));
    // Only the `target` read may hit.
    assert_eq!(vm.stats().reads.cache_hits, 1);

    let class_b = vm.runtime().class_of(b);
    assert!(block.caches.get(site).unwrap().probe(class_b).is_some());
}

/// Test: objects built the same way share a class, a different order does not
#[test]
fn test_structural_sharing() {
    let mut vm = VM::new().unwrap();
    let first = object_with(&mut vm, &[("p", 1), ("q", 2)]);
    let second = object_with(&mut vm, &[("p", 3), ("q", 4)]);
    let swapped = object_with(&mut vm, &[("q", 5), ("p", 6)]);

    let rt = vm.runtime();
    assert_eq!(rt.class_of(first), rt.class_of(second));
    assert_ne!(rt.class_of(first), rt.class_of(swapped));

    // A warm site serves both objects of the shared class.
    let (mut block, _) = read_target("q");
    vm.set_global("target", Value::Object(first)).unwrap();
    vm.execute(&mut block).unwrap();
    vm.set_global("target", Value::Object(second)).unwrap();
    vm.runtime_mut().reset_stats();
    assert_eq!(vm.execute(&mut block).unwrap(), Value::Smi(4));
    assert_eq!(vm.stats().reads.cache_hits, 2);
}

/// Test: writing an existing data property keeps the class and hits the write cache
#[test]
fn test_overwrite_keeps_class() {
    let mut vm = VM::new().unwrap();
    let obj = object_with(&mut vm, &[("v", 0)]);
    vm.set_global("target", Value::Object(obj)).unwrap();
    let before = vm.runtime().class_of(obj);

    // target.v = 9
    let mut chunk = BytecodeChunk::new();
    let nine = chunk.add_constant(BcValue::Number(9.0));
    chunk.emit(Opcode::LoadGlobalObject);
    chunk.emit_get_by_id("target");
    chunk.emit(Opcode::LoadConstant(nine));
    chunk.emit_put_by_id("v");
    chunk.emit(Opcode::Return);
    let mut block = CodeBlock::new(chunk);

    vm.execute(&mut block).unwrap();
    vm.execute(&mut block).unwrap();
    assert_eq!(vm.runtime().class_of(obj), before);
    assert_eq!(vm.stats().writes.cache_hits, 1);

    let value = vm
        .runtime_mut()
        .get_property(&Value::Object(obj), intern("v"), PropOpFlags::default())
        .unwrap();
    assert_eq!(value, Value::Smi(9));
}

/// Test: deleting a property moves the object to a dictionary class the site does not know
#[test]
fn test_dictionary_transition_invalidates_site() {
    let mut vm = VM::new().unwrap();
    let obj = object_with(&mut vm, &[("keep", 1), ("drop", 2)]);
    vm.set_global("target", Value::Object(obj)).unwrap();
    let (mut block, site) = read_target("keep");

    vm.execute(&mut block).unwrap();
    let fast_class = vm.runtime().class_of(obj);
    assert!(block.caches.get(site).unwrap().probe(fast_class).is_some());

    let deleted = vm
        .runtime_mut()
        .delete_named(&Value::Object(obj), intern("drop"), PropOpFlags::default())
        .unwrap();
    assert!(deleted);
    let dictionary_class = vm.runtime().class_of(obj);
    assert_ne!(dictionary_class, fast_class);
    assert!(vm.runtime().classes().is_dictionary(dictionary_class));

    vm.runtime_mut().reset_stats();
    assert_eq!(vm.execute(&mut block).unwrap(), Value::Smi(1));
    assert_eq!(vm.stats().reads.slow_paths, 1);
    // Dictionary classes are never cached.
    assert_eq!(block.caches.get(site).unwrap().probe(dictionary_class), None);
}

/// Test: prototype reads hit through the prototype's class and see updates
#[test]
fn test_prototype_hit_and_shadowing() {
    let mut vm = VM::new().unwrap();
    let proto = object_with(&mut vm, &[("m", 1)]);
    let child = vm
        .runtime_mut()
        .new_object_with_prototype(Some(proto))
        .unwrap();
    vm.set_global("target", Value::Object(child)).unwrap();
    let (mut block, _) = read_target("m");

    assert_eq!(vm.execute(&mut block).unwrap(), Value::Smi(1));
    assert_eq!(vm.execute(&mut block).unwrap(), Value::Smi(1));
    assert_eq!(vm.stats().reads.proto_cache_hits, 1);

    // Overwriting the prototype's value keeps its class; the hit sees the new value.
    vm.runtime_mut()
        .put_property(&Value::Object(proto), intern("m"), Value::Smi(2), PropOpFlags::default())
        .unwrap();
    assert_eq!(vm.execute(&mut block).unwrap(), Value::Smi(2));
    assert_eq!(vm.stats().reads.proto_cache_hits, 2);

    // An own property shadows the prototype.
    vm.runtime_mut()
        .put_property(&Value::Object(child), intern("m"), Value::Smi(3), PropOpFlags::default())
        .unwrap();
    assert_eq!(vm.execute(&mut block).unwrap(), Value::Smi(3));
}

/// Test: every read of an accessor calls the getter exactly once
#[test]
fn test_accessor_is_invoked_on_every_access() {
    let mut vm = VM::new().unwrap();
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let getter = vm
        .runtime_mut()
        .new_function(move |_, _, _| {
            counter.set(counter.get() + 1);
            Ok(Value::Smi(counter.get()))
        })
        .unwrap();
    let obj = object_with(&mut vm, &[]);
    vm.runtime_mut()
        .define_own_property(
            obj,
            intern("tick"),
            PropertyFlags::accessor(true, true),
            PropertyValue::Accessor {
                getter: Some(getter),
                setter: None,
            },
        )
        .unwrap();
    vm.set_global("target", Value::Object(obj)).unwrap();
    let (mut block, site) = read_target("tick");

    for expected in 1..=3 {
        assert_eq!(vm.execute(&mut block).unwrap(), Value::Smi(expected));
        assert_eq!(calls.get(), expected);
    }
    assert_eq!(block.caches.get(site), Some(&InlineCache::Uninitialized));
}

/// Test: an exception from a getter propagates and leaves the site untouched
#[test]
fn test_getter_exception_propagates() {
    let mut vm = VM::new().unwrap();
    let getter = vm
        .runtime_mut()
        .new_function(|_, _, _| Err(JsError::range_error("boom").into()))
        .unwrap();
    let obj = object_with(&mut vm, &[]);
    vm.runtime_mut()
        .define_own_property(
            obj,
            intern("bad"),
            PropertyFlags::accessor(true, true),
            PropertyValue::Accessor {
                getter: Some(getter),
                setter: None,
            },
        )
        .unwrap();
    vm.set_global("target", Value::Object(obj)).unwrap();
    let (mut block, site) = read_target("bad");

    match vm.execute(&mut block) {
        Err(VmError::Exception(e)) => {
            assert_eq!(e.kind, ErrorKind::RangeError);
            assert_eq!(e.message, "boom");
        }
        other => panic!("expected RangeError, got {:?}", other),
    }
    assert_eq!(block.caches.get(site), Some(&InlineCache::Uninitialized));
}

/// Test: an undeclared global read through TryGetById is a ReferenceError
#[test]
fn test_undeclared_global_is_reference_error() {
    let mut vm = VM::new().unwrap();
    let mut chunk = BytecodeChunk::new();
    let name = chunk.add_identifier("print");
    let cache = chunk.allocate_cache_index();
    chunk.emit(Opcode::LoadGlobalObject);
    chunk.emit(Opcode::TryGetById { name, cache });
    chunk.emit(Opcode::Return);

    let err = vm.execute(&mut CodeBlock::new(chunk)).unwrap_err();
    let exception = err.as_exception().expect("script-visible error");
    assert_eq!(exception.kind, ErrorKind::ReferenceError);
    assert!(exception.message.contains("print"));
}
