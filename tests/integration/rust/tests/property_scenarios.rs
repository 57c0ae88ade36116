//! Property Access Scenario Tests
//!
//! End-to-end scenarios run as bytecode: overwriting a property through a
//! computed key, accessor read-modify-write, setters reached from primitive
//! receivers and add/delete churn on a single object.

use std::cell::RefCell;
use std::rc::Rc;

use bytecode_system::{BytecodeChunk, Opcode, RegisterId, Value as BcValue};
use core_types::{ErrorKind, Value};
use integration_tests::{call_log, object_with};
use interpreter::{CodeBlock, InlineCache, PropOpFlags, PropertyValue, VmError, VM};
use memory_manager::{intern, ClassId, ObjectKind, PropertyFlags, DIRECT_PROPERTY_SLOTS};

/// Emit `record(r0)` and discard the result.
fn emit_record_r0(chunk: &mut BytecodeChunk) {
    chunk.emit(Opcode::LoadGlobalObject);
    chunk.emit_get_by_id("record");
    chunk.emit(Opcode::LoadUndefined);
    chunk.emit(Opcode::LoadLocal(RegisterId(0)));
    chunk.emit(Opcode::Call(1));
    chunk.emit(Opcode::Pop);
}

/// Emit `r0[key] = constant` and discard the result.
fn emit_store_by_val(chunk: &mut BytecodeChunk, key: usize, constant: usize) {
    chunk.emit(Opcode::LoadLocal(RegisterId(0)));
    chunk.emit(Opcode::LoadConstant(key));
    chunk.emit(Opcode::LoadConstant(constant));
    chunk.emit(Opcode::PutByVal);
    chunk.emit(Opcode::Pop);
}

/// Test: var x = {}; x["foo"] = 5; x["foo"] = 7; return x["foo"];
#[test]
fn test_overwrite_through_computed_key_keeps_class() {
    let mut vm = VM::new().unwrap();
    let classes: Rc<RefCell<Vec<ClassId>>> = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&classes);
    let record = vm
        .runtime_mut()
        .new_function(move |rt, _, args| {
            if let Some(id) = args.first().and_then(Value::as_object) {
                seen.borrow_mut().push(rt.class_of(id));
            }
            Ok(Value::Undefined)
        })
        .unwrap();
    vm.set_global("record", Value::Object(record)).unwrap();

    let mut chunk = BytecodeChunk::new();
    chunk.register_count = 1;
    let foo = chunk.add_constant(BcValue::from("foo"));
    let five = chunk.add_constant(BcValue::Number(5.0));
    let seven = chunk.add_constant(BcValue::Number(7.0));
    chunk.emit(Opcode::NewObject);
    chunk.emit(Opcode::StoreLocal(RegisterId(0)));
    emit_store_by_val(&mut chunk, foo, five);
    emit_record_r0(&mut chunk);
    emit_store_by_val(&mut chunk, foo, seven);
    emit_record_r0(&mut chunk);
    chunk.emit(Opcode::LoadLocal(RegisterId(0)));
    chunk.emit(Opcode::LoadConstant(foo));
    chunk.emit(Opcode::GetByVal);
    chunk.emit(Opcode::Return);

    let result = vm.execute(&mut CodeBlock::new(chunk)).unwrap();
    assert_eq!(result, Value::Smi(7));

    let classes = classes.borrow();
    assert_eq!(classes.len(), 2);
    assert_eq!(classes[0], classes[1], "overwrite must not change the class");
    assert_eq!(vm.runtime().classes().class(classes[0]).property_count(), 1);
}

/// Test: obj.a = obj.a calls the getter once, then the setter once with its result
#[test]
fn test_accessor_read_modify_write_order() {
    let mut vm = VM::new().unwrap();
    let log = call_log();

    let getter_log = Rc::clone(&log);
    let getter = vm
        .runtime_mut()
        .new_function(move |_, _, _| {
            getter_log.borrow_mut().push("get".to_string());
            Ok(Value::Smi(42))
        })
        .unwrap();
    let setter_log = Rc::clone(&log);
    let setter = vm
        .runtime_mut()
        .new_function(move |_, _, args| {
            let arg = args.first().cloned().unwrap_or(Value::Undefined);
            setter_log.borrow_mut().push(format!("set {}", arg));
            Ok(Value::Undefined)
        })
        .unwrap();
    vm.set_global("getA", Value::Object(getter)).unwrap();
    vm.set_global("setA", Value::Object(setter)).unwrap();

    // var obj = { get a() {...}, set a(v) {...} }; obj.a = obj.a;
    let mut chunk = BytecodeChunk::new();
    chunk.register_count = 1;
    let a = chunk.add_identifier("a");
    chunk.emit(Opcode::NewObject);
    chunk.emit(Opcode::Dup);
    chunk.emit(Opcode::LoadGlobalObject);
    chunk.emit_get_by_id("getA");
    chunk.emit(Opcode::LoadGlobalObject);
    chunk.emit_get_by_id("setA");
    chunk.emit(Opcode::PutOwnGetterSetter { name: a });
    chunk.emit(Opcode::StoreLocal(RegisterId(0)));
    chunk.emit(Opcode::LoadLocal(RegisterId(0)));
    chunk.emit(Opcode::LoadLocal(RegisterId(0)));
    let get_site = chunk.emit_get_by_id("a");
    let put_site = chunk.emit_put_by_id("a");
    chunk.emit(Opcode::Return);
    let mut block = CodeBlock::new(chunk);

    assert_eq!(vm.execute(&mut block).unwrap(), Value::Smi(42));
    assert_eq!(*log.borrow(), vec!["get".to_string(), "set 42".to_string()]);

    // Accessor results are never cached.
    assert_eq!(block.caches.get(get_site), Some(&InlineCache::Uninitialized));
    assert_eq!(block.caches.get(put_site), Some(&InlineCache::Uninitialized));
}

fn install_number_setter(vm: &mut VM, calls: Rc<RefCell<Vec<(Value, Value)>>>) {
    let setter = vm
        .runtime_mut()
        .new_function(move |rt, this, args| {
            let receiver = match this.as_object().map(|id| &rt.heap().get(id).kind) {
                Some(ObjectKind::PrimitiveBox(inner)) => inner.clone(),
                _ => this.clone(),
            };
            let arg = args.first().cloned().unwrap_or(Value::Undefined);
            calls.borrow_mut().push((receiver, arg));
            Ok(Value::Undefined)
        })
        .unwrap();
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
    )
    .unwrap();
}

/// `(1).accessor = 10`
fn primitive_store_block(strict: bool) -> CodeBlock {
    let mut chunk = if strict {
        BytecodeChunk::new_strict()
    } else {
        BytecodeChunk::new()
    };
    let one = chunk.add_constant(BcValue::Number(1.0));
    let ten = chunk.add_constant(BcValue::Number(10.0));
    chunk.emit(Opcode::LoadConstant(one));
    chunk.emit(Opcode::LoadConstant(ten));
    chunk.emit_put_by_id("accessor");
    chunk.emit(Opcode::Return);
    CodeBlock::new(chunk)
}

/// Test: Object.defineProperty(Number.prototype, "accessor", {set: fn}); (1).accessor = 10;
#[test]
fn test_prototype_setter_on_primitive_receiver() {
    let mut vm = VM::new().unwrap();
    let calls = Rc::new(RefCell::new(Vec::new()));
    install_number_setter(&mut vm, Rc::clone(&calls));

    let number_prototype = vm.runtime().intrinsics().number_prototype;
    let class_before = vm.runtime().class_of(number_prototype);
    let keys_before = vm.runtime().own_property_keys(number_prototype, false);

    let result = vm.execute(&mut primitive_store_block(false)).unwrap();
    assert_eq!(result, Value::Smi(10));
    assert_eq!(*calls.borrow(), vec![(Value::Smi(1), Value::Smi(10))]);

    assert_eq!(vm.runtime().class_of(number_prototype), class_before);
    assert_eq!(
        vm.runtime().own_property_keys(number_prototype, false),
        keys_before
    );
    assert_eq!(vm.stats().writes.transient, 1);
}

/// Test: the same store in strict code still reaches the setter without throwing
#[test]
fn test_prototype_setter_on_primitive_receiver_strict() {
    let mut vm = VM::new().unwrap();
    let calls = Rc::new(RefCell::new(Vec::new()));
    install_number_setter(&mut vm, Rc::clone(&calls));

    vm.execute(&mut primitive_store_block(true)).unwrap();
    assert_eq!(calls.borrow().len(), 1);
}

/// Test: a primitive store with no setter is ignored in sloppy code, TypeError in strict
#[test]
fn test_primitive_store_without_setter() {
    let mut vm = VM::new().unwrap();
    assert_eq!(
        vm.execute(&mut primitive_store_block(false)).unwrap(),
        Value::Smi(10)
    );

    match vm.execute(&mut primitive_store_block(true)) {
        Err(VmError::Exception(e)) => {
            assert_eq!(e.kind, ErrorKind::TypeError);
            assert!(e.message.contains("accessor"), "{}", e.message);
        }
        other => panic!("expected TypeError, got {:?}", other),
    }
    let number_prototype = vm.runtime().intrinsics().number_prototype;
    assert!(vm
        .runtime()
        .own_property_keys(number_prototype, false)
        .is_empty());
}

/// Test: adding and deleting the same key 1,000,000 times leaves the object empty
#[test]
fn test_add_delete_churn_does_not_grow() {
    let mut vm = VM::new().unwrap();
    let set = object_with(&mut vm, &[]);
    let receiver = Value::Object(set);
    let key = intern("churn_key");
    let mut site = InlineCache::new();

    let rt = vm.runtime_mut();
    let mut classes_after_warmup = 0;
    for round in 0..1_000_000u32 {
        rt.put_by_id(Some(&mut site), &receiver, key, Value::Boolean(true), PropOpFlags::default())
            .unwrap();
        assert!(rt.delete_named(&receiver, key, PropOpFlags::default()).unwrap());
        if round == 10 {
            classes_after_warmup = rt.classes().class_count();
        }
    }

    assert!(rt.own_property_keys(set, false).is_empty());
    assert!(!rt.has_own_property(set, key));
    assert_eq!(rt.heap().get(set).storage().capacity(), DIRECT_PROPERTY_SLOTS);
    assert_eq!(rt.classes().class_count(), classes_after_warmup);
}
