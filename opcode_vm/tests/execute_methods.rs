mod common;

use classfile::opcode::Opcode;
use common::{buffered_options, op, u2, vm_with, ClassBuilder};
use opcode_vm::class_model::JvmObject;
use opcode_vm::java_exception::{JavaException, MethodCallError};
use opcode_vm::jvm_error::VmError;
use opcode_vm::jvm_values::Value;
use opcode_vm::vm_options::VmOptions;

fn run_static(class: ClassBuilder, name: &str, descriptor: &str) -> Result<Option<Value>, MethodCallError> {
    let vm = vm_with(VmOptions::default(), vec![class.build()]);
    let mut env = vm.new_thread();
    env.invoke_static("Calc", name, descriptor, vec![])
}

#[test]
fn double_local_round_trip() {
    let mut class = ClassBuilder::new("Calc");
    class.static_method(
        "one",
        "()D",
        2,
        3,
        vec![
            op(Opcode::Dconst_1),
            op(Opcode::Dstore_1),
            op(Opcode::Dload_1),
            op(Opcode::Dreturn),
        ],
    );
    assert_eq!(Some(Value::Double(1.0)), run_static(class, "one", "()D").unwrap());
}

#[test]
fn iinc_updates_the_local_in_place() {
    let mut class = ClassBuilder::new("Calc");
    class.static_method(
        "eight",
        "()I",
        1,
        1,
        vec![
            op(Opcode::Iconst_3),
            op(Opcode::Istore_0),
            op(Opcode::Iinc),
            0,
            5,
            op(Opcode::Iload_0),
            op(Opcode::Ireturn),
        ],
    );
    assert_eq!(Some(Value::Int(8)), run_static(class, "eight", "()I").unwrap());
}

#[test]
fn int_to_double_conversion() {
    let mut class = ClassBuilder::new("Calc");
    class.static_method(
        "five",
        "()D",
        2,
        0,
        vec![op(Opcode::Iconst_5), op(Opcode::I2d), op(Opcode::Dreturn)],
    );
    assert_eq!(Some(Value::Double(5.0)), run_static(class, "five", "()D").unwrap());
}

#[test]
fn arguments_bind_to_locals() {
    let mut class = ClassBuilder::new("Calc");
    // (JI)J: long in slots 0-1, int in slot 2
    class.static_method(
        "scale",
        "(JI)J",
        4,
        3,
        vec![
            op(Opcode::Lload_0),
            op(Opcode::Iload_2),
            op(Opcode::I2l),
            op(Opcode::Lmul),
            op(Opcode::Lreturn),
        ],
    );
    let vm = vm_with(VmOptions::default(), vec![class.build()]);
    let mut env = vm.new_thread();
    let result = env
        .invoke_static("Calc", "scale", "(JI)J", vec![Value::Long(1 << 40), Value::Int(3)])
        .unwrap();
    assert_eq!(Some(Value::Long(3 << 40)), result);
}

#[test]
fn ldc_pushes_loadable_constants() {
    let mut class = ClassBuilder::new("Calc");
    let int = class.integer(100_000);
    let float = class.float(2.5);
    let long = class.long(-7);
    let double = class.double(0.25);
    let string = class.string("constant");
    class
        .static_method("int", "()I", 1, 0, vec![op(Opcode::Ldc), int as u8, op(Opcode::Ireturn)])
        .static_method("float", "()F", 1, 0, vec![op(Opcode::Ldc), float as u8, op(Opcode::Freturn)])
        .static_method(
            "long",
            "()J",
            2,
            0,
            [vec![op(Opcode::Ldc2_w)], u2(long).to_vec(), vec![op(Opcode::Lreturn)]].concat(),
        )
        .static_method(
            "double",
            "()D",
            2,
            0,
            [vec![op(Opcode::Ldc2_w)], u2(double).to_vec(), vec![op(Opcode::Dreturn)]].concat(),
        )
        .static_method(
            "string",
            "()Ljava/lang/String;",
            1,
            0,
            [vec![op(Opcode::Ldc_w)], u2(string).to_vec(), vec![op(Opcode::Areturn)]].concat(),
        );
    let vm = vm_with(VmOptions::default(), vec![class.build()]);
    let mut env = vm.new_thread();

    let mut call = |name: &str, descriptor: &str| env.invoke_static("Calc", name, descriptor, vec![]).unwrap();
    assert_eq!(Some(Value::Int(100_000)), call("int", "()I"));
    assert_eq!(Some(Value::Float(2.5)), call("float", "()F"));
    assert_eq!(Some(Value::Long(-7)), call("long", "()J"));
    assert_eq!(Some(Value::Double(0.25)), call("double", "()D"));
    match call("string", "()Ljava/lang/String;") {
        Some(Value::ObjectRef(object)) => {
            assert_eq!(Some("constant"), object.as_str());
            assert!(std::sync::Arc::ptr_eq(&object, &vm.intern_string("constant").unwrap()));
        }
        other => panic!("expected a string, got {other:?}"),
    }
}

#[test]
fn ldc_of_unloadable_constant_is_fatal() {
    let mut class = ClassBuilder::new("Calc");
    let long = class.long(1);
    let class_ref = class.class_ref("Calc");
    class
        .static_method("narrow", "()J", 2, 0, vec![op(Opcode::Ldc), long as u8, op(Opcode::Lreturn)])
        .static_method(
            "class",
            "()Ljava/lang/Object;",
            1,
            0,
            vec![op(Opcode::Ldc), class_ref as u8, op(Opcode::Areturn)],
        );
    let vm = vm_with(VmOptions::default(), vec![class.build()]);
    let mut env = vm.new_thread();

    let err = env.invoke_static("Calc", "narrow", "()J", vec![]).unwrap_err();
    assert_eq!(MethodCallError::InternalError(VmError::UnresolvedConstantTag(5)), err);
    let err = env
        .invoke_static("Calc", "class", "()Ljava/lang/Object;", vec![])
        .unwrap_err();
    assert_eq!(MethodCallError::InternalError(VmError::UnresolvedConstantTag(7)), err);
    assert_eq!(0, env.call_stack().depth());
}

#[test]
fn unimplemented_opcode_aborts_every_caller() {
    let mut class = ClassBuilder::new("Calc");
    let inner = class.method_ref("Calc", "inner", "()V");
    let mut outer = vec![op(Opcode::Iconst_1), op(Opcode::Invokestatic)];
    outer.extend(u2(inner));
    outer.extend([op(Opcode::Iconst_2), op(Opcode::Ireturn)]);
    class
        .static_method("outer", "()I", 2, 0, outer)
        .static_method(
            "inner",
            "()V",
            1,
            0,
            vec![op(Opcode::Aconst_null), op(Opcode::Monitorenter), op(Opcode::Return)],
        );
    let vm = vm_with(VmOptions::default(), vec![class.build()]);
    let mut env = vm.new_thread();

    let err = env.invoke_static("Calc", "outer", "()I", vec![]).unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(
        MethodCallError::InternalError(VmError::UnimplementedOpcode("monitorenter".to_string())),
        err
    );
    assert_eq!("internal error: The opcode monitorenter Not Impl", err.to_string());
    assert_eq!(0, env.call_stack().depth());
}

#[test]
fn exceptions_unwind_without_handlers() {
    let mut class = ClassBuilder::new("Calc");
    class.static_method(
        "divide",
        "(II)I",
        2,
        2,
        vec![op(Opcode::Iload_0), op(Opcode::Iload_1), op(Opcode::Idiv), op(Opcode::Ireturn)],
    );
    let vm = vm_with(VmOptions::default(), vec![class.build()]);
    let mut env = vm.new_thread();

    let result = env.invoke_static("Calc", "divide", "(II)I", vec![Value::Int(7), Value::Int(2)]);
    assert_eq!(Some(Value::Int(3)), result.unwrap());
    let result = env.invoke_static("Calc", "divide", "(II)I", vec![Value::Int(i32::MIN), Value::Int(-1)]);
    assert_eq!(Some(Value::Int(i32::MIN)), result.unwrap());
    let err = env
        .invoke_static("Calc", "divide", "(II)I", vec![Value::Int(7), Value::Int(0)])
        .unwrap_err();
    assert!(!err.is_fatal());
    assert_eq!(
        MethodCallError::ExceptionThrown(JavaException::Arithmetic("/ by zero".to_string())),
        err
    );
}

#[test]
fn runaway_recursion_overflows_the_call_stack() {
    let mut class = ClassBuilder::new("Calc");
    let recurse = class.method_ref("Calc", "recurse", "()V");
    let mut code = vec![op(Opcode::Invokestatic)];
    code.extend(u2(recurse));
    code.push(op(Opcode::Return));
    class.static_method("recurse", "()V", 0, 0, code);
    let options = VmOptions {
        max_call_depth: 16,
        ..VmOptions::default()
    };
    let vm = vm_with(options, vec![class.build()]);
    let mut env = vm.new_thread();

    let err = env.invoke_static("Calc", "recurse", "()V", vec![]).unwrap_err();
    assert_eq!(MethodCallError::InternalError(VmError::StackOverFlow), err);
    assert_eq!(0, env.call_stack().depth());
}

#[test]
fn arrays_store_and_load_elements() {
    let mut class = ClassBuilder::new("Calc");
    // int[] a = new int[3]; a[2] = 40; return a[2] + a.length - 1;
    class.static_method(
        "array",
        "()I",
        3,
        1,
        vec![
            op(Opcode::Iconst_3),
            op(Opcode::Newarray),
            10,
            op(Opcode::Astore_0),
            op(Opcode::Aload_0),
            op(Opcode::Iconst_2),
            op(Opcode::Bipush),
            40,
            op(Opcode::Iastore),
            op(Opcode::Aload_0),
            op(Opcode::Iconst_2),
            op(Opcode::Iaload),
            op(Opcode::Aload_0),
            op(Opcode::Arraylength),
            op(Opcode::Iadd),
            op(Opcode::Iconst_1),
            op(Opcode::Isub),
            op(Opcode::Ireturn),
        ],
    );
    class.static_method(
        "outOfBounds",
        "()I",
        2,
        0,
        vec![
            op(Opcode::Iconst_1),
            op(Opcode::Newarray),
            10,
            op(Opcode::Iconst_1),
            op(Opcode::Iaload),
            op(Opcode::Ireturn),
        ],
    );
    let vm = vm_with(VmOptions::default(), vec![class.build()]);
    let mut env = vm.new_thread();

    assert_eq!(
        Some(Value::Int(42)),
        env.invoke_static("Calc", "array", "()I", vec![]).unwrap()
    );
    let err = env.invoke_static("Calc", "outOfBounds", "()I", vec![]).unwrap_err();
    assert_eq!(
        MethodCallError::ExceptionThrown(JavaException::ArrayIndexOutOfBounds { index: 1, length: 1 }),
        err
    );
}

#[test]
fn caller_rejects_a_result_of_the_wrong_width() {
    let mut class = ClassBuilder::new("Calc");
    let wrong = class.method_ref("Calc", "wrong", "()I");
    let mut caller = vec![op(Opcode::Invokestatic)];
    caller.extend(u2(wrong));
    caller.push(op(Opcode::Ireturn));
    class
        .static_method("wrong", "()I", 2, 0, vec![op(Opcode::Lconst_1), op(Opcode::Lreturn)])
        .static_method("caller", "()I", 2, 0, caller);
    let (options, _) = buffered_options();
    let vm = vm_with(options, vec![class.build()]);
    let mut env = vm.new_thread();

    let err = env.invoke_static("Calc", "caller", "()I", vec![]).unwrap_err();
    assert_eq!(MethodCallError::InternalError(VmError::ValueTypeMissMatch), err);
}
