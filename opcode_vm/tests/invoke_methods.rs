mod common;

use classfile::opcode::Opcode;
use common::{buffered_options, op, u2, vm_with, ClassBuilder};
use opcode_vm::java_exception::{JavaException, MethodCallError};
use opcode_vm::jvm_error::VmError;
use opcode_vm::jvm_values::Value;
use opcode_vm::vm_options::{InvokeArgs, VmOptions};

const PRINTLN_STRING: &str = "(Ljava/lang/String;)V";

/// `Hello.main` prints a greeting; `Hello.stacked` prints with an extra int
/// left below the receiver and returns it.
fn hello_class() -> ClassBuilder {
    let mut class = ClassBuilder::new("Hello");
    let out = class.field_ref("java/lang/System", "out", "Ljava/io/PrintStream;");
    let greeting = class.string("Hello, World");
    let println = class.method_ref("java/io/PrintStream", "println", PRINTLN_STRING);

    let mut main = vec![op(Opcode::Getstatic)];
    main.extend(u2(out));
    main.extend([op(Opcode::Ldc), greeting as u8, op(Opcode::Invokevirtual)]);
    main.extend(u2(println));
    main.push(op(Opcode::Return));

    let mut stacked = vec![op(Opcode::Iconst_1), op(Opcode::Getstatic)];
    stacked.extend(u2(out));
    stacked.extend([op(Opcode::Ldc), greeting as u8, op(Opcode::Invokevirtual)]);
    stacked.extend(u2(println));
    stacked.push(op(Opcode::Ireturn));

    class
        .static_method("main", "([Ljava/lang/String;)V", 2, 1, main)
        .static_method("stacked", "()I", 3, 0, stacked);
    class
}

#[test]
fn hello_world_prints_to_system_out() {
    for invoke_args in [InvokeArgs::Descriptor, InvokeArgs::DrainStack] {
        let (options, sink) = buffered_options();
        let options = VmOptions { invoke_args, ..options };
        let vm = vm_with(options, vec![hello_class().build()]);
        let mut env = vm.new_thread();

        env.run_main("Hello", &[]).unwrap();
        assert_eq!(Some("Hello, World\n".to_string()), sink.contents(), "{invoke_args:?}");
    }
}

#[test]
fn descriptor_mode_leaves_deeper_operands_alone() {
    let (options, sink) = buffered_options();
    let vm = vm_with(options, vec![hello_class().build()]);
    let mut env = vm.new_thread();

    let result = env.invoke_static("Hello", "stacked", "()I", vec![]).unwrap();
    assert_eq!(Some(Value::Int(1)), result);
    assert_eq!(Some("Hello, World\n".to_string()), sink.contents());
}

#[test]
fn drain_mode_takes_the_bottom_value_as_receiver() {
    let (options, sink) = buffered_options();
    let options = VmOptions {
        invoke_args: InvokeArgs::DrainStack,
        ..options
    };
    let vm = vm_with(options, vec![hello_class().build()]);
    let mut env = vm.new_thread();

    let err = env.invoke_static("Hello", "stacked", "()I", vec![]).unwrap_err();
    assert_eq!(MethodCallError::InternalError(VmError::ValueTypeMissMatch), err);
    assert_eq!(Some(String::new()), sink.contents());
}

fn animals() -> Vec<classfile::class_file::ClassFile> {
    let mut animal = ClassBuilder::new("Animal");
    animal
        .default_constructor()
        .method(
            classfile::method_info::MethodAccessFlags::PUBLIC,
            "sound",
            "()I",
            1,
            1,
            vec![op(Opcode::Iconst_1), op(Opcode::Ireturn)],
        );

    let mut dog = ClassBuilder::new("Dog").extends("Animal");
    dog.default_constructor().method(
        classfile::method_info::MethodAccessFlags::PUBLIC,
        "sound",
        "()I",
        1,
        1,
        vec![op(Opcode::Iconst_2), op(Opcode::Ireturn)],
    );

    let mut zoo = ClassBuilder::new("Zoo");
    let dog_ref = zoo.class_ref("Dog");
    let dog_init = zoo.method_ref("Dog", "<init>", "()V");
    let sound = zoo.method_ref("Animal", "sound", "()I");
    let missing = zoo.method_ref("Animal", "fly", "()V");

    let mut dog_sound = vec![op(Opcode::New)];
    dog_sound.extend(u2(dog_ref));
    dog_sound.extend([op(Opcode::Dup), op(Opcode::Invokespecial)]);
    dog_sound.extend(u2(dog_init));
    dog_sound.push(op(Opcode::Invokevirtual));
    dog_sound.extend(u2(sound));
    dog_sound.push(op(Opcode::Ireturn));

    let mut null_sound = vec![op(Opcode::Aconst_null), op(Opcode::Invokevirtual)];
    null_sound.extend(u2(sound));
    null_sound.push(op(Opcode::Ireturn));

    let mut fly = vec![op(Opcode::New)];
    fly.extend(u2(dog_ref));
    fly.push(op(Opcode::Invokevirtual));
    fly.extend(u2(missing));
    fly.push(op(Opcode::Return));

    zoo.static_method("dogSound", "()I", 2, 0, dog_sound)
        .static_method("nullSound", "()I", 1, 0, null_sound)
        .static_method("fly", "()V", 1, 0, fly);
    vec![animal.build(), dog.build(), zoo.build()]
}

#[test]
fn invokevirtual_selects_the_runtime_override() {
    let vm = vm_with(VmOptions::default(), animals());
    let mut env = vm.new_thread();

    assert_eq!(Some(Value::Int(2)), env.invoke_static("Zoo", "dogSound", "()I", vec![]).unwrap());
    assert!(vm.is_class_loaded("Animal"));
}

#[test]
fn null_receiver_and_missing_method_are_recoverable() {
    let vm = vm_with(VmOptions::default(), animals());
    let mut env = vm.new_thread();

    let err = env.invoke_static("Zoo", "nullSound", "()I", vec![]).unwrap_err();
    assert!(matches!(err, MethodCallError::ExceptionThrown(JavaException::NullPointer(_))));
    let err = env.invoke_static("Zoo", "fly", "()V", vec![]).unwrap_err();
    assert_eq!(
        MethodCallError::ExceptionThrown(JavaException::NoSuchMethod {
            class_name: "Animal".to_string(),
            name: "fly".to_string(),
            descriptor: "()V".to_string()
        }),
        err
    );
    assert_eq!(0, env.call_stack().depth());
}

#[test]
fn main_receives_its_arguments() {
    let mut class = ClassBuilder::new("Echo");
    let out = class.field_ref("java/lang/System", "out", "Ljava/io/PrintStream;");
    let println = class.method_ref("java/io/PrintStream", "println", PRINTLN_STRING);
    let println_int = class.method_ref("java/io/PrintStream", "println", "(I)V");
    let length = class.method_ref("java/lang/String", "length", "()I");
    let mut main = vec![op(Opcode::Getstatic)];
    main.extend(u2(out));
    main.extend([op(Opcode::Aload_0), op(Opcode::Iconst_1), op(Opcode::Aaload), op(Opcode::Invokevirtual)]);
    main.extend(u2(println));
    main.push(op(Opcode::Getstatic));
    main.extend(u2(out));
    main.extend([op(Opcode::Aload_0), op(Opcode::Iconst_0), op(Opcode::Aaload), op(Opcode::Invokevirtual)]);
    main.extend(u2(length));
    main.push(op(Opcode::Invokevirtual));
    main.extend(u2(println_int));
    main.push(op(Opcode::Return));
    class.static_method("main", "([Ljava/lang/String;)V", 3, 1, main);

    let (options, sink) = buffered_options();
    let vm = vm_with(options, vec![class.build()]);
    let mut env = vm.new_thread();

    env.run_main("Echo", &["héllo".to_string(), "there".to_string()])
        .unwrap();
    assert_eq!(Some("there\n5\n".to_string()), sink.contents());
}

#[test]
fn missing_main_class_is_reported() {
    let vm = vm_with(VmOptions::default(), vec![]);
    let mut env = vm.new_thread();

    let err = env.run_main("Nowhere", &[]).unwrap_err();
    assert_eq!(
        MethodCallError::ExceptionThrown(JavaException::NoClassDefFound("Nowhere".to_string())),
        err
    );
}
