use crate::class_model::{ClassRef, JvmClass, JvmMethod, JvmObject, MethodRef};
use crate::env::Env;
use crate::java_exception::{InvokeMethodResult, InvokeResult, JavaException, MethodCallError};
use crate::jvm_error::VmError;
use crate::jvm_values::{ObjectRef, Value};
use crate::object::BytecodeObject;
use crate::static_field_area::{StaticField, StaticFieldArea};
use crate::vm_options::{OutputSink, VmOptions};
use classfile::class_file::ClassAccessFlags;
use classfile::field_info::FieldAccessFlags;
use classfile::method_info::MethodAccessFlags;
use indexmap::IndexMap;
use std::any::Any;
use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter, LowerExp};
use std::sync::{Arc, Weak};

pub const JAVA_LANG_OBJECT: &str = "java/lang/Object";
pub const JAVA_LANG_STRING: &str = "java/lang/String";
pub const JAVA_LANG_SYSTEM: &str = "java/lang/System";
pub const JAVA_IO_PRINT_STREAM: &str = "java/io/PrintStream";

pub type NativeFunction = fn(&mut Env, Option<Value>, Vec<Value>) -> InvokeMethodResult;

/// A method implemented by the VM itself.
pub struct NativeMethod {
    class_name: String,
    name: String,
    descriptor: String,
    access_flags: MethodAccessFlags,
    func: NativeFunction,
}

impl JvmMethod for NativeMethod {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn descriptor(&self) -> &str {
        &self.descriptor
    }

    fn access_flags(&self) -> MethodAccessFlags {
        self.access_flags
    }

    fn call(&self, env: &mut Env, receiver: Option<Value>, args: Vec<Value>) -> InvokeMethodResult {
        (self.func)(env, receiver, args)
    }
}

/// What `new` does with a built-in class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instantiation {
    Allowed,
    Unsupported,
    PrivateConstructor,
}

/// A class whose methods are all native.
pub struct NativeClass {
    name: String,
    super_class: Option<ClassRef>,
    access_flags: ClassAccessFlags,
    instantiation: Instantiation,
    methods: IndexMap<String, Arc<NativeMethod>>,
    statics: StaticFieldArea,
    self_ref: Weak<NativeClass>,
}

impl NativeClass {
    fn new(
        name: &str,
        super_class: Option<ClassRef>,
        instantiation: Instantiation,
        methods: &[(&str, &str, MethodAccessFlags, NativeFunction)],
    ) -> Arc<NativeClass> {
        let methods = methods
            .iter()
            .map(|(method_name, descriptor, flags, func)| {
                let method = NativeMethod {
                    class_name: name.to_string(),
                    name: method_name.to_string(),
                    descriptor: descriptor.to_string(),
                    access_flags: *flags | MethodAccessFlags::NATIVE,
                    func: *func,
                };
                (format!("{method_name}{descriptor}"), Arc::new(method))
            })
            .collect();
        Arc::new_cyclic(|self_ref| NativeClass {
            name: name.to_string(),
            super_class,
            access_flags: ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER,
            instantiation,
            methods,
            statics: StaticFieldArea::new(name),
            self_ref: self_ref.clone(),
        })
    }

    fn weak(self: &Arc<Self>) -> Weak<dyn JvmClass> {
        let class: ClassRef = self.clone();
        Arc::downgrade(&class)
    }

    fn no_such_field(&self, name: &str) -> MethodCallError {
        JavaException::NoSuchField {
            class_name: self.name.clone(),
            name: name.to_string(),
        }
        .into()
    }
}

impl JvmClass for NativeClass {
    fn name(&self) -> &str {
        &self.name
    }

    fn super_class(&self) -> Option<ClassRef> {
        self.super_class.clone()
    }

    fn access_flags(&self) -> ClassAccessFlags {
        self.access_flags
    }

    fn new_instance(&self, _env: &mut Env) -> InvokeResult<ObjectRef> {
        match self.instantiation {
            Instantiation::Allowed => {
                let class: ClassRef = self
                    .self_ref
                    .upgrade()
                    .ok_or_else(|| VmError::ClassUnloaded(self.name.clone()))?;
                Ok(Arc::new(BytecodeObject::new(&class)))
            }
            Instantiation::Unsupported => Err(JavaException::Instantiation(self.name.clone()).into()),
            Instantiation::PrivateConstructor => Err(JavaException::IllegalAccess(format!(
                "{}.<init>()V is private",
                self.name
            ))
            .into()),
        }
    }

    fn get_method(&self, name: &str, descriptor: &str, flags: MethodAccessFlags) -> InvokeResult<MethodRef> {
        match self.methods.get(&format!("{name}{descriptor}")) {
            Some(method) if method.access_flags.contains(flags) => Ok(method.clone()),
            Some(method) => Err(JavaException::IllegalAccess(format!(
                "{}.{}{} has flags {:?}, {:?} required",
                self.name, name, descriptor, method.access_flags, flags
            ))
            .into()),
            None => match &self.super_class {
                Some(super_class) => super_class.get_method(name, descriptor, flags),
                None => Err(JavaException::NoSuchMethod {
                    class_name: self.name.clone(),
                    name: name.to_string(),
                    descriptor: descriptor.to_string(),
                }
                .into()),
            },
        }
    }

    fn get_field(&self, name: &str, descriptor: &str, flags: FieldAccessFlags) -> InvokeResult<Value> {
        self.statics
            .get(name, descriptor, flags)
            .unwrap_or_else(|| Err(self.no_such_field(name)))
    }

    fn put_field(&self, _env: &mut Env, name: &str, value: Value) -> InvokeResult<()> {
        self.statics
            .put(name, value, false)
            .unwrap_or_else(|| Err(self.no_such_field(name)))
    }
}

/// An interned `java/lang/String`.
pub struct JavaString {
    class: Weak<dyn JvmClass>,
    value: String,
}

impl JvmObject for JavaString {
    fn class_name(&self) -> &str {
        JAVA_LANG_STRING
    }

    fn get_class(&self) -> InvokeResult<ClassRef> {
        self.class
            .upgrade()
            .ok_or_else(|| VmError::ClassUnloaded(JAVA_LANG_STRING.to_string()).into())
    }

    fn get_field(&self, _class_name: &str, name: &str) -> InvokeResult<Value> {
        Err(JavaException::NoSuchField {
            class_name: JAVA_LANG_STRING.to_string(),
            name: name.to_string(),
        }
        .into())
    }

    fn put_field(&self, class_name: &str, name: &str, _value: Value) -> InvokeResult<()> {
        self.get_field(class_name, name).map(|_| ())
    }

    fn as_str(&self) -> Option<&str> {
        Some(&self.value)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Debug for JavaString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.value)
    }
}

/// `System.out` / `System.err`.
pub struct PrintStreamObject {
    class: Weak<dyn JvmClass>,
    sink: OutputSink,
}

impl JvmObject for PrintStreamObject {
    fn class_name(&self) -> &str {
        JAVA_IO_PRINT_STREAM
    }

    fn get_class(&self) -> InvokeResult<ClassRef> {
        self.class
            .upgrade()
            .ok_or_else(|| VmError::ClassUnloaded(JAVA_IO_PRINT_STREAM.to_string()).into())
    }

    fn get_field(&self, _class_name: &str, name: &str) -> InvokeResult<Value> {
        Err(JavaException::NoSuchField {
            class_name: JAVA_IO_PRINT_STREAM.to_string(),
            name: name.to_string(),
        }
        .into())
    }

    fn put_field(&self, class_name: &str, name: &str, _value: Value) -> InvokeResult<()> {
        self.get_field(class_name, name).map(|_| ())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Debug for PrintStreamObject {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "PrintStream({:?})", self.sink)
    }
}

/// Built-in runtime classes, created once per VM.
pub struct NativeMethodArea {
    classes: HashMap<String, ClassRef>,
    string_class: Weak<dyn JvmClass>,
}

impl NativeMethodArea {
    pub fn new_with_default_native(options: &VmOptions) -> NativeMethodArea {
        let public = MethodAccessFlags::PUBLIC;
        let object = NativeClass::new(
            JAVA_LANG_OBJECT,
            None,
            Instantiation::Allowed,
            &[("<init>", "()V", public, Self::nop)],
        );
        let string = NativeClass::new(
            JAVA_LANG_STRING,
            Some(object.clone()),
            Instantiation::Unsupported,
            &[
                ("length", "()I", public, Self::java_lang_string_length),
                ("equals", "(Ljava/lang/Object;)Z", public, Self::java_lang_string_equals),
            ],
        );
        let print_stream = NativeClass::new(
            JAVA_IO_PRINT_STREAM,
            Some(object.clone()),
            Instantiation::Unsupported,
            &[
                ("println", "()V", public, Self::java_io_print_stream_println),
                ("println", "(Ljava/lang/String;)V", public, Self::java_io_print_stream_println),
                ("println", "(Ljava/lang/Object;)V", public, Self::java_io_print_stream_println),
                ("println", "(I)V", public, Self::java_io_print_stream_println),
                ("println", "(J)V", public, Self::java_io_print_stream_println),
                ("println", "(F)V", public, Self::java_io_print_stream_println),
                ("println", "(D)V", public, Self::java_io_print_stream_println),
                ("println", "(Z)V", public, Self::java_io_print_stream_println_boolean),
                ("println", "(C)V", public, Self::java_io_print_stream_println_char),
                ("print", "(Ljava/lang/String;)V", public, Self::java_io_print_stream_print),
                ("print", "(I)V", public, Self::java_io_print_stream_print),
            ],
        );
        let system = NativeClass::new(
            JAVA_LANG_SYSTEM,
            Some(object.clone()),
            Instantiation::PrivateConstructor,
            &[],
        );
        let stream_flags = FieldAccessFlags::PUBLIC | FieldAccessFlags::FINAL;
        for (name, sink) in [("out", &options.stdout), ("err", &options.stderr)] {
            let stream = PrintStreamObject {
                class: print_stream.weak(),
                sink: sink.clone(),
            };
            system.statics.define(
                name,
                StaticField::new(
                    "Ljava/io/PrintStream;",
                    stream_flags,
                    Value::ObjectRef(Arc::new(stream)),
                ),
            );
        }

        let string_class = string.weak();
        let classes = [object, string, print_stream, system]
            .into_iter()
            .map(|class| {
                let class: ClassRef = class;
                (class.name().to_string(), class)
            })
            .collect();
        NativeMethodArea {
            classes,
            string_class,
        }
    }

    pub fn get_class(&self, name: &str) -> Option<ClassRef> {
        self.classes.get(name).cloned()
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    pub fn new_string(&self, value: &str) -> ObjectRef {
        Arc::new(JavaString {
            class: self.string_class.clone(),
            value: value.to_string(),
        })
    }

    pub fn nop(_env: &mut Env, _receiver: Option<Value>, _args: Vec<Value>) -> InvokeMethodResult {
        Ok(None)
    }

    pub fn java_lang_string_length(_env: &mut Env, receiver: Option<Value>, _args: Vec<Value>) -> InvokeMethodResult {
        let value = receiver_str(&receiver)?;
        Ok(Some(Value::Int(value.encode_utf16().count() as i32)))
    }

    pub fn java_lang_string_equals(_env: &mut Env, receiver: Option<Value>, args: Vec<Value>) -> InvokeMethodResult {
        let value = receiver_str(&receiver)?;
        let equal = match args.first() {
            Some(Value::ObjectRef(other)) => other.as_str() == Some(value),
            _ => false,
        };
        Ok(Some(Value::Int(equal as i32)))
    }

    pub fn java_io_print_stream_println(_env: &mut Env, receiver: Option<Value>, args: Vec<Value>) -> InvokeMethodResult {
        let text = args.first().map(java_to_string).unwrap_or_default();
        write_to_stream(&receiver, &format!("{text}\n"))
    }

    pub fn java_io_print_stream_print(_env: &mut Env, receiver: Option<Value>, args: Vec<Value>) -> InvokeMethodResult {
        let text = args.first().map(java_to_string).unwrap_or_default();
        write_to_stream(&receiver, &text)
    }

    pub fn java_io_print_stream_println_boolean(
        _env: &mut Env,
        receiver: Option<Value>,
        args: Vec<Value>,
    ) -> InvokeMethodResult {
        let value = args.first().ok_or(VmError::ValueTypeMissMatch)?.get_int()?;
        write_to_stream(&receiver, &format!("{}\n", value != 0))
    }

    pub fn java_io_print_stream_println_char(
        _env: &mut Env,
        receiver: Option<Value>,
        args: Vec<Value>,
    ) -> InvokeMethodResult {
        let value = args.first().ok_or(VmError::ValueTypeMissMatch)?.get_int()?;
        let text = String::from_utf16_lossy(&[value as u16]);
        write_to_stream(&receiver, &format!("{text}\n"))
    }
}

fn receiver_str(receiver: &Option<Value>) -> InvokeResult<&str> {
    match receiver {
        Some(Value::ObjectRef(object)) => object.as_str().ok_or_else(|| VmError::ValueTypeMissMatch.into()),
        _ => Err(VmError::ValueTypeMissMatch.into()),
    }
}

fn write_to_stream(receiver: &Option<Value>, text: &str) -> InvokeMethodResult {
    let stream = match receiver {
        Some(Value::ObjectRef(object)) => object.as_any().downcast_ref::<PrintStreamObject>(),
        _ => None,
    }
    .ok_or(VmError::ValueTypeMissMatch)?;
    stream
        .sink
        .write_str(text)
        .map_err(|e| VmError::ExecuteCodeError(e.to_string()))?;
    Ok(None)
}

/// `String.valueOf` of a value.
fn java_to_string(value: &Value) -> String {
    match value {
        Value::Int(v) => v.to_string(),
        Value::Long(v) => v.to_string(),
        Value::Float(v) => format_floating(*v),
        Value::Double(v) => format_floating(*v),
        Value::ObjectRef(object) => match object.as_str() {
            Some(value) => value.to_string(),
            None => format!("{}@{:x}", object.class_name().replace('/', "."), identity_hash(object)),
        },
        Value::ArrayRef(array) => format!("{:?}@{:x}", array, Arc::as_ptr(array) as usize),
        Value::Null => "null".to_string(),
    }
}

fn identity_hash(object: &ObjectRef) -> usize {
    Arc::as_ptr(object) as *const u8 as usize
}

/// Formats like `Double.toString`: plain between 10^-3 and 10^7, otherwise
/// computerized scientific notation, always with a fractional digit.
fn format_floating<T>(value: T) -> String
where
    T: Into<f64> + Copy + Display + LowerExp,
{
    let wide: f64 = value.into();
    if wide.is_nan() {
        return "NaN".to_string();
    }
    if wide.is_infinite() {
        return if wide > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if wide == 0.0 {
        return if wide.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }
    let with_fraction = |digits: &str| {
        if digits.contains('.') {
            digits.to_string()
        } else {
            format!("{digits}.0")
        }
    };
    if (1e-3..1e7).contains(&wide.abs()) {
        with_fraction(&value.to_string())
    } else {
        let scientific = format!("{value:e}");
        match scientific.split_once('e') {
            Some((mantissa, exponent)) => format!("{}E{exponent}", with_fraction(mantissa)),
            None => scientific,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::class_model::JvmClass;
    use crate::java_exception::{JavaException, MethodCallError};
    use crate::jvm_values::Value;
    use crate::native_method_area::{format_floating, java_to_string, NativeMethodArea};
    use crate::virtual_machine::VirtualMachine;
    use crate::vm_options::VmOptions;
    use classfile::field_info::FieldAccessFlags;

    #[test]
    fn doubles_print_like_java() {
        assert_eq!("1.0", format_floating(1.0f64));
        assert_eq!("0.5", format_floating(0.5f64));
        assert_eq!("1.0E7", format_floating(1.0e7f64));
        assert_eq!("1.5E-5", format_floating(1.5e-5f64));
        assert_eq!("-0.0", format_floating(-0.0f64));
        assert_eq!("NaN", format_floating(f64::NAN));
        assert_eq!("3.25", format_floating(3.25f32));
        assert_eq!("null", java_to_string(&Value::Null));
    }

    #[test]
    fn builtin_instantiation_rules() {
        let vm = VirtualMachine::new(VmOptions::default());
        let mut env = vm.new_thread();
        let area = NativeMethodArea::new_with_default_native(&VmOptions::default());

        let object = area.get_class("java/lang/Object").unwrap();
        assert_eq!("java/lang/Object", object.new_instance(&mut env).unwrap().class_name());

        let system = area.get_class("java/lang/System").unwrap();
        assert!(matches!(
            system.new_instance(&mut env),
            Err(MethodCallError::ExceptionThrown(JavaException::IllegalAccess(_)))
        ));
        let string = area.get_class("java/lang/String").unwrap();
        assert!(matches!(
            string.new_instance(&mut env),
            Err(MethodCallError::ExceptionThrown(JavaException::Instantiation(_)))
        ));
        assert_eq!("java/lang/Object", string.super_class().unwrap().name());
    }

    #[test]
    fn system_out_is_static_and_final() {
        let vm = VirtualMachine::new(VmOptions::default());
        let mut env = vm.new_thread();
        let area = NativeMethodArea::new_with_default_native(&VmOptions::default());
        let system = area.get_class("java/lang/System").unwrap();
        let out = system
            .get_field("out", "Ljava/io/PrintStream;", FieldAccessFlags::STATIC)
            .unwrap();
        assert!(matches!(out, Value::ObjectRef(_)));
        assert!(matches!(
            system.put_field(&mut env, "out", Value::Null),
            Err(MethodCallError::ExceptionThrown(JavaException::IllegalAccess(_)))
        ));
    }
}
