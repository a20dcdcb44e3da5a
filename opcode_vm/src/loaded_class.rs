use crate::class_model::{ClassRef, ClassStatus, JvmClass, JvmMethod, MethodRef};
use crate::env::Env;
use crate::java_exception::{InvokeResult, JavaException, MethodCallError};
use crate::jvm_error::{VmError, VmExecResult};
use crate::jvm_values::{ObjectRef, Value};
use crate::object::BytecodeObject;
use crate::runtime_attribute_info::ConstantValueAttribute;
use crate::runtime_constant_pool::RuntimeConstantPool;
use crate::runtime_field_info::RuntimeFieldInfo;
use crate::runtime_method_info::BytecodeMethod;
use crate::static_field_area::{StaticField, StaticFieldArea};
use classfile::attribute_info::AttributeType;
use classfile::class_file::{ClassAccessFlags, ClassFile};
use classfile::field_info::FieldAccessFlags;
use classfile::method_info::MethodAccessFlags;
use indexmap::IndexMap;
use log::debug;
use parking_lot::ReentrantMutex;
use std::cell::Cell;
use std::sync::{Arc, Weak};

/// A class loaded from a class file. It is linked and initialised on first
/// use and then goes through Loaded -> Linked -> Initializing -> Initialized.
pub struct BytecodeClass {
    name: String,
    access_flags: ClassAccessFlags,
    super_class: Option<ClassRef>,
    source_file: Option<String>,
    constant_pool: Arc<RuntimeConstantPool>,
    fields: Vec<RuntimeFieldInfo>,
    // keyed by name + descriptor
    methods: IndexMap<String, Arc<BytecodeMethod>>,
    statics: StaticFieldArea,
    // initialisation barrier, re-entrant for the initialising thread
    status: ReentrantMutex<Cell<ClassStatus>>,
    self_ref: Weak<BytecodeClass>,
}

fn method_key(name: &str, descriptor: &str) -> String {
    format!("{name}{descriptor}")
}

impl BytecodeClass {
    /// `super_class` must already be loaded.
    pub fn load(class_file: &ClassFile, super_class: Option<ClassRef>) -> VmExecResult<Arc<BytecodeClass>> {
        let name = class_file.this_class_name.clone();
        let constant_pool = Arc::new(RuntimeConstantPool::new(&class_file.constant_pool)?);
        let source_file = match class_file
            .attribute_info
            .iter()
            .find(|attribute| attribute.kind() == AttributeType::SourceFile)
        {
            Some(attribute) => match attribute.info[..] {
                [hi, lo] => Some(constant_pool.get_utf8(u16::from_be_bytes([hi, lo]))?.to_string()),
                _ => return Err(VmError::InvalidAttribute(format!("SourceFile of {name}"))),
            },
            None => None,
        };
        let fields = class_file
            .field_info
            .iter()
            .map(|field| RuntimeFieldInfo::from(field, &constant_pool))
            .collect::<VmExecResult<Vec<_>>>()?;
        let mut methods = IndexMap::new();
        for method_info in &class_file.method_info {
            let method = BytecodeMethod::from(&name, source_file.as_deref(), method_info, &constant_pool)?;
            methods.insert(
                method_key(&method_info.name, &method_info.descriptor),
                Arc::new(method),
            );
        }
        let statics = StaticFieldArea::new(&name);
        Ok(Arc::new_cyclic(|self_ref| BytecodeClass {
            name,
            access_flags: class_file.access_flags,
            super_class,
            source_file,
            constant_pool,
            fields,
            methods,
            statics,
            status: ReentrantMutex::new(Cell::new(ClassStatus::Loaded)),
            self_ref: self_ref.clone(),
        }))
    }

    pub fn source_file(&self) -> Option<&str> {
        self.source_file.as_deref()
    }

    pub fn constant_pool(&self) -> &RuntimeConstantPool {
        &self.constant_pool
    }

    /// Creates the static fields with their `ConstantValue` or zero value.
    fn link(&self, env: &mut Env) -> InvokeResult<()> {
        for field in self.fields.iter().filter(|field| field.is_static()) {
            let value = match &field.constant_value {
                Some(ConstantValueAttribute::Int(v)) => Value::Int(*v),
                Some(ConstantValueAttribute::Float(v)) => Value::Float(*v),
                Some(ConstantValueAttribute::Long(v)) => Value::Long(*v),
                Some(ConstantValueAttribute::Double(v)) => Value::Double(*v),
                Some(ConstantValueAttribute::String(v)) => Value::ObjectRef(env.intern_string(v)?),
                None => Value::default_for_descriptor(&field.descriptor),
            };
            self.statics.define(
                &field.name,
                StaticField::new(&field.descriptor, field.access_flags, value),
            );
        }
        Ok(())
    }

    fn run_class_initializer(&self, env: &mut Env) -> InvokeResult<()> {
        if let Some(clinit) = self.methods.get(&method_key("<clinit>", "()V")) {
            let clinit: MethodRef = clinit.clone();
            env.invoke(&clinit, None, Vec::new())?;
        }
        Ok(())
    }

    fn no_such_method(&self, name: &str, descriptor: &str) -> MethodCallError {
        JavaException::NoSuchMethod {
            class_name: self.name.clone(),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        }
        .into()
    }

    fn no_such_field(&self, name: &str) -> MethodCallError {
        JavaException::NoSuchField {
            class_name: self.name.clone(),
            name: name.to_string(),
        }
        .into()
    }
}

impl JvmClass for BytecodeClass {
    fn name(&self) -> &str {
        &self.name
    }

    fn super_class(&self) -> Option<ClassRef> {
        self.super_class.clone()
    }

    fn access_flags(&self) -> ClassAccessFlags {
        self.access_flags
    }

    fn status(&self) -> ClassStatus {
        self.status.lock().get()
    }

    fn initialize(&self, env: &mut Env) -> InvokeResult<()> {
        if let Some(super_class) = &self.super_class {
            super_class.initialize(env)?;
        }
        let status = self.status.lock();
        match status.get() {
            ClassStatus::Initialized | ClassStatus::Initializing => return Ok(()),
            ClassStatus::Loaded => {
                self.link(env)?;
                status.set(ClassStatus::Linked);
            }
            ClassStatus::Linked => {}
        }
        debug!("initialize {}", self.name);
        status.set(ClassStatus::Initializing);
        match self.run_class_initializer(env) {
            Ok(()) => {
                status.set(ClassStatus::Initialized);
                Ok(())
            }
            Err(e) => {
                status.set(ClassStatus::Linked);
                Err(e)
            }
        }
    }

    fn new_instance(&self, _env: &mut Env) -> InvokeResult<ObjectRef> {
        if self
            .access_flags
            .intersects(ClassAccessFlags::ABSTRACT | ClassAccessFlags::INTERFACE)
        {
            return Err(JavaException::Instantiation(self.name.clone()).into());
        }
        let class: ClassRef = self
            .self_ref
            .upgrade()
            .ok_or_else(|| VmError::ClassUnloaded(self.name.clone()))?;
        Ok(Arc::new(BytecodeObject::new(&class)))
    }

    fn get_method(&self, name: &str, descriptor: &str, flags: MethodAccessFlags) -> InvokeResult<MethodRef> {
        if let Some(method) = self.methods.get(&method_key(name, descriptor)) {
            let method_flags = method.access_flags();
            if !method_flags.contains(flags) {
                return Err(JavaException::IllegalAccess(format!(
                    "{}.{}{} has flags {:?}, {:?} required",
                    self.name, name, descriptor, method_flags, flags
                ))
                .into());
            }
            return Ok(method.clone());
        }
        match &self.super_class {
            Some(super_class) => super_class
                .get_method(name, descriptor, flags)
                .map_err(|e| match e {
                    MethodCallError::ExceptionThrown(JavaException::NoSuchMethod { .. }) => {
                        self.no_such_method(name, descriptor)
                    }
                    other => other,
                }),
            None => Err(self.no_such_method(name, descriptor)),
        }
    }

    fn get_field(&self, name: &str, descriptor: &str, flags: FieldAccessFlags) -> InvokeResult<Value> {
        if let Some(result) = self.statics.get(name, descriptor, flags) {
            return result;
        }
        match &self.super_class {
            Some(super_class) => super_class
                .get_field(name, descriptor, flags)
                .map_err(|e| match e {
                    MethodCallError::ExceptionThrown(JavaException::NoSuchField { .. }) => {
                        self.no_such_field(name)
                    }
                    other => other,
                }),
            None => Err(self.no_such_field(name)),
        }
    }

    fn put_field(&self, env: &mut Env, name: &str, value: Value) -> InvokeResult<()> {
        let allow_final = self.status() == ClassStatus::Initializing;
        if let Some(result) = self.statics.put(name, value.clone(), allow_final) {
            return result;
        }
        match &self.super_class {
            Some(super_class) => super_class.put_field(env, name, value),
            None => Err(self.no_such_field(name)),
        }
    }

    fn declared_instance_fields(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .filter(|field| !field.is_static())
            .map(|field| (field.name.clone(), field.descriptor.clone()))
            .collect()
    }
}
