use crate::env::Env;
use crate::java_exception::{InvokeMethodResult, InvokeResult};
use crate::jvm_values::{ObjectRef, Value};
use classfile::class_file::ClassAccessFlags;
use classfile::field_info::FieldAccessFlags;
use classfile::method_info::MethodAccessFlags;
use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

pub type ClassRef = Arc<dyn JvmClass>;
pub type MethodRef = Arc<dyn JvmMethod>;

/// https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-5.html#jvms-5.5
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassStatus {
    Loaded,
    Linked,
    Initializing,
    Initialized,
}

/// A class as seen by opcode routines.
pub trait JvmClass: Send + Sync {
    fn name(&self) -> &str;

    fn super_class(&self) -> Option<ClassRef>;

    fn access_flags(&self) -> ClassAccessFlags;

    fn status(&self) -> ClassStatus {
        ClassStatus::Initialized
    }

    /// Runs static initialisation once. Re-entrant for the initialising thread.
    fn initialize(&self, _env: &mut Env) -> InvokeResult<()> {
        Ok(())
    }

    /// Allocates an instance with zeroed fields. Constructors are not run.
    fn new_instance(&self, env: &mut Env) -> InvokeResult<ObjectRef>;

    /// Looks the method up on this class, then the super class chain.
    /// `flags` lists the access bits the method must carry.
    fn get_method(&self, name: &str, descriptor: &str, flags: MethodAccessFlags) -> InvokeResult<MethodRef>;

    /// Reads a static field.
    fn get_field(&self, name: &str, descriptor: &str, flags: FieldAccessFlags) -> InvokeResult<Value>;

    /// Writes a static field.
    fn put_field(&self, env: &mut Env, name: &str, value: Value) -> InvokeResult<()>;

    /// `(declaring class, name, descriptor)` of every instance field, super
    /// classes first. A hidden super class field keeps its own entry.
    fn instance_fields(&self) -> Vec<(String, String, String)> {
        let mut fields = self
            .super_class()
            .map(|super_class| super_class.instance_fields())
            .unwrap_or_default();
        fields.extend(
            self.declared_instance_fields()
                .into_iter()
                .map(|(name, descriptor)| (self.name().to_string(), name, descriptor)),
        );
        fields
    }

    fn declared_instance_fields(&self) -> Vec<(String, String)> {
        Vec::new()
    }
}

/// A heap object.
pub trait JvmObject: Debug + Send + Sync {
    fn class_name(&self) -> &str;

    fn get_class(&self) -> InvokeResult<ClassRef>;

    /// Reads the field `name` as seen from `class_name`: the nearest
    /// declaration at or above that class wins.
    fn get_field(&self, class_name: &str, name: &str) -> InvokeResult<Value>;

    fn put_field(&self, class_name: &str, name: &str, value: Value) -> InvokeResult<()>;

    /// Contents of a `java/lang/String`.
    fn as_str(&self) -> Option<&str> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

/// An invocable method.
pub trait JvmMethod: Send + Sync {
    fn class_name(&self) -> &str;

    fn name(&self) -> &str;

    fn descriptor(&self) -> &str;

    fn access_flags(&self) -> MethodAccessFlags;

    fn is_static(&self) -> bool {
        self.access_flags().contains(MethodAccessFlags::STATIC)
    }

    /// Runs the method. `receiver` is `None` for static methods.
    fn call(&self, env: &mut Env, receiver: Option<Value>, args: Vec<Value>) -> InvokeMethodResult;
}
