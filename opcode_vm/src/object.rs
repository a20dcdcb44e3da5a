use crate::class_model::{ClassRef, JvmClass, JvmObject};
use crate::java_exception::{InvokeResult, JavaException};
use crate::jvm_error::VmError;
use crate::jvm_values::Value;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::any::Any;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Weak};

#[derive(Debug, Clone)]
struct InstanceField {
    descriptor: String,
    value: Value,
}

/// `(declaring class, field name)`
type FieldKey = (String, String);

/// Instance of a bytecode class. Field storage is owned by the object; the
/// class is only referenced.
pub struct BytecodeObject {
    class: Weak<dyn JvmClass>,
    class_name: String,
    /// Runtime class first, then its super classes.
    hierarchy: Vec<String>,
    fields: RwLock<IndexMap<FieldKey, InstanceField>>,
}

impl BytecodeObject {
    /// Zero-initialises every instance field of `class`, super classes first.
    pub fn new(class: &ClassRef) -> BytecodeObject {
        let fields = class
            .instance_fields()
            .into_iter()
            .map(|(owner, name, descriptor)| {
                let value = Value::default_for_descriptor(&descriptor);
                ((owner, name), InstanceField { descriptor, value })
            })
            .collect();
        let mut hierarchy = vec![class.name().to_string()];
        let mut super_class = class.super_class();
        while let Some(current) = super_class {
            hierarchy.push(current.name().to_string());
            super_class = current.super_class();
        }
        BytecodeObject {
            class: Arc::downgrade(class),
            class_name: class.name().to_string(),
            hierarchy,
            fields: RwLock::new(fields),
        }
    }

    /// Position of the field `name` resolved from `class_name` upwards.
    fn resolve(&self, fields: &IndexMap<FieldKey, InstanceField>, class_name: &str, name: &str) -> Option<usize> {
        let start = self
            .hierarchy
            .iter()
            .position(|owner| owner == class_name)
            .unwrap_or(0);
        self.hierarchy[start..]
            .iter()
            .find_map(|owner| fields.get_index_of(&(owner.clone(), name.to_string())))
    }

    fn no_such_field(&self, name: &str) -> JavaException {
        JavaException::NoSuchField {
            class_name: self.class_name.clone(),
            name: name.to_string(),
        }
    }
}

impl JvmObject for BytecodeObject {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn get_class(&self) -> InvokeResult<ClassRef> {
        self.class
            .upgrade()
            .ok_or_else(|| VmError::ClassUnloaded(self.class_name.clone()).into())
    }

    fn get_field(&self, class_name: &str, name: &str) -> InvokeResult<Value> {
        let fields = self.fields.read();
        self.resolve(&fields, class_name, name)
            .and_then(|index| fields.get_index(index))
            .map(|(_, field)| field.value.clone())
            .ok_or_else(|| self.no_such_field(name).into())
    }

    fn put_field(&self, class_name: &str, name: &str, value: Value) -> InvokeResult<()> {
        let mut fields = self.fields.write();
        let index = self
            .resolve(&fields, class_name, name)
            .ok_or_else(|| self.no_such_field(name))?;
        let Some((_, field)) = fields.get_index_mut(index) else {
            return Err(self.no_such_field(name).into());
        };
        if !value.matches_descriptor(&field.descriptor) {
            return Err(JavaException::FieldTypeMismatch {
                class_name: self.class_name.clone(),
                name: name.to_string(),
                descriptor: field.descriptor.clone(),
                actual: value.type_name(),
            }
            .into());
        }
        field.value = value;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Debug for BytecodeObject {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // fields may point back at this object
        write!(f, "{}@{:p}", self.class_name, self)
    }
}
