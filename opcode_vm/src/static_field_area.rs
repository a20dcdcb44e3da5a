use crate::java_exception::{InvokeResult, JavaException};
use crate::jvm_values::Value;
use classfile::field_info::FieldAccessFlags;
use indexmap::IndexMap;
use parking_lot::RwLock;

#[derive(Debug, Clone)]
pub struct StaticField {
    pub descriptor: String,
    pub access_flags: FieldAccessFlags,
    pub value: Value,
}

impl StaticField {
    pub fn new(descriptor: &str, access_flags: FieldAccessFlags, value: Value) -> StaticField {
        StaticField {
            descriptor: descriptor.to_string(),
            access_flags: access_flags | FieldAccessFlags::STATIC,
            value,
        }
    }
}

/// Static field storage of one class.
#[derive(Debug, Default)]
pub struct StaticFieldArea {
    class_name: String,
    fields: RwLock<IndexMap<String, StaticField>>,
}

impl StaticFieldArea {
    pub fn new(class_name: &str) -> StaticFieldArea {
        StaticFieldArea {
            class_name: class_name.to_string(),
            fields: RwLock::new(IndexMap::new()),
        }
    }

    pub fn define(&self, name: &str, field: StaticField) {
        self.fields.write().insert(name.to_string(), field);
    }

    /// `None` when the field is not declared here.
    pub fn get(&self, name: &str, descriptor: &str, flags: FieldAccessFlags) -> Option<InvokeResult<Value>> {
        let fields = self.fields.read();
        let field = fields.get(name).filter(|field| field.descriptor == descriptor)?;
        if !field.access_flags.contains(flags) {
            return Some(Err(JavaException::IllegalAccess(format!(
                "{}.{} has flags {:?}, {:?} required",
                self.class_name, name, field.access_flags, flags
            ))
            .into()));
        }
        Some(Ok(field.value.clone()))
    }

    /// `None` when the field is not declared here. Final fields can only be
    /// written while `allow_final` is set, i.e. during class initialisation.
    pub fn put(&self, name: &str, value: Value, allow_final: bool) -> Option<InvokeResult<()>> {
        let mut fields = self.fields.write();
        let field = fields.get_mut(name)?;
        if field.access_flags.contains(FieldAccessFlags::FINAL) && !allow_final {
            return Some(Err(JavaException::IllegalAccess(format!(
                "final field {}.{} written outside initialisation",
                self.class_name, name
            ))
            .into()));
        }
        if !value.matches_descriptor(&field.descriptor) {
            return Some(Err(JavaException::FieldTypeMismatch {
                class_name: self.class_name.clone(),
                name: name.to_string(),
                descriptor: field.descriptor.clone(),
                actual: value.type_name(),
            }
            .into()));
        }
        field.value = value;
        Some(Ok(()))
    }
}
