use crate::jvm_error::VmExecResult;
use crate::runtime_attribute_info::{get_attr_as_constant_value, ConstantValueAttribute};
use crate::runtime_constant_pool::RuntimeConstantPool;
use classfile::field_info::{FieldAccessFlags, FieldInfo};

#[derive(Debug, Clone)]
pub struct RuntimeFieldInfo {
    pub access_flags: FieldAccessFlags,
    pub name: String,
    pub descriptor: String,
    pub constant_value: Option<ConstantValueAttribute>,
}

impl RuntimeFieldInfo {
    pub fn from(field_info: &FieldInfo, cp: &RuntimeConstantPool) -> VmExecResult<RuntimeFieldInfo> {
        let constant_value = match field_info.constant_value() {
            Some(attribute) => Some(get_attr_as_constant_value(attribute, cp)?),
            None => None,
        };
        Ok(RuntimeFieldInfo {
            access_flags: field_info.access_flags,
            name: field_info.name.clone(),
            descriptor: field_info.descriptor.clone(),
            constant_value,
        })
    }

    pub fn is_static(&self) -> bool {
        self.access_flags.contains(FieldAccessFlags::STATIC)
    }
}
