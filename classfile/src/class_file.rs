use crate::attribute_info::AttributeInfo;
use crate::class_file_version::ClassFileVersion;
use crate::constant_pool::ConstantPool;
use crate::field_info::FieldInfo;
use crate::method_info::MethodInfo;
use bitflags::bitflags;
use std::fmt::{Display, Formatter};

bitflags! {
    /// [jvms-4.1](https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html#jvms-4.1-200-E.1)
    ///
    /// | Flag Name      | Value  | Interpretation |
    /// | -----          | -----  | -------------- |
    /// | ACC_PUBLIC     | 0x0001 | Declared public |
    /// | ACC_FINAL      | 0x0010 | No subclasses allowed |
    /// | ACC_SUPER      | 0x0020 | Treat superclass methods specially in invokespecial |
    /// | ACC_INTERFACE  | 0x0200 | Is an interface |
    /// | ACC_ABSTRACT   | 0x0400 | Must not be instantiated |
    /// | ACC_SYNTHETIC  | 0x1000 | Not present in the source code |
    /// | ACC_ANNOTATION | 0x2000 | Annotation interface |
    /// | ACC_ENUM       | 0x4000 | Enum class |
    /// | ACC_MODULE     | 0x8000 | Module, not a class |
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ClassAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const FINAL = 0x0010;
        const SUPER = 0x0020;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
        const MODULE = 0x8000;
    }
}

#[derive(Debug, Clone)]
pub struct ClassFile {
    pub version: ClassFileVersion,
    pub constant_pool: ConstantPool,
    pub access_flags: ClassAccessFlags,
    // class references are resolved to their names while reading
    pub this_class_name: String,
    pub super_class_name: Option<String>,
    pub interface_names: Vec<String>,

    pub field_info: Vec<FieldInfo>,
    pub method_info: Vec<MethodInfo>,
    pub attribute_info: Vec<AttributeInfo>,
}

impl ClassFile {
    pub fn find_method(&self, name: &str, descriptor: &str) -> Option<&MethodInfo> {
        self.method_info
            .iter()
            .find(|method| method.name == name && method.descriptor == descriptor)
    }
}

impl Display for ClassFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "class {}", self.this_class_name)?;
        if let Some(super_class) = &self.super_class_name {
            write!(f, " extends {}", super_class)?;
        }
        writeln!(f)?;
        writeln!(f, "  flags: {:?}", self.access_flags)?;
        writeln!(f, "  version: {}", self.version)?;
        write!(f, "{}", self.constant_pool)?;
        for method in &self.method_info {
            writeln!(f, "  method {}{}", method.name, method.descriptor)?;
        }
        Ok(())
    }
}
