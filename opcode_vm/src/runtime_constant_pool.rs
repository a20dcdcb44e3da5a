use crate::jvm_error::{VmError, VmExecResult};
use classfile::constant_pool::{tags, ConstantPool, ConstantPoolEntry, ConstantPoolIndex};

/// Symbolic member reference with its names already read out of the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRef {
    pub class_name: String,
    pub name: String,
    pub descriptor: String,
}

impl MemberRef {
    fn new((class_name, name, descriptor): (String, String, String)) -> MemberRef {
        MemberRef {
            class_name,
            name,
            descriptor,
        }
    }
}

/// Constant pool entry with index chains replaced by names. Resolution to live
/// classes, fields and methods happens in the routine that uses the entry.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeConstantPoolEntry {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    ClassReference(String),
    StringReference(String),
    FieldReference(MemberRef),
    MethodReference(MemberRef),
    InterfaceMethodReference(MemberRef),
    NameAndTypeDescriptor(String, String),
    // method handles, dynamic constants, modules and packages
    Other(u8),
}

impl RuntimeConstantPoolEntry {
    fn from(cp: &ConstantPool, index: ConstantPoolIndex, entry: &ConstantPoolEntry) -> VmExecResult<Self> {
        let value = match entry {
            ConstantPoolEntry::Utf8(v) => RuntimeConstantPoolEntry::Utf8(v.clone()),
            ConstantPoolEntry::Integer(v) => RuntimeConstantPoolEntry::Integer(*v),
            ConstantPoolEntry::Float(v) => RuntimeConstantPoolEntry::Float(*v),
            ConstantPoolEntry::Long(v) => RuntimeConstantPoolEntry::Long(*v),
            ConstantPoolEntry::Double(v) => RuntimeConstantPoolEntry::Double(*v),
            ConstantPoolEntry::ClassReference(_) => {
                RuntimeConstantPoolEntry::ClassReference(cp.get_class_name(index)?)
            }
            ConstantPoolEntry::StringReference(utf8) => {
                RuntimeConstantPoolEntry::StringReference(cp.get_string(*utf8)?)
            }
            ConstantPoolEntry::FieldReference(..) => {
                RuntimeConstantPoolEntry::FieldReference(MemberRef::new(cp.get_member_ref(index)?))
            }
            ConstantPoolEntry::MethodReference(..) => {
                RuntimeConstantPoolEntry::MethodReference(MemberRef::new(cp.get_member_ref(index)?))
            }
            ConstantPoolEntry::InterfaceMethodReference(..) => {
                RuntimeConstantPoolEntry::InterfaceMethodReference(MemberRef::new(
                    cp.get_member_ref(index)?,
                ))
            }
            ConstantPoolEntry::NameAndTypeDescriptor(..) => {
                let (name, descriptor) = cp.get_name_and_type(index)?;
                RuntimeConstantPoolEntry::NameAndTypeDescriptor(name, descriptor)
            }
            other => RuntimeConstantPoolEntry::Other(other.tag()),
        };
        Ok(value)
    }

    /// Class-file tag of the entry.
    pub fn tag(&self) -> u8 {
        match self {
            RuntimeConstantPoolEntry::Utf8(_) => tags::UTF8,
            RuntimeConstantPoolEntry::Integer(_) => tags::INTEGER,
            RuntimeConstantPoolEntry::Float(_) => tags::FLOAT,
            RuntimeConstantPoolEntry::Long(_) => tags::LONG,
            RuntimeConstantPoolEntry::Double(_) => tags::DOUBLE,
            RuntimeConstantPoolEntry::ClassReference(_) => tags::CLASS,
            RuntimeConstantPoolEntry::StringReference(_) => tags::STRING,
            RuntimeConstantPoolEntry::FieldReference(_) => tags::FIELD_REF,
            RuntimeConstantPoolEntry::MethodReference(_) => tags::METHOD_REF,
            RuntimeConstantPoolEntry::InterfaceMethodReference(_) => tags::INTERFACE_METHOD_REF,
            RuntimeConstantPoolEntry::NameAndTypeDescriptor(..) => tags::NAME_AND_TYPE,
            RuntimeConstantPoolEntry::Other(tag) => *tag,
        }
    }
}

/// Runtime constant pool of a loaded class, shared by every frame of its methods.
/// https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-5.html#jvms-5.1
#[derive(Debug, Default)]
pub struct RuntimeConstantPool {
    // slot 0 is index 1; `None` marks the unusable half of a long or double
    entries: Vec<Option<RuntimeConstantPoolEntry>>,
}

impl RuntimeConstantPool {
    pub fn new(cp: &ConstantPool) -> VmExecResult<RuntimeConstantPool> {
        let mut entries = vec![None; cp.len()];
        for (index, entry) in cp.iter() {
            entries[index as usize - 1] = Some(RuntimeConstantPoolEntry::from(cp, index, entry)?);
        }
        Ok(RuntimeConstantPool { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: u16) -> VmExecResult<&RuntimeConstantPoolEntry> {
        (index as usize)
            .checked_sub(1)
            .and_then(|slot| self.entries.get(slot))
            .and_then(Option::as_ref)
            .ok_or(VmError::InvalidConstantPoolIndex(index))
    }

    pub fn get_utf8(&self, index: u16) -> VmExecResult<&str> {
        match self.get(index)? {
            RuntimeConstantPoolEntry::Utf8(value) => Ok(value),
            _ => Err(VmError::UnexpectedConstant {
                index,
                expected: "Utf8",
            }),
        }
    }

    pub fn get_class_name(&self, index: u16) -> VmExecResult<&str> {
        match self.get(index)? {
            RuntimeConstantPoolEntry::ClassReference(name) => Ok(name),
            _ => Err(VmError::UnexpectedConstant {
                index,
                expected: "Class",
            }),
        }
    }

    pub fn get_field_ref(&self, index: u16) -> VmExecResult<&MemberRef> {
        match self.get(index)? {
            RuntimeConstantPoolEntry::FieldReference(member) => Ok(member),
            _ => Err(VmError::UnexpectedConstant {
                index,
                expected: "Fieldref",
            }),
        }
    }

    /// Accepts both Methodref and InterfaceMethodref entries.
    pub fn get_method_ref(&self, index: u16) -> VmExecResult<&MemberRef> {
        match self.get(index)? {
            RuntimeConstantPoolEntry::MethodReference(member)
            | RuntimeConstantPoolEntry::InterfaceMethodReference(member) => Ok(member),
            _ => Err(VmError::UnexpectedConstant {
                index,
                expected: "Methodref",
            }),
        }
    }
}
