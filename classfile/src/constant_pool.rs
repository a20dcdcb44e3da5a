use crate::byte_buffer::ByteBuffer;
use crate::class_file_error::{ClassFileError, Result};
use std::fmt::{Display, Formatter};

pub type ConstantPoolIndex = u16;

/// Constant pool tags
/// https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html#jvms-4.4-140
pub mod tags {
    pub const UTF8: u8 = 1;
    pub const INTEGER: u8 = 3;
    pub const FLOAT: u8 = 4;
    pub const LONG: u8 = 5;
    pub const DOUBLE: u8 = 6;
    pub const CLASS: u8 = 7;
    pub const STRING: u8 = 8;
    pub const FIELD_REF: u8 = 9;
    pub const METHOD_REF: u8 = 10;
    pub const INTERFACE_METHOD_REF: u8 = 11;
    pub const NAME_AND_TYPE: u8 = 12;
    pub const METHOD_HANDLE: u8 = 15;
    pub const METHOD_TYPE: u8 = 16;
    pub const DYNAMIC: u8 = 17;
    pub const INVOKE_DYNAMIC: u8 = 18;
    pub const MODULE: u8 = 19;
    pub const PACKAGE: u8 = 20;
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConstantPoolEntry {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    ClassReference(ConstantPoolIndex),
    StringReference(ConstantPoolIndex),
    FieldReference(ConstantPoolIndex, ConstantPoolIndex),
    MethodReference(ConstantPoolIndex, ConstantPoolIndex),
    InterfaceMethodReference(ConstantPoolIndex, ConstantPoolIndex),
    NameAndTypeDescriptor(ConstantPoolIndex, ConstantPoolIndex),
    MethodHandle(u8, ConstantPoolIndex),
    MethodType(ConstantPoolIndex),
    Dynamic(u16, ConstantPoolIndex),
    InvokeDynamic(u16, ConstantPoolIndex),
    Module(ConstantPoolIndex),
    Package(ConstantPoolIndex),
}

/// ```c
/// cp_info {
///     u1 tag;
///     u1 info[];
/// }
/// ```
impl ConstantPoolEntry {
    pub fn read_from_bytes(buffer: &mut ByteBuffer) -> Result<ConstantPoolEntry> {
        let tag = buffer.read_u8()?;
        match tag {
            tags::UTF8 => {
                let len = buffer.read_u16()?;
                buffer.read_utf8(len as usize).map(ConstantPoolEntry::Utf8)
            }
            tags::INTEGER => buffer.read_i32().map(ConstantPoolEntry::Integer),
            tags::FLOAT => buffer.read_f32().map(ConstantPoolEntry::Float),
            tags::LONG => buffer.read_i64().map(ConstantPoolEntry::Long),
            tags::DOUBLE => buffer.read_f64().map(ConstantPoolEntry::Double),
            tags::CLASS => buffer.read_u16().map(ConstantPoolEntry::ClassReference),
            tags::STRING => buffer.read_u16().map(ConstantPoolEntry::StringReference),
            tags::FIELD_REF => buffer
                .read_2_u16()
                .map(|(class, nat)| ConstantPoolEntry::FieldReference(class, nat)),
            tags::METHOD_REF => buffer
                .read_2_u16()
                .map(|(class, nat)| ConstantPoolEntry::MethodReference(class, nat)),
            tags::INTERFACE_METHOD_REF => buffer
                .read_2_u16()
                .map(|(class, nat)| ConstantPoolEntry::InterfaceMethodReference(class, nat)),
            tags::NAME_AND_TYPE => buffer
                .read_2_u16()
                .map(|(name, desc)| ConstantPoolEntry::NameAndTypeDescriptor(name, desc)),
            tags::METHOD_HANDLE => buffer
                .read_u8_u16()
                .map(|(kind, reference)| ConstantPoolEntry::MethodHandle(kind, reference)),
            tags::METHOD_TYPE => buffer.read_u16().map(ConstantPoolEntry::MethodType),
            tags::DYNAMIC => buffer
                .read_2_u16()
                .map(|(bootstrap, nat)| ConstantPoolEntry::Dynamic(bootstrap, nat)),
            tags::INVOKE_DYNAMIC => buffer
                .read_2_u16()
                .map(|(bootstrap, nat)| ConstantPoolEntry::InvokeDynamic(bootstrap, nat)),
            tags::MODULE => buffer.read_u16().map(ConstantPoolEntry::Module),
            tags::PACKAGE => buffer.read_u16().map(ConstantPoolEntry::Package),
            t => Err(ClassFileError::ConstantPoolTagNotSupport(t)),
        }
    }

    pub fn tag(&self) -> u8 {
        match self {
            ConstantPoolEntry::Utf8(_) => tags::UTF8,
            ConstantPoolEntry::Integer(_) => tags::INTEGER,
            ConstantPoolEntry::Float(_) => tags::FLOAT,
            ConstantPoolEntry::Long(_) => tags::LONG,
            ConstantPoolEntry::Double(_) => tags::DOUBLE,
            ConstantPoolEntry::ClassReference(_) => tags::CLASS,
            ConstantPoolEntry::StringReference(_) => tags::STRING,
            ConstantPoolEntry::FieldReference(..) => tags::FIELD_REF,
            ConstantPoolEntry::MethodReference(..) => tags::METHOD_REF,
            ConstantPoolEntry::InterfaceMethodReference(..) => tags::INTERFACE_METHOD_REF,
            ConstantPoolEntry::NameAndTypeDescriptor(..) => tags::NAME_AND_TYPE,
            ConstantPoolEntry::MethodHandle(..) => tags::METHOD_HANDLE,
            ConstantPoolEntry::MethodType(_) => tags::METHOD_TYPE,
            ConstantPoolEntry::Dynamic(..) => tags::DYNAMIC,
            ConstantPoolEntry::InvokeDynamic(..) => tags::INVOKE_DYNAMIC,
            ConstantPoolEntry::Module(_) => tags::MODULE,
            ConstantPoolEntry::Package(_) => tags::PACKAGE,
        }
    }

    fn is_wide(&self) -> bool {
        matches!(self, ConstantPoolEntry::Long(_) | ConstantPoolEntry::Double(_))
    }
}

// long and double occupy two indices, the second one is unusable
#[derive(Debug, Clone)]
pub enum ConstantPoolPhysicalEntry {
    Entry(ConstantPoolEntry),
    PlaceHolder,
}

/// Constant pool of a class file. Indices are 1-based.
#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    entries: Vec<ConstantPoolPhysicalEntry>,
}

impl ConstantPool {
    pub fn new() -> ConstantPool {
        ConstantPool::default()
    }

    /// Number of physical slots, placeholders included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends an entry and returns its index.
    pub fn add(&mut self, entry: ConstantPoolEntry) -> ConstantPoolIndex {
        let wide = entry.is_wide();
        self.entries.push(ConstantPoolPhysicalEntry::Entry(entry));
        let index = self.entries.len() as ConstantPoolIndex;
        if wide {
            self.entries.push(ConstantPoolPhysicalEntry::PlaceHolder)
        }
        index
    }

    /// Iterates over usable `(index, entry)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (ConstantPoolIndex, &ConstantPoolEntry)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(slot, physical)| match physical {
                ConstantPoolPhysicalEntry::Entry(entry) => {
                    Some(((slot + 1) as ConstantPoolIndex, entry))
                }
                ConstantPoolPhysicalEntry::PlaceHolder => None,
            })
    }

    pub fn get(&self, index: ConstantPoolIndex) -> Result<&ConstantPoolEntry> {
        self.try_get(index)
            .ok_or(ClassFileError::InvalidConstantPoolIndexError(index))
    }

    pub fn try_get(&self, index: ConstantPoolIndex) -> Option<&ConstantPoolEntry> {
        let slot = (index as usize).checked_sub(1)?;
        match self.entries.get(slot)? {
            ConstantPoolPhysicalEntry::Entry(entry) => Some(entry),
            ConstantPoolPhysicalEntry::PlaceHolder => None,
        }
    }

    pub fn get_string(&self, index: ConstantPoolIndex) -> Result<String> {
        match self.get(index)? {
            ConstantPoolEntry::Utf8(value) => Ok(value.clone()),
            _ => Err(ClassFileError::InvalidClassData(format!(
                "should be utf8 string at {index}"
            ))),
        }
    }

    pub fn get_class_name(&self, index: ConstantPoolIndex) -> Result<String> {
        match self.get(index)? {
            ConstantPoolEntry::ClassReference(name) => self.get_string(*name),
            _ => Err(ClassFileError::InvalidClassData(format!(
                "should be class reference at {index}"
            ))),
        }
    }

    /// Resolves a class reference, treating index 0 as absent.
    pub fn try_get_class_name(&self, index: ConstantPoolIndex) -> Result<Option<String>> {
        if index == 0 {
            Ok(None)
        } else {
            self.get_class_name(index).map(Some)
        }
    }

    pub fn get_name_and_type(&self, index: ConstantPoolIndex) -> Result<(String, String)> {
        match self.get(index)? {
            ConstantPoolEntry::NameAndTypeDescriptor(name, descriptor) => {
                Ok((self.get_string(*name)?, self.get_string(*descriptor)?))
            }
            _ => Err(ClassFileError::InvalidClassData(format!(
                "should be name and type at {index}"
            ))),
        }
    }

    /// Resolves a Fieldref, Methodref or InterfaceMethodref into
    /// `(class name, member name, descriptor)`.
    pub fn get_member_ref(&self, index: ConstantPoolIndex) -> Result<(String, String, String)> {
        match self.get(index)? {
            ConstantPoolEntry::FieldReference(class, nat)
            | ConstantPoolEntry::MethodReference(class, nat)
            | ConstantPoolEntry::InterfaceMethodReference(class, nat) => {
                let class_name = self.get_class_name(*class)?;
                let (name, descriptor) = self.get_name_and_type(*nat)?;
                Ok((class_name, name, descriptor))
            }
            _ => Err(ClassFileError::InvalidClassData(format!(
                "should be member reference at {index}"
            ))),
        }
    }

    pub fn fmt_entry(&self, index: ConstantPoolIndex) -> Result<String> {
        let text = match self.get(index)? {
            ConstantPoolEntry::Utf8(s) => format!("Utf8: \"{s}\""),
            ConstantPoolEntry::Integer(n) => format!("Integer: {n}"),
            ConstantPoolEntry::Float(n) => format!("Float: {n}"),
            ConstantPoolEntry::Long(n) => format!("Long: {n}"),
            ConstantPoolEntry::Double(n) => format!("Double: {n}"),
            ConstantPoolEntry::ClassReference(n) => {
                format!("Class: {} => ({})", n, self.fmt_entry(*n)?)
            }
            ConstantPoolEntry::StringReference(n) => {
                format!("String: {} => ({})", n, self.fmt_entry(*n)?)
            }
            ConstantPoolEntry::FieldReference(i, j) => self.fmt_pair("Fieldref", *i, *j)?,
            ConstantPoolEntry::MethodReference(i, j) => self.fmt_pair("Methodref", *i, *j)?,
            ConstantPoolEntry::InterfaceMethodReference(i, j) => {
                self.fmt_pair("InterfaceMethodref", *i, *j)?
            }
            ConstantPoolEntry::NameAndTypeDescriptor(i, j) => {
                self.fmt_pair("NameAndType", *i, *j)?
            }
            ConstantPoolEntry::MethodHandle(kind, j) => {
                format!("MethodHandle: kind {} => ({})", kind, self.fmt_entry(*j)?)
            }
            ConstantPoolEntry::MethodType(n) => {
                format!("MethodType: {} => ({})", n, self.fmt_entry(*n)?)
            }
            ConstantPoolEntry::Dynamic(bootstrap, nat) => {
                format!("Dynamic: #{} => ({})", bootstrap, self.fmt_entry(*nat)?)
            }
            ConstantPoolEntry::InvokeDynamic(bootstrap, nat) => {
                format!("InvokeDynamic: #{} => ({})", bootstrap, self.fmt_entry(*nat)?)
            }
            ConstantPoolEntry::Module(n) => format!("Module: {} => ({})", n, self.fmt_entry(*n)?),
            ConstantPoolEntry::Package(n) => {
                format!("Package: {} => ({})", n, self.fmt_entry(*n)?)
            }
        };
        Ok(text)
    }

    fn fmt_pair(&self, kind: &str, i: ConstantPoolIndex, j: ConstantPoolIndex) -> Result<String> {
        Ok(format!(
            "{kind}: {i}, {j} => ({}), ({})",
            self.fmt_entry(i)?,
            self.fmt_entry(j)?
        ))
    }
}

impl Display for ConstantPool {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Constant pool: (size: {})", self.entries.len())?;
        for (index, _) in self.iter() {
            let text = self.fmt_entry(index).map_err(|_| std::fmt::Error)?;
            writeln!(f, "    #{index} = {text}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::class_file_error::ClassFileError;
    use crate::constant_pool::{tags, ConstantPool, ConstantPoolEntry};

    #[test]
    fn wide_entries_take_two_indices() {
        let mut cp = ConstantPool::new();
        assert_eq!(1, cp.add(ConstantPoolEntry::Utf8("hey".to_string())));
        assert_eq!(2, cp.add(ConstantPoolEntry::Long(123)));
        assert_eq!(4, cp.add(ConstantPoolEntry::Double(3.56)));
        assert_eq!(6, cp.add(ConstantPoolEntry::ClassReference(1)));

        assert_eq!(ConstantPoolEntry::Long(123), *cp.get(2).unwrap());
        assert_eq!(
            Err(ClassFileError::InvalidConstantPoolIndexError(3)),
            cp.get(3)
        );
        assert_eq!(
            Err(ClassFileError::InvalidConstantPoolIndexError(5)),
            cp.get(5)
        );
        assert_eq!(
            Err(ClassFileError::InvalidConstantPoolIndexError(0)),
            cp.get(0)
        );
        assert_eq!(7, cp.len());
        assert_eq!(4, cp.iter().count());
    }

    #[test]
    fn resolves_names() {
        let mut cp = ConstantPool::new();
        let name = cp.add(ConstantPoolEntry::Utf8("java/lang/Object".to_string()));
        let class = cp.add(ConstantPoolEntry::ClassReference(name));
        let number = cp.add(ConstantPoolEntry::Integer(7));

        assert_eq!("java/lang/Object", cp.get_class_name(class).unwrap());
        assert_eq!(Ok(None), cp.try_get_class_name(0));
        assert!(cp.get_class_name(number).is_err());
        assert!(cp.get_string(class).is_err());
        assert_eq!(tags::INTEGER, cp.get(number).unwrap().tag());
    }

    #[test]
    fn resolves_member_references() {
        let mut cp = ConstantPool::new();
        let class_name = cp.add(ConstantPoolEntry::Utf8("java/lang/System".to_string()));
        let class = cp.add(ConstantPoolEntry::ClassReference(class_name));
        let name = cp.add(ConstantPoolEntry::Utf8("out".to_string()));
        let descriptor = cp.add(ConstantPoolEntry::Utf8("Ljava/io/PrintStream;".to_string()));
        let nat = cp.add(ConstantPoolEntry::NameAndTypeDescriptor(name, descriptor));
        let field = cp.add(ConstantPoolEntry::FieldReference(class, nat));

        assert_eq!(
            (
                "java/lang/System".to_string(),
                "out".to_string(),
                "Ljava/io/PrintStream;".to_string()
            ),
            cp.get_member_ref(field).unwrap()
        );
        assert!(cp.get_member_ref(nat).is_err());
    }

    #[test]
    fn display_lists_every_usable_entry() {
        let mut cp = ConstantPool::new();
        let name = cp.add(ConstantPoolEntry::Utf8("Foo".to_string()));
        cp.add(ConstantPoolEntry::Long(1));
        cp.add(ConstantPoolEntry::ClassReference(name));
        let text = cp.to_string();
        assert!(text.contains("#1 = Utf8: \"Foo\""));
        assert!(text.contains("#4 = Class: 1 => (Utf8: \"Foo\")"));
        assert!(!text.contains("#3"));
    }
}
