use crate::jvm_error::{VmError, VmExecResult};
use crate::runtime_constant_pool::{RuntimeConstantPool, RuntimeConstantPoolEntry};
use classfile::attribute_info::{AttributeInfo, AttributeType};
use classfile::byte_buffer::ByteBuffer;
use indexmap::IndexMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html#jvms-4.7.2
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValueAttribute {
    Int(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    String(String),
}

pub(crate) fn get_attr_as_constant_value(
    attribute: &AttributeInfo,
    cp: &RuntimeConstantPool,
) -> VmExecResult<ConstantValueAttribute> {
    let index = match attribute.info[..] {
        [hi, lo] => u16::from_be_bytes([hi, lo]),
        _ => {
            return Err(VmError::InvalidAttribute(format!(
                "ConstantValue of length {}",
                attribute.info.len()
            )))
        }
    };
    match cp.get(index)? {
        RuntimeConstantPoolEntry::Integer(v) => Ok(ConstantValueAttribute::Int(*v)),
        RuntimeConstantPoolEntry::Float(v) => Ok(ConstantValueAttribute::Float(*v)),
        RuntimeConstantPoolEntry::Long(v) => Ok(ConstantValueAttribute::Long(*v)),
        RuntimeConstantPoolEntry::Double(v) => Ok(ConstantValueAttribute::Double(*v)),
        RuntimeConstantPoolEntry::StringReference(v) => Ok(ConstantValueAttribute::String(v.clone())),
        other => Err(VmError::UnresolvedConstantTag(other.tag())),
    }
}

impl Display for ConstantValueAttribute {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstantValueAttribute::Int(v) => write!(f, "ConstantValue=>Int:{v}"),
            ConstantValueAttribute::Float(v) => write!(f, "ConstantValue=>Float:{v}"),
            ConstantValueAttribute::Long(v) => write!(f, "ConstantValue=>Long:{v}"),
            ConstantValueAttribute::Double(v) => write!(f, "ConstantValue=>Double:{v}"),
            ConstantValueAttribute::String(v) => write!(f, "ConstantValue=>String:{v}"),
        }
    }
}

/// ```c
/// Code_attribute {
///     u2 attribute_name_index;
///     u4 attribute_length;
///     u2 max_stack;
///     u2 max_locals;
///     u4 code_length;
///     u1 code[code_length];
///     u2 exception_table_length;
///     {   u2 start_pc;
///         u2 end_pc;
///         u2 handler_pc;
///         u2 catch_type;
///     } exception_table[exception_table_length];
///     u2 attributes_count;
///     attribute_info attributes[attributes_count];
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Arc<[u8]>,
    // start_pc -> line number
    pub line_number_table: IndexMap<u16, u16>,
}

impl CodeAttribute {
    pub fn new(max_stack: u16, max_locals: u16, code: Vec<u8>) -> CodeAttribute {
        CodeAttribute {
            max_stack,
            max_locals,
            code: code.into(),
            line_number_table: IndexMap::new(),
        }
    }

    /// Source line covering `pc`, if the method carries a line number table.
    pub fn line_number(&self, pc: usize) -> Option<u16> {
        self.line_number_table
            .iter()
            .filter(|(start_pc, _)| **start_pc as usize <= pc)
            .max_by_key(|(start_pc, _)| **start_pc)
            .map(|(_, line)| *line)
    }
}

pub(crate) fn get_attr_as_code(
    attribute: &AttributeInfo,
    cp: &RuntimeConstantPool,
) -> VmExecResult<CodeAttribute> {
    let mut buffer = ByteBuffer::new(&attribute.info);
    let max_stack = buffer.read_u16()?;
    let max_locals = buffer.read_u16()?;
    let code_length = buffer.read_u32()? as usize;
    let code = buffer.read_bytes(code_length)?.to_vec();
    let exception_table_length = buffer.read_u16()? as usize;
    // start_pc, end_pc, handler_pc, catch_type
    buffer.read_bytes(exception_table_length * 8)?;

    let mut line_number_table = IndexMap::new();
    let attributes_count = buffer.read_u16()?;
    for _ in 0..attributes_count {
        let name = cp.get_utf8(buffer.read_u16()?)?;
        let length = buffer.read_u32()? as usize;
        let info = buffer.read_bytes(length)?;
        if AttributeType::by_name(name) == AttributeType::LineNumberTable {
            read_line_number_table(info, &mut line_number_table)?;
        }
    }
    Ok(CodeAttribute {
        max_stack,
        max_locals,
        code: code.into(),
        line_number_table,
    })
}

fn read_line_number_table(info: &[u8], table: &mut IndexMap<u16, u16>) -> VmExecResult<()> {
    let mut buffer = ByteBuffer::new(info);
    let count = buffer.read_u16()?;
    for _ in 0..count {
        let (start_pc, line_number) = buffer.read_2_u16()?;
        table.insert(start_pc, line_number);
    }
    Ok(())
}
