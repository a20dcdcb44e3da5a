use crate::attribute_info::AttributeInfo;
use crate::byte_buffer::ByteBuffer;
use crate::class_file::{ClassAccessFlags, ClassFile};
use crate::class_file_error::{ClassFileError, Result};
use crate::class_file_version::ClassFileVersion;
use crate::constant_pool::{ConstantPool, ConstantPoolEntry};
use crate::field_info::{FieldAccessFlags, FieldInfo};
use crate::method_info::{MethodAccessFlags, MethodInfo};

const MAGIC: u32 = 0xCAFEBABE;

/// Reads a class from a byte slice.
/// ```c
/// ClassFile {
///     u4             magic;
///     u2             minor_version;
///     u2             major_version;
///     u2             constant_pool_count;
///     cp_info        constant_pool[constant_pool_count-1];
///     u2             access_flags;
///     u2             this_class;
///     u2             super_class;
///     u2             interfaces_count;
///     u2             interfaces[interfaces_count];
///     u2             fields_count;
///     field_info     fields[fields_count];
///     u2             methods_count;
///     method_info    methods[methods_count];
///     u2             attributes_count;
///     attribute_info attributes[attributes_count];
/// }
/// ```
pub fn read_buffer(buf: &[u8]) -> Result<ClassFile> {
    let mut buffer = ByteBuffer::new(buf);
    check_magic_number(&mut buffer)?;
    let version = read_version(&mut buffer)?;
    let constant_pool = read_const_pool(&mut buffer)?;
    let access_flags = read_flags(&mut buffer, ClassAccessFlags::from_bits, "class")?;
    let this_class_name = constant_pool.get_class_name(buffer.read_u16()?)?;
    let super_class_name = constant_pool.try_get_class_name(buffer.read_u16()?)?;

    let interface_names = read_interfaces(&mut buffer, &constant_pool)?;
    let field_info = read_list(&mut buffer, &constant_pool, read_one_field)?;
    let method_info = read_list(&mut buffer, &constant_pool, read_one_method)?;
    let attribute_info = read_list(&mut buffer, &constant_pool, read_one_attribute)?;
    if buffer.has_more_data() {
        return Err(ClassFileError::TrailingData(buffer.remaining()));
    }
    Ok(ClassFile {
        version,
        constant_pool,
        access_flags,
        this_class_name,
        super_class_name,
        interface_names,
        field_info,
        method_info,
        attribute_info,
    })
}

fn check_magic_number(buffer: &mut ByteBuffer) -> Result<()> {
    match buffer.read_u32()? {
        MAGIC => Ok(()),
        n => Err(ClassFileError::InvalidClassData(format!(
            "invalid magic number: {n:#x}"
        ))),
    }
}

fn read_version(buffer: &mut ByteBuffer) -> Result<ClassFileVersion> {
    let minor_version = buffer.read_u16()?;
    let major_version = buffer.read_u16()?;
    ClassFileVersion::new(major_version, minor_version)
}

fn read_const_pool(buffer: &mut ByteBuffer) -> Result<ConstantPool> {
    let mut constant_pool = ConstantPool::new();
    let constant_pool_count = buffer.read_u16()? as usize;
    while constant_pool.len() + 1 < constant_pool_count {
        constant_pool.add(ConstantPoolEntry::read_from_bytes(buffer)?);
    }
    Ok(constant_pool)
}

fn read_flags<F>(buffer: &mut ByteBuffer, from_bits: fn(u16) -> Option<F>, kind: &str) -> Result<F> {
    let bits = buffer.read_u16()?;
    from_bits(bits).ok_or_else(|| {
        ClassFileError::InvalidClassData(format!("invalid {kind} flags: {bits:#06x}"))
    })
}

fn read_interfaces(buffer: &mut ByteBuffer, cp: &ConstantPool) -> Result<Vec<String>> {
    let interfaces_count = buffer.read_u16()? as usize;
    (0..interfaces_count)
        .map(|_| cp.get_class_name(buffer.read_u16()?))
        .collect()
}

fn read_list<T>(
    buffer: &mut ByteBuffer,
    cp: &ConstantPool,
    read_one: fn(&mut ByteBuffer, &ConstantPool) -> Result<T>,
) -> Result<Vec<T>> {
    let count = buffer.read_u16()? as usize;
    (0..count).map(|_| read_one(buffer, cp)).collect()
}

/// ```c
/// field_info {
///     u2             access_flags;
///     u2             name_index;
///     u2             descriptor_index;
///     u2             attributes_count;
///     attribute_info attributes[attributes_count];
/// }
/// ```
fn read_one_field(buffer: &mut ByteBuffer, cp: &ConstantPool) -> Result<FieldInfo> {
    let access_flags = read_flags(buffer, FieldAccessFlags::from_bits, "field")?;
    let name = cp.get_string(buffer.read_u16()?)?;
    let descriptor = cp.get_string(buffer.read_u16()?)?;
    let attributes = read_list(buffer, cp, read_one_attribute)?;
    Ok(FieldInfo {
        access_flags,
        name,
        descriptor,
        attributes,
    })
}

/// Same layout as `field_info`.
fn read_one_method(buffer: &mut ByteBuffer, cp: &ConstantPool) -> Result<MethodInfo> {
    let access_flags = read_flags(buffer, MethodAccessFlags::from_bits, "method")?;
    let name = cp.get_string(buffer.read_u16()?)?;
    let descriptor = cp.get_string(buffer.read_u16()?)?;
    let attributes = read_list(buffer, cp, read_one_attribute)?;
    Ok(MethodInfo {
        access_flags,
        name,
        descriptor,
        attributes,
    })
}

fn read_one_attribute(buffer: &mut ByteBuffer, cp: &ConstantPool) -> Result<AttributeInfo> {
    let name = cp.get_string(buffer.read_u16()?)?;
    let attribute_length = buffer.read_u32()? as usize;
    let bytes = buffer.read_bytes(attribute_length)?;
    Ok(AttributeInfo {
        name,
        info: Vec::from(bytes),
    })
}
