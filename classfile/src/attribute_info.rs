use strum_macros::Display;

/// Attribute kinds the runtime looks at. Everything else is kept as raw bytes.
/// [jvms-4.7](https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html#jvms-4.7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum AttributeType {
    Code,
    ConstantValue,
    SourceFile,
    LineNumberTable,
    Exceptions,
    Other,
}

impl AttributeType {
    pub fn by_name(name: &str) -> AttributeType {
        match name {
            "Code" => AttributeType::Code,
            "ConstantValue" => AttributeType::ConstantValue,
            "SourceFile" => AttributeType::SourceFile,
            "LineNumberTable" => AttributeType::LineNumberTable,
            "Exceptions" => AttributeType::Exceptions,
            _ => AttributeType::Other,
        }
    }
}

/// ```c
/// attribute_info {
///     u2 attribute_name_index;
///     u4 attribute_length;
///     u1 info[attribute_length];
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeInfo {
    pub name: String,
    pub info: Vec<u8>,
}

impl AttributeInfo {
    pub fn new(name: &str, info: Vec<u8>) -> Self {
        AttributeInfo {
            name: name.to_string(),
            info,
        }
    }

    pub fn kind(&self) -> AttributeType {
        AttributeType::by_name(&self.name)
    }
}
