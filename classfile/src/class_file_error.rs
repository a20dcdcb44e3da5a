use thiserror::Error;

/// Errors raised while decoding a .class file
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ClassFileError {
    #[error("invalid class data: {0}")]
    InvalidClassData(String),
    #[error("unsupported class file version {0}.{1}")]
    UnsupportedVersion(u16, u16),

    #[error("constant pool tag not supported: {0}")]
    ConstantPoolTagNotSupport(u8),
    #[error("invalid constant pool index {0}")]
    InvalidConstantPoolIndexError(u16),

    #[error("unexpected end of data")]
    UnexpectedEndOfData,
    #[error("invalid cesu8 string")]
    InvalidCesu8String,
    #[error("{0} trailing bytes after the class attributes")]
    TrailingData(usize),
}

pub type Result<T> = std::result::Result<T, ClassFileError>;
