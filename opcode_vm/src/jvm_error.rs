use classfile::class_file_error::ClassFileError;
use thiserror::Error;

/// Interpreter-internal failures. None of these can be caught by bytecode;
/// they abort the executing thread.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VmError {
    #[error("The opcode {0} Not Impl")]
    UnimplementedOpcode(String),
    #[error("unknown type: {0}")]
    UnresolvedConstantTag(u8),
    #[error("invalid constant pool index {0}")]
    InvalidConstantPoolIndex(u16),
    #[error("constant pool entry {index} is not a {expected}")]
    UnexpectedConstant { index: u16, expected: &'static str },

    #[error("value type miss match")]
    ValueTypeMissMatch,
    #[error("index out of bounds")]
    IndexOutOfBounds,
    #[error("local slot {0} holds no value")]
    InvalidLocalSlot(usize),
    #[error("can't pop from empty stack")]
    PopFromEmptyStack,
    #[error("stack over flow")]
    StackOverFlow,

    #[error("code ends inside the operands of {0}")]
    TruncatedCode(String),
    #[error("execution ran past the end of {0}")]
    FellOffCode(String),
    #[error("branch to {0} leaves the method code")]
    InvalidBranchTarget(i64),
    #[error("method {0} has no code")]
    MissingCode(String),
    #[error("invalid descriptor {0}")]
    InvalidDescriptor(String),
    #[error("InvalidAttribute {0}")]
    InvalidAttribute(String),
    #[error("class {0} is no longer loaded")]
    ClassUnloaded(String),

    #[error("ReadClassBytesError {0}")]
    ReadClassBytesError(String),
    #[error("ClassPathNotExist {0}")]
    ClassPathNotExist(String),
    #[error("JarFileNotExist {0}")]
    JarFileNotExist(String),
    #[error("ReadJarFileError {0}")]
    ReadJarFileError(String),
    #[error("ExecuteCodeError {0}")]
    ExecuteCodeError(String),
}

impl From<ClassFileError> for VmError {
    fn from(value: ClassFileError) -> Self {
        VmError::ReadClassBytesError(value.to_string())
    }
}

pub type VmExecResult<T> = Result<T, VmError>;
