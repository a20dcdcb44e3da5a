use crate::jvm_error::VmError;
use crate::jvm_values::Value;
use thiserror::Error;

/// Throwables raised by the class/object model and by opcode semantics.
/// They unwind the current invocation but do not corrupt VM state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JavaException {
    #[error("{class_name}.{name}{descriptor}")]
    NoSuchMethod {
        class_name: String,
        name: String,
        descriptor: String,
    },
    #[error("{class_name}.{name}")]
    NoSuchField { class_name: String, name: String },
    #[error("{0}")]
    Instantiation(String),
    #[error("{0}")]
    IllegalAccess(String),
    #[error("{class_name}.{name} expects {descriptor}, got {actual}")]
    FieldTypeMismatch {
        class_name: String,
        name: String,
        descriptor: String,
        actual: String,
    },
    #[error("{0}")]
    NoClassDefFound(String),
    #[error("{0}")]
    NullPointer(String),
    #[error("Index {index} out of bounds for length {length}")]
    ArrayIndexOutOfBounds { index: i32, length: usize },
    #[error("{0}")]
    NegativeArraySize(i32),
    #[error("{0}")]
    Arithmetic(String),
}

impl JavaException {
    pub fn class_name(&self) -> &'static str {
        match self {
            JavaException::NoSuchMethod { .. } => "java/lang/NoSuchMethodError",
            JavaException::NoSuchField { .. } => "java/lang/NoSuchFieldError",
            JavaException::Instantiation(_) => "java/lang/InstantiationException",
            JavaException::IllegalAccess(_) => "java/lang/IllegalAccessException",
            JavaException::FieldTypeMismatch { .. } => "java/lang/IncompatibleClassChangeError",
            JavaException::NoClassDefFound(_) => "java/lang/NoClassDefFoundError",
            JavaException::NullPointer(_) => "java/lang/NullPointerException",
            JavaException::ArrayIndexOutOfBounds { .. } => {
                "java/lang/ArrayIndexOutOfBoundsException"
            }
            JavaException::NegativeArraySize(_) => "java/lang/NegativeArraySizeException",
            JavaException::Arithmetic(_) => "java/lang/ArithmeticException",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MethodCallError {
    #[error("internal error: {0}")]
    InternalError(#[from] VmError),
    #[error("exception {}: {0}", .0.class_name())]
    ExceptionThrown(#[from] JavaException),
}

impl MethodCallError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, MethodCallError::InternalError(_))
    }
}

pub type InvokeResult<T> = Result<T, MethodCallError>;

pub type InvokeMethodResult = InvokeResult<Option<Value>>;

#[cfg(test)]
mod tests {
    use crate::java_exception::{JavaException, MethodCallError};
    use crate::jvm_error::VmError;

    #[test]
    fn fatal_and_recoverable_are_told_apart() {
        let fatal: MethodCallError = VmError::UnimplementedOpcode("invokedynamic".into()).into();
        assert!(fatal.is_fatal());
        assert_eq!(
            "internal error: The opcode invokedynamic Not Impl",
            fatal.to_string()
        );

        let thrown: MethodCallError = JavaException::NullPointer("receiver".into()).into();
        assert!(!thrown.is_fatal());
        assert_eq!(
            "exception java/lang/NullPointerException: receiver",
            thrown.to_string()
        );
    }
}
