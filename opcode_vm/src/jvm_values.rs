use crate::class_model::JvmObject;
use crate::java_exception::{InvokeResult, JavaException};
use crate::jvm_error::{VmError, VmExecResult};
use parking_lot::RwLock;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

pub type ObjectRef = Arc<dyn JvmObject>;
pub type ArrayRef = Arc<JvmArray>;

/// Number of 32-bit slots a value occupies on the operand stack and in locals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    One,
    Two,
}

impl Category {
    pub const fn slots(self) -> usize {
        match self {
            Category::One => 1,
            Category::Two => 2,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub enum Value {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ObjectRef(ObjectRef),
    ArrayRef(ArrayRef),
    #[default]
    Null,
}

impl Value {
    pub fn category(&self) -> Category {
        match self {
            Value::Long(_) | Value::Double(_) => Category::Two,
            _ => Category::One,
        }
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    pub fn is_long(&self) -> bool {
        matches!(self, Value::Long(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    pub fn is_double(&self) -> bool {
        matches!(self, Value::Double(_))
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Value::ObjectRef(_) | Value::ArrayRef(_) | Value::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn get_int(&self) -> VmExecResult<i32> {
        match self {
            Value::Int(v) => Ok(*v),
            _ => Err(VmError::ValueTypeMissMatch),
        }
    }

    pub fn get_long(&self) -> VmExecResult<i64> {
        match self {
            Value::Long(v) => Ok(*v),
            _ => Err(VmError::ValueTypeMissMatch),
        }
    }

    pub fn get_float(&self) -> VmExecResult<f32> {
        match self {
            Value::Float(v) => Ok(*v),
            _ => Err(VmError::ValueTypeMissMatch),
        }
    }

    pub fn get_double(&self) -> VmExecResult<f64> {
        match self {
            Value::Double(v) => Ok(*v),
            _ => Err(VmError::ValueTypeMissMatch),
        }
    }

    /// Zero value of a field descriptor.
    pub fn default_for_descriptor(descriptor: &str) -> Value {
        match descriptor.as_bytes().first() {
            Some(b'B' | b'C' | b'I' | b'S' | b'Z') => Value::Int(0),
            Some(b'J') => Value::Long(0),
            Some(b'F') => Value::Float(0.0),
            Some(b'D') => Value::Double(0.0),
            _ => Value::Null,
        }
    }

    /// Whether this value may be stored into a field of the given descriptor.
    /// Reference types are only checked for object/array shape.
    pub fn matches_descriptor(&self, descriptor: &str) -> bool {
        match (descriptor.as_bytes().first(), self) {
            (Some(b'B' | b'C' | b'I' | b'S' | b'Z'), Value::Int(_)) => true,
            (Some(b'J'), Value::Long(_)) => true,
            (Some(b'F'), Value::Float(_)) => true,
            (Some(b'D'), Value::Double(_)) => true,
            (Some(b'L' | b'['), Value::Null) => true,
            (Some(b'L'), Value::ObjectRef(_)) => true,
            (Some(b'['), Value::ArrayRef(_)) => true,
            (Some(b'L'), Value::ArrayRef(_)) => descriptor == "Ljava/lang/Object;",
            _ => false,
        }
    }

    /// Short type name used in diagnostics.
    pub fn type_name(&self) -> String {
        match self {
            Value::Int(_) => "int".to_string(),
            Value::Long(_) => "long".to_string(),
            Value::Float(_) => "float".to_string(),
            Value::Double(_) => "double".to_string(),
            Value::ObjectRef(object) => object.class_name().to_string(),
            Value::ArrayRef(array) => format!("{}[]", array.element()),
            Value::Null => "null".to_string(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::ObjectRef(a), Value::ObjectRef(b)) => {
                Arc::as_ptr(a) as *const u8 == Arc::as_ptr(b) as *const u8
            }
            (Value::ArrayRef(a), Value::ArrayRef(b)) => Arc::ptr_eq(a, b),
            (Value::Null, Value::Null) => true,
            _ => false,
        }
    }
}

/// Primitive array element types, numbered as in `newarray`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryType {
    Boolean,
    Char,
    Float,
    Double,
    Byte,
    Short,
    Int,
    Long,
}

impl PrimaryType {
    pub fn from_atype(atype: u8) -> Option<PrimaryType> {
        match atype {
            4 => Some(PrimaryType::Boolean),
            5 => Some(PrimaryType::Char),
            6 => Some(PrimaryType::Float),
            7 => Some(PrimaryType::Double),
            8 => Some(PrimaryType::Byte),
            9 => Some(PrimaryType::Short),
            10 => Some(PrimaryType::Int),
            11 => Some(PrimaryType::Long),
            _ => None,
        }
    }

    pub fn descriptor(&self) -> &'static str {
        match self {
            PrimaryType::Boolean => "Z",
            PrimaryType::Char => "C",
            PrimaryType::Float => "F",
            PrimaryType::Double => "D",
            PrimaryType::Byte => "B",
            PrimaryType::Short => "S",
            PrimaryType::Int => "I",
            PrimaryType::Long => "J",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayElement {
    Primitive(PrimaryType),
    Reference(String),
}

impl ArrayElement {
    fn descriptor(&self) -> String {
        match self {
            ArrayElement::Primitive(primary) => primary.descriptor().to_string(),
            ArrayElement::Reference(name) if name.starts_with('[') => name.clone(),
            ArrayElement::Reference(name) => format!("L{name};"),
        }
    }
}

impl std::fmt::Display for ArrayElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ArrayElement::Primitive(primary) => write!(f, "{:?}", primary),
            ArrayElement::Reference(name) => write!(f, "{name}"),
        }
    }
}

pub struct JvmArray {
    element: ArrayElement,
    data: RwLock<Vec<Value>>,
}

impl JvmArray {
    pub fn new(element: ArrayElement, length: usize) -> JvmArray {
        let zero = Value::default_for_descriptor(&element.descriptor());
        JvmArray {
            element,
            data: RwLock::new(vec![zero; length]),
        }
    }

    pub fn from_values(element: ArrayElement, values: Vec<Value>) -> JvmArray {
        JvmArray {
            element,
            data: RwLock::new(values),
        }
    }

    pub fn element(&self) -> &ArrayElement {
        &self.element
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: i32) -> InvokeResult<Value> {
        let data = self.data.read();
        usize::try_from(index)
            .ok()
            .and_then(|i| data.get(i).cloned())
            .ok_or_else(|| {
                JavaException::ArrayIndexOutOfBounds {
                    index,
                    length: data.len(),
                }
                .into()
            })
    }

    pub fn set(&self, index: i32, value: Value) -> InvokeResult<()> {
        if !value.matches_descriptor(&self.element.descriptor()) {
            return Err(VmError::ValueTypeMissMatch.into());
        }
        let mut data = self.data.write();
        let length = data.len();
        match usize::try_from(index).ok().and_then(|i| data.get_mut(i)) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(JavaException::ArrayIndexOutOfBounds { index, length }.into()),
        }
    }
}

impl Debug for JvmArray {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.element, self.len())
    }
}
