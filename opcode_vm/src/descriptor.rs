use crate::jvm_error::{VmError, VmExecResult};
use crate::jvm_values::Category;
use std::fmt::{Display, Formatter};
use std::iter::Peekable;
use std::str::Chars;

/// Field type as written in a descriptor.
/// [jvms-4.3.2](https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html#jvms-4.3.2)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
    Object(String),
    Array(Box<FieldType>),
}

impl FieldType {
    pub fn parse(descriptor: &str) -> VmExecResult<FieldType> {
        let mut chars = descriptor.chars().peekable();
        match parse_field_type(&mut chars) {
            Some(field_type) if chars.next().is_none() => Ok(field_type),
            _ => Err(VmError::InvalidDescriptor(descriptor.to_string())),
        }
    }

    pub fn category(&self) -> Category {
        match self {
            FieldType::Long | FieldType::Double => Category::Two,
            _ => Category::One,
        }
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::Byte => write!(f, "B"),
            FieldType::Char => write!(f, "C"),
            FieldType::Double => write!(f, "D"),
            FieldType::Float => write!(f, "F"),
            FieldType::Int => write!(f, "I"),
            FieldType::Long => write!(f, "J"),
            FieldType::Short => write!(f, "S"),
            FieldType::Boolean => write!(f, "Z"),
            FieldType::Object(name) => write!(f, "L{name};"),
            FieldType::Array(component) => write!(f, "[{component}"),
        }
    }
}

fn parse_field_type(chars: &mut Peekable<Chars>) -> Option<FieldType> {
    let field_type = match chars.next()? {
        'B' => FieldType::Byte,
        'C' => FieldType::Char,
        'D' => FieldType::Double,
        'F' => FieldType::Float,
        'I' => FieldType::Int,
        'J' => FieldType::Long,
        'S' => FieldType::Short,
        'Z' => FieldType::Boolean,
        'L' => {
            let mut name = String::new();
            loop {
                match chars.next()? {
                    ';' => break,
                    c => name.push(c),
                }
            }
            if name.is_empty() {
                return None;
            }
            FieldType::Object(name)
        }
        '[' => FieldType::Array(Box::new(parse_field_type(chars)?)),
        _ => return None,
    };
    Some(field_type)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub args: Vec<FieldType>,
    /// `None` for `V`.
    pub ret: Option<FieldType>,
}

impl MethodDescriptor {
    pub fn parse(descriptor: &str) -> VmExecResult<MethodDescriptor> {
        let invalid = || VmError::InvalidDescriptor(descriptor.to_string());
        let mut chars = descriptor.chars().peekable();
        if chars.next() != Some('(') {
            return Err(invalid());
        }
        let mut args = Vec::new();
        while chars.peek().is_some_and(|c| *c != ')') {
            args.push(parse_field_type(&mut chars).ok_or_else(invalid)?);
        }
        if chars.next() != Some(')') {
            return Err(invalid());
        }
        let ret = if chars.peek() == Some(&'V') {
            chars.next();
            None
        } else {
            Some(parse_field_type(&mut chars).ok_or_else(invalid)?)
        };
        if chars.next().is_some() {
            return Err(invalid());
        }
        Ok(MethodDescriptor { args, ret })
    }

    /// Local slots taken by the arguments, receiver excluded.
    pub fn arg_slots(&self) -> usize {
        self.args.iter().map(|arg| arg.category().slots()).sum()
    }

    /// Return descriptor in the form staged by return opcodes: `"void"` or a field descriptor.
    pub fn return_descriptor(&self) -> String {
        match &self.ret {
            None => "void".to_string(),
            Some(field_type) => field_type.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::descriptor::{FieldType, MethodDescriptor};

    #[test]
    fn parses_method_descriptors() {
        let main = MethodDescriptor::parse("([Ljava/lang/String;)V").unwrap();
        assert_eq!(
            vec![FieldType::Array(Box::new(FieldType::Object(
                "java/lang/String".to_string()
            )))],
            main.args
        );
        assert_eq!(None, main.ret);
        assert_eq!("void", main.return_descriptor());

        let mixed = MethodDescriptor::parse("(IDJLjava/lang/Object;[[B)D").unwrap();
        assert_eq!(5, mixed.args.len());
        assert_eq!(7, mixed.arg_slots());
        assert_eq!("D", mixed.return_descriptor());
    }

    #[test]
    fn rejects_malformed_descriptors() {
        for bad in ["", "V", "(I", "(Q)V", "()", "()VV", "(L;)V", "()[", "(I)II"] {
            assert!(MethodDescriptor::parse(bad).is_err(), "{bad}");
        }
        assert!(FieldType::parse("Ljava/lang/String").is_err());
        assert!(FieldType::parse("II").is_err());
        assert_eq!(FieldType::Long, FieldType::parse("J").unwrap());
    }
}
