use crate::env::Env;
use crate::instructions::{u16_operand, u8_operand};
use crate::java_exception::{InvokeResult, JavaException};
use crate::jvm_error::VmError;
use crate::jvm_values::{ArrayElement, JvmArray, PrimaryType, Value};
use crate::stack_frame::StackFrame;
use std::sync::Arc;

macro_rules! generate_aload {
    ($name:ident, $accepts:path) => {
        pub(super) fn $name(_env: &mut Env, frame: &mut StackFrame, _operands: &[u8]) -> InvokeResult<()> {
            let index = frame.pop_int()?;
            let array = frame.pop_array()?;
            let value = array.get(index)?;
            if !$accepts(&value) {
                return Err(VmError::ValueTypeMissMatch.into());
            }
            Ok(frame.push(value)?)
        }
    };
}

macro_rules! generate_astore {
    ($name:ident, $accepts:path) => {
        pub(super) fn $name(_env: &mut Env, frame: &mut StackFrame, _operands: &[u8]) -> InvokeResult<()> {
            let value = frame.pop()?;
            if !$accepts(&value) {
                return Err(VmError::ValueTypeMissMatch.into());
            }
            let index = frame.pop_int()?;
            let array = frame.pop_array()?;
            array.set(index, value)
        }
    };
}

// int stores into narrow arrays are truncated to the element width
macro_rules! generate_narrow_astore {
    ($name:ident, $truncate:expr) => {
        pub(super) fn $name(_env: &mut Env, frame: &mut StackFrame, _operands: &[u8]) -> InvokeResult<()> {
            let value = frame.pop_int()?;
            let index = frame.pop_int()?;
            let array = frame.pop_array()?;
            let value = $truncate(array.element(), value);
            array.set(index, Value::Int(value))
        }
    };
}

generate_aload!(exec_iaload, Value::is_int);
generate_aload!(exec_laload, Value::is_long);
generate_aload!(exec_faload, Value::is_float);
generate_aload!(exec_daload, Value::is_double);
generate_aload!(exec_aaload, Value::is_reference);
generate_aload!(exec_baload, Value::is_int);
generate_aload!(exec_caload, Value::is_int);
generate_aload!(exec_saload, Value::is_int);

generate_astore!(exec_iastore, Value::is_int);
generate_astore!(exec_lastore, Value::is_long);
generate_astore!(exec_fastore, Value::is_float);
generate_astore!(exec_dastore, Value::is_double);
generate_astore!(exec_aastore, Value::is_reference);
generate_narrow_astore!(exec_bastore, |element: &ArrayElement, value: i32| match element {
    ArrayElement::Primitive(PrimaryType::Boolean) => value & 1,
    _ => value as i8 as i32,
});
generate_narrow_astore!(exec_castore, |_: &ArrayElement, value: i32| value as u16 as i32);
generate_narrow_astore!(exec_sastore, |_: &ArrayElement, value: i32| value as i16 as i32);

fn checked_length(length: i32) -> InvokeResult<usize> {
    usize::try_from(length).map_err(|_| JavaException::NegativeArraySize(length).into())
}

pub(super) fn exec_newarray(_env: &mut Env, frame: &mut StackFrame, operands: &[u8]) -> InvokeResult<()> {
    let atype = u8_operand(operands)?;
    let primary = PrimaryType::from_atype(atype)
        .ok_or_else(|| VmError::ExecuteCodeError(format!("invalid newarray type {atype}")))?;
    let length = checked_length(frame.pop_int()?)?;
    let array = JvmArray::new(ArrayElement::Primitive(primary), length);
    Ok(frame.push(Value::ArrayRef(Arc::new(array)))?)
}

pub(super) fn exec_anewarray(_env: &mut Env, frame: &mut StackFrame, operands: &[u8]) -> InvokeResult<()> {
    let index = u16_operand(operands)?;
    let class_name = frame.constant_pool().get_class_name(index)?.to_string();
    let length = checked_length(frame.pop_int()?)?;
    let array = JvmArray::new(ArrayElement::Reference(class_name), length);
    Ok(frame.push(Value::ArrayRef(Arc::new(array)))?)
}

pub(super) fn exec_arraylength(_env: &mut Env, frame: &mut StackFrame, _operands: &[u8]) -> InvokeResult<()> {
    let array = frame.pop_array()?;
    Ok(frame.push(Value::Int(array.len() as i32))?)
}
