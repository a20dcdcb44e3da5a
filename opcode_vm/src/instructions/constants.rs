use crate::env::Env;
use crate::instructions::{i16_operand, u16_operand, u8_operand};
use crate::java_exception::InvokeResult;
use crate::jvm_error::VmError;
use crate::jvm_values::Value;
use crate::runtime_constant_pool::RuntimeConstantPoolEntry;
use crate::stack_frame::StackFrame;

macro_rules! push_constant {
    ($name:ident, $value:expr) => {
        pub(super) fn $name(_env: &mut Env, frame: &mut StackFrame, _operands: &[u8]) -> InvokeResult<()> {
            Ok(frame.push($value)?)
        }
    };
}

pub(super) fn exec_nop(_env: &mut Env, _frame: &mut StackFrame, _operands: &[u8]) -> InvokeResult<()> {
    Ok(())
}

push_constant!(exec_aconst_null, Value::Null);
push_constant!(exec_iconst_m1, Value::Int(-1));
push_constant!(exec_iconst_0, Value::Int(0));
push_constant!(exec_iconst_1, Value::Int(1));
push_constant!(exec_iconst_2, Value::Int(2));
push_constant!(exec_iconst_3, Value::Int(3));
push_constant!(exec_iconst_4, Value::Int(4));
push_constant!(exec_iconst_5, Value::Int(5));
push_constant!(exec_lconst_0, Value::Long(0));
push_constant!(exec_lconst_1, Value::Long(1));
push_constant!(exec_fconst_0, Value::Float(0.0));
push_constant!(exec_fconst_1, Value::Float(1.0));
push_constant!(exec_fconst_2, Value::Float(2.0));
push_constant!(exec_dconst_0, Value::Double(0.0));
push_constant!(exec_dconst_1, Value::Double(1.0));

pub(super) fn exec_bipush(_env: &mut Env, frame: &mut StackFrame, operands: &[u8]) -> InvokeResult<()> {
    let value = u8_operand(operands)? as i8;
    Ok(frame.push(Value::Int(value as i32))?)
}

pub(super) fn exec_sipush(_env: &mut Env, frame: &mut StackFrame, operands: &[u8]) -> InvokeResult<()> {
    let value = i16_operand(operands)?;
    Ok(frame.push(Value::Int(value as i32))?)
}

pub(super) fn exec_ldc(env: &mut Env, frame: &mut StackFrame, operands: &[u8]) -> InvokeResult<()> {
    let index = u8_operand(operands)? as u16;
    push_loadable(env, frame, index, false)
}

pub(super) fn exec_ldc_w(env: &mut Env, frame: &mut StackFrame, operands: &[u8]) -> InvokeResult<()> {
    push_loadable(env, frame, u16_operand(operands)?, false)
}

pub(super) fn exec_ldc2_w(env: &mut Env, frame: &mut StackFrame, operands: &[u8]) -> InvokeResult<()> {
    push_loadable(env, frame, u16_operand(operands)?, true)
}

// ldc and ldc_w accept int, float and string constants, ldc2_w long and double.
fn push_loadable(env: &mut Env, frame: &mut StackFrame, index: u16, wide: bool) -> InvokeResult<()> {
    let value = match (frame.constant_pool().get(index)?, wide) {
        (RuntimeConstantPoolEntry::Integer(v), false) => Value::Int(*v),
        (RuntimeConstantPoolEntry::Float(v), false) => Value::Float(*v),
        (RuntimeConstantPoolEntry::StringReference(v), false) => {
            Value::ObjectRef(env.intern_string(v)?)
        }
        (RuntimeConstantPoolEntry::Long(v), true) => Value::Long(*v),
        (RuntimeConstantPoolEntry::Double(v), true) => Value::Double(*v),
        (other, _) => return Err(VmError::UnresolvedConstantTag(other.tag()).into()),
    };
    Ok(frame.push(value)?)
}
