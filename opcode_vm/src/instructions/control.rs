use crate::env::Env;
use crate::instructions::{i16_operand, i32_operand};
use crate::java_exception::InvokeResult;
use crate::jvm_values::Value;
use crate::stack_frame::StackFrame;

macro_rules! if_zero {
    ($name:ident, $cmp:tt) => {
        pub(super) fn $name(_env: &mut Env, frame: &mut StackFrame, operands: &[u8]) -> InvokeResult<()> {
            let offset = i16_operand(operands)?;
            if frame.pop_int()? $cmp 0 {
                frame.branch(offset as i32)?;
            }
            Ok(())
        }
    };
}

macro_rules! if_icmp {
    ($name:ident, $cmp:tt) => {
        pub(super) fn $name(_env: &mut Env, frame: &mut StackFrame, operands: &[u8]) -> InvokeResult<()> {
            let offset = i16_operand(operands)?;
            let value2 = frame.pop_int()?;
            let value1 = frame.pop_int()?;
            if value1 $cmp value2 {
                frame.branch(offset as i32)?;
            }
            Ok(())
        }
    };
}

macro_rules! if_reference {
    ($name:ident, $test:expr) => {
        pub(super) fn $name(_env: &mut Env, frame: &mut StackFrame, operands: &[u8]) -> InvokeResult<()> {
            let offset = i16_operand(operands)?;
            if $test(frame)? {
                frame.branch(offset as i32)?;
            }
            Ok(())
        }
    };
}

macro_rules! typed_return {
    ($name:ident, $pop:ident, $variant:ident, $descriptor:literal) => {
        pub(super) fn $name(_env: &mut Env, frame: &mut StackFrame, _operands: &[u8]) -> InvokeResult<()> {
            let value = frame.$pop()?;
            frame.set_return(Some(Value::$variant(value)), $descriptor);
            Ok(())
        }
    };
}

if_zero!(exec_ifeq, ==);
if_zero!(exec_ifne, !=);
if_zero!(exec_iflt, <);
if_zero!(exec_ifge, >=);
if_zero!(exec_ifgt, >);
if_zero!(exec_ifle, <=);
if_icmp!(exec_if_icmpeq, ==);
if_icmp!(exec_if_icmpne, !=);
if_icmp!(exec_if_icmplt, <);
if_icmp!(exec_if_icmpge, >=);
if_icmp!(exec_if_icmpgt, >);
if_icmp!(exec_if_icmple, <=);

if_reference!(exec_if_acmpeq, |frame: &mut StackFrame| -> InvokeResult<bool> {
    let value2 = frame.pop_reference()?;
    let value1 = frame.pop_reference()?;
    Ok(value1 == value2)
});
if_reference!(exec_if_acmpne, |frame: &mut StackFrame| -> InvokeResult<bool> {
    let value2 = frame.pop_reference()?;
    let value1 = frame.pop_reference()?;
    Ok(value1 != value2)
});
if_reference!(exec_ifnull, |frame: &mut StackFrame| -> InvokeResult<bool> {
    Ok(frame.pop_reference()?.is_null())
});
if_reference!(exec_ifnonnull, |frame: &mut StackFrame| -> InvokeResult<bool> {
    Ok(!frame.pop_reference()?.is_null())
});

pub(super) fn exec_goto(_env: &mut Env, frame: &mut StackFrame, operands: &[u8]) -> InvokeResult<()> {
    Ok(frame.branch(i16_operand(operands)? as i32)?)
}

pub(super) fn exec_goto_w(_env: &mut Env, frame: &mut StackFrame, operands: &[u8]) -> InvokeResult<()> {
    Ok(frame.branch(i32_operand(operands)?)?)
}

typed_return!(exec_ireturn, pop_int, Int, "I");
typed_return!(exec_lreturn, pop_long, Long, "J");
typed_return!(exec_freturn, pop_float, Float, "F");
typed_return!(exec_dreturn, pop_double, Double, "D");

pub(super) fn exec_areturn(_env: &mut Env, frame: &mut StackFrame, _operands: &[u8]) -> InvokeResult<()> {
    let value = frame.pop_reference()?;
    let descriptor = frame.return_descriptor().to_string();
    frame.set_return(Some(value), &descriptor);
    Ok(())
}

pub(super) fn exec_return(_env: &mut Env, frame: &mut StackFrame, _operands: &[u8]) -> InvokeResult<()> {
    frame.set_return(None, "void");
    Ok(())
}
