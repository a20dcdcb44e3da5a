use crate::env::Env;
use crate::java_exception::InvokeResult;
use crate::stack_frame::StackFrame;

pub(super) fn exec_pop(_env: &mut Env, frame: &mut StackFrame, _operands: &[u8]) -> InvokeResult<()> {
    frame.pop()?;
    Ok(())
}

pub(super) fn exec_pop2(_env: &mut Env, frame: &mut StackFrame, _operands: &[u8]) -> InvokeResult<()> {
    Ok(frame.operand_stack_mut().pop2()?)
}

/// Duplicates the top value whatever its width.
pub(super) fn exec_dup(_env: &mut Env, frame: &mut StackFrame, _operands: &[u8]) -> InvokeResult<()> {
    Ok(frame.operand_stack_mut().dup()?)
}

pub(super) fn exec_dup_x1(_env: &mut Env, frame: &mut StackFrame, _operands: &[u8]) -> InvokeResult<()> {
    Ok(frame.operand_stack_mut().dup_x1()?)
}

pub(super) fn exec_swap(_env: &mut Env, frame: &mut StackFrame, _operands: &[u8]) -> InvokeResult<()> {
    Ok(frame.operand_stack_mut().swap()?)
}
