use crate::env::Env;
use crate::instructions::u16_operand;
use crate::java_exception::InvokeResult;
use crate::jvm_values::Value;
use crate::runtime_constant_pool::MemberRef;
use crate::stack_frame::StackFrame;
use classfile::field_info::FieldAccessFlags;
use log::trace;

fn field_ref(frame: &StackFrame, operands: &[u8]) -> InvokeResult<MemberRef> {
    let index = u16_operand(operands)?;
    Ok(frame.constant_pool().get_field_ref(index)?.clone())
}

pub(super) fn exec_getstatic(env: &mut Env, frame: &mut StackFrame, operands: &[u8]) -> InvokeResult<()> {
    let field = field_ref(frame, operands)?;
    let class = env.find_class(&field.class_name)?;
    let value = class.get_field(&field.name, &field.descriptor, FieldAccessFlags::STATIC)?;
    trace!("getstatic {}.{} = {:?}", field.class_name, field.name, value);
    Ok(frame.push(value)?)
}

pub(super) fn exec_putstatic(env: &mut Env, frame: &mut StackFrame, operands: &[u8]) -> InvokeResult<()> {
    let field = field_ref(frame, operands)?;
    let value = frame.pop()?;
    let class = env.find_class(&field.class_name)?;
    trace!("putstatic {}.{} = {:?}", field.class_name, field.name, value);
    class.put_field(env, &field.name, value)
}

pub(super) fn exec_getfield(_env: &mut Env, frame: &mut StackFrame, operands: &[u8]) -> InvokeResult<()> {
    let field = field_ref(frame, operands)?;
    let object = frame.pop_object()?;
    let value = object.get_field(&field.class_name, &field.name)?;
    Ok(frame.push(value)?)
}

pub(super) fn exec_putfield(_env: &mut Env, frame: &mut StackFrame, operands: &[u8]) -> InvokeResult<()> {
    let field = field_ref(frame, operands)?;
    let value = frame.pop()?;
    let object = frame.pop_object()?;
    object.put_field(&field.class_name, &field.name, value)
}

/// Allocates the object only; the constructor runs through a later `invokespecial`.
pub(super) fn exec_new(env: &mut Env, frame: &mut StackFrame, operands: &[u8]) -> InvokeResult<()> {
    let index = u16_operand(operands)?;
    let class_name = frame.constant_pool().get_class_name(index)?.to_string();
    let class = env.find_class(&class_name)?;
    let object = class.new_instance(env)?;
    Ok(frame.push(Value::ObjectRef(object))?)
}
