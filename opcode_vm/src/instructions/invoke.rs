use crate::class_model::MethodRef;
use crate::descriptor::MethodDescriptor;
use crate::env::Env;
use crate::instructions::u16_operand;
use crate::java_exception::{InvokeResult, JavaException, MethodCallError};
use crate::jvm_error::VmError;
use crate::jvm_values::Value;
use crate::runtime_constant_pool::MemberRef;
use crate::stack_frame::StackFrame;
use crate::vm_options::InvokeArgs;
use classfile::method_info::MethodAccessFlags;

struct CallSite {
    method_ref: MemberRef,
    descriptor: MethodDescriptor,
}

impl CallSite {
    fn resolve(frame: &StackFrame, operands: &[u8]) -> InvokeResult<CallSite> {
        let index = u16_operand(operands)?;
        let method_ref = frame.constant_pool().get_method_ref(index)?.clone();
        let descriptor = MethodDescriptor::parse(&method_ref.descriptor)?;
        Ok(CallSite {
            method_ref,
            descriptor,
        })
    }

    fn lookup(&self, env: &mut Env, flags: MethodAccessFlags) -> InvokeResult<MethodRef> {
        let class = env.find_class(&self.method_ref.class_name)?;
        class.get_method(&self.method_ref.name, &self.method_ref.descriptor, flags)
    }

    fn null_receiver(&self) -> JavaException {
        JavaException::NullPointer(format!(
            "cannot invoke {}.{}{} on null",
            self.method_ref.class_name, self.method_ref.name, self.method_ref.descriptor
        ))
    }
}

fn pop_arguments(frame: &mut StackFrame, site: &CallSite) -> InvokeResult<Vec<Value>> {
    Ok(frame.operand_stack_mut().pop_n(site.descriptor.args.len())?)
}

/// Receiver and arguments of an instance call.
fn collect_instance_arguments(
    env: &Env,
    frame: &mut StackFrame,
    site: &CallSite,
) -> InvokeResult<(Value, Vec<Value>)> {
    let (receiver, args) = match env.options().invoke_args {
        InvokeArgs::Descriptor => {
            let args = pop_arguments(frame, site)?;
            (frame.pop_reference()?, args)
        }
        InvokeArgs::DrainStack => {
            let mut values = frame.operand_stack_mut().drain_all().into_iter();
            let receiver = values.next().ok_or(VmError::PopFromEmptyStack)?;
            (receiver, values.collect())
        }
    };
    if receiver.is_null() {
        return Err(site.null_receiver().into());
    }
    Ok((receiver, args))
}

/// Picks the override declared on the receiver's runtime class, if any.
fn select_override(receiver: &Value, site: &CallSite, resolved: MethodRef) -> InvokeResult<MethodRef> {
    let Value::ObjectRef(object) = receiver else {
        return Ok(resolved);
    };
    if object.class_name() == site.method_ref.class_name {
        return Ok(resolved);
    }
    let runtime_class = object.get_class()?;
    match runtime_class.get_method(
        &site.method_ref.name,
        &site.method_ref.descriptor,
        MethodAccessFlags::empty(),
    ) {
        Err(MethodCallError::ExceptionThrown(JavaException::NoSuchMethod { .. })) => Ok(resolved),
        found => found,
    }
}

/// Pushes the callee's result with the category of its declared return type.
fn push_result(frame: &mut StackFrame, site: &CallSite, result: Option<Value>) -> InvokeResult<()> {
    match (&site.descriptor.ret, result) {
        (None, None) => Ok(()),
        (Some(ret), Some(value)) if ret.category() == value.category() => Ok(frame.push(value)?),
        _ => Err(VmError::ValueTypeMissMatch.into()),
    }
}

pub(super) fn exec_invokevirtual(env: &mut Env, frame: &mut StackFrame, operands: &[u8]) -> InvokeResult<()> {
    let site = CallSite::resolve(frame, operands)?;
    let resolved = site.lookup(env, MethodAccessFlags::empty())?;
    let (receiver, args) = collect_instance_arguments(env, frame, &site)?;
    let method = select_override(&receiver, &site, resolved)?;
    let result = env.invoke(&method, Some(receiver), args)?;
    push_result(frame, &site, result)
}

pub(super) fn exec_invokeinterface(env: &mut Env, frame: &mut StackFrame, operands: &[u8]) -> InvokeResult<()> {
    exec_invokevirtual(env, frame, operands)
}

/// Constructors, private methods and `super` calls: no override selection.
pub(super) fn exec_invokespecial(env: &mut Env, frame: &mut StackFrame, operands: &[u8]) -> InvokeResult<()> {
    let site = CallSite::resolve(frame, operands)?;
    let method = site.lookup(env, MethodAccessFlags::empty())?;
    let args = pop_arguments(frame, &site)?;
    let receiver = frame.pop_reference()?;
    if receiver.is_null() {
        return Err(site.null_receiver().into());
    }
    let result = env.invoke(&method, Some(receiver), args)?;
    push_result(frame, &site, result)
}

pub(super) fn exec_invokestatic(env: &mut Env, frame: &mut StackFrame, operands: &[u8]) -> InvokeResult<()> {
    let site = CallSite::resolve(frame, operands)?;
    let method = site.lookup(env, MethodAccessFlags::STATIC)?;
    let args = pop_arguments(frame, &site)?;
    let result = env.invoke(&method, None, args)?;
    push_result(frame, &site, result)
}
