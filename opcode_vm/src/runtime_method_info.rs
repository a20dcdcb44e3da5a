use crate::class_model::JvmMethod;
use crate::descriptor::MethodDescriptor;
use crate::env::Env;
use crate::interpreter::run_frame;
use crate::java_exception::InvokeMethodResult;
use crate::jvm_error::{VmError, VmExecResult};
use crate::jvm_values::Value;
use crate::runtime_attribute_info::{get_attr_as_code, CodeAttribute};
use crate::runtime_constant_pool::RuntimeConstantPool;
use crate::stack_frame::StackFrame;
use classfile::method_info::{MethodAccessFlags, MethodInfo};
use log::debug;
use std::sync::Arc;

/// A method of a class loaded from bytecode.
#[derive(Debug)]
pub struct BytecodeMethod {
    class_name: String,
    source_file: Option<String>,
    access_flags: MethodAccessFlags,
    name: String,
    descriptor: String,
    return_descriptor: String,
    constant_pool: Arc<RuntimeConstantPool>,
    // abstract methods carry no code
    code: Option<Arc<CodeAttribute>>,
}

impl BytecodeMethod {
    pub fn from(
        class_name: &str,
        source_file: Option<&str>,
        method_info: &MethodInfo,
        constant_pool: &Arc<RuntimeConstantPool>,
    ) -> VmExecResult<BytecodeMethod> {
        let return_descriptor = MethodDescriptor::parse(&method_info.descriptor)?.return_descriptor();
        let code = match method_info.code() {
            Some(attribute) => Some(Arc::new(get_attr_as_code(attribute, constant_pool)?)),
            None => None,
        };
        Ok(BytecodeMethod {
            class_name: class_name.to_string(),
            source_file: source_file.map(str::to_string),
            access_flags: method_info.access_flags,
            name: method_info.name.clone(),
            descriptor: method_info.descriptor.clone(),
            return_descriptor,
            constant_pool: Arc::clone(constant_pool),
            code,
        })
    }

    pub fn code(&self) -> Option<&CodeAttribute> {
        self.code.as_deref()
    }

    fn execute(&self, env: &mut Env, code: &CodeAttribute, receiver: Option<Value>, args: Vec<Value>) -> InvokeMethodResult {
        let mut frame = StackFrame::new(
            &self.class_name,
            &self.name,
            self.return_descriptor.clone(),
            Arc::clone(&self.constant_pool),
            code,
        );
        frame.bind_arguments(receiver, args)?;
        run_frame(env, &mut frame)
    }
}

impl JvmMethod for BytecodeMethod {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn descriptor(&self) -> &str {
        &self.descriptor
    }

    fn access_flags(&self) -> MethodAccessFlags {
        self.access_flags
    }

    fn call(&self, env: &mut Env, receiver: Option<Value>, args: Vec<Value>) -> InvokeMethodResult {
        let code = self
            .code
            .clone()
            .ok_or_else(|| VmError::MissingCode(format!("{}.{}{}", self.class_name, self.name, self.descriptor)))?;
        env.call_stack_mut().enter(
            &self.class_name,
            &self.name,
            self.source_file.as_deref(),
            Some(Arc::clone(&code)),
        )?;
        debug!(
            "{}invoke {}.{}{}",
            "\t".repeat(env.call_stack().depth() - 1),
            self.class_name,
            self.name,
            self.descriptor
        );
        let result = self.execute(env, &code, receiver, args);
        match result {
            Ok(_) => env.call_stack_mut().leave(),
            Err(_) => env.call_stack_mut().unwind(),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use crate::class_model::JvmMethod;
    use crate::java_exception::MethodCallError;
    use crate::jvm_error::VmError;
    use crate::jvm_values::Value;
    use crate::runtime_constant_pool::RuntimeConstantPool;
    use crate::runtime_method_info::BytecodeMethod;
    use crate::virtual_machine::VirtualMachine;
    use crate::vm_options::VmOptions;
    use classfile::attribute_info::AttributeInfo;
    use classfile::method_info::{MethodAccessFlags, MethodInfo};
    use classfile::opcode::Opcode;
    use std::sync::Arc;

    fn code_attribute(max_stack: u16, max_locals: u16, code: &[u8]) -> AttributeInfo {
        let mut info = Vec::new();
        info.extend_from_slice(&max_stack.to_be_bytes());
        info.extend_from_slice(&max_locals.to_be_bytes());
        info.extend_from_slice(&(code.len() as u32).to_be_bytes());
        info.extend_from_slice(code);
        info.extend_from_slice(&[0, 0, 0, 0]);
        AttributeInfo::new("Code", info)
    }

    fn method(descriptor: &str, attributes: Vec<AttributeInfo>) -> BytecodeMethod {
        let info = MethodInfo {
            access_flags: MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC,
            name: "sum".to_string(),
            descriptor: descriptor.to_string(),
            attributes,
        };
        BytecodeMethod::from("Calc", Some("Calc.java"), &info, &Arc::new(RuntimeConstantPool::default())).unwrap()
    }

    #[test]
    fn arguments_are_bound_by_width() {
        // (int, double, int) -> double: locals 0, 1-2, 3
        let code = [
            Opcode::Iload_0.code(),
            Opcode::I2d.code(),
            Opcode::Dload_1.code(),
            Opcode::Dadd.code(),
            Opcode::Iload_3.code(),
            Opcode::I2d.code(),
            Opcode::Dadd.code(),
            Opcode::Dreturn.code(),
        ];
        let sum = method("(IDI)D", vec![code_attribute(4, 4, &code)]);
        let vm = VirtualMachine::new(VmOptions::default());
        let mut env = vm.new_thread();
        let result = sum
            .call(&mut env, None, vec![Value::Int(1), Value::Double(0.5), Value::Int(2)])
            .unwrap();
        assert_eq!(Some(Value::Double(3.5)), result);
        assert_eq!(0, env.call_stack().depth());
    }

    #[test]
    fn method_without_code_cannot_run() {
        let vm = VirtualMachine::new(VmOptions::default());
        let mut env = vm.new_thread();
        let error = method("()V", Vec::new()).call(&mut env, None, Vec::new()).unwrap_err();
        assert_eq!(
            MethodCallError::InternalError(VmError::MissingCode("Calc.sum()V".to_string())),
            error
        );
    }
}
