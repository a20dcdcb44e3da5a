use crate::java_exception::{InvokeResult, JavaException};
use crate::jvm_error::{VmError, VmExecResult};
use crate::jvm_values::{ArrayRef, ObjectRef, Value};
use crate::local_variables::LocalVariables;
use crate::operand_stack::OperandStack;
use crate::runtime_attribute_info::CodeAttribute;
use crate::runtime_constant_pool::RuntimeConstantPool;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    Active,
    /// A return opcode staged the result; the driver hands it to the caller.
    Returning,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnCell {
    pub value: Option<Value>,
    /// `"void"` or the field descriptor of the returned value.
    pub descriptor: String,
}

macro_rules! generate_pop {
    ($name:ident, $get:ident, $type:ty) => {
        pub fn $name(&mut self) -> VmExecResult<$type> {
            self.pop()?.$get()
        }
    };
}

/// Activation record of one bytecode method invocation.
#[derive(Debug)]
pub struct StackFrame {
    class_name: String,
    method_name: String,
    return_descriptor: String,
    constant_pool: Arc<RuntimeConstantPool>,
    code: Arc<[u8]>,
    /// Address of the executing opcode.
    pub(crate) pc: usize,
    /// Address of the next opcode; branches overwrite it.
    pub(crate) next_pc: usize,
    pub(crate) op_stack: OperandStack,
    pub(crate) local_variables: LocalVariables,
    state: FrameState,
    return_cell: Option<ReturnCell>,
}

impl StackFrame {
    pub fn new(
        class_name: &str,
        method_name: &str,
        return_descriptor: String,
        constant_pool: Arc<RuntimeConstantPool>,
        code: &CodeAttribute,
    ) -> StackFrame {
        StackFrame {
            class_name: class_name.to_string(),
            method_name: method_name.to_string(),
            return_descriptor,
            constant_pool,
            code: Arc::clone(&code.code),
            pc: 0,
            next_pc: 0,
            op_stack: OperandStack::new(code.max_stack as usize),
            local_variables: LocalVariables::new(code.max_locals as usize),
            state: FrameState::Active,
            return_cell: None,
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn return_descriptor(&self) -> &str {
        &self.return_descriptor
    }

    pub fn constant_pool(&self) -> &RuntimeConstantPool {
        &self.constant_pool
    }

    pub fn code(&self) -> Arc<[u8]> {
        Arc::clone(&self.code)
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn next_pc(&self) -> usize {
        self.next_pc
    }

    pub fn operand_stack(&self) -> &OperandStack {
        &self.op_stack
    }

    pub fn operand_stack_mut(&mut self) -> &mut OperandStack {
        &mut self.op_stack
    }

    pub fn local_variables(&self) -> &LocalVariables {
        &self.local_variables
    }

    pub fn push(&mut self, value: Value) -> VmExecResult<()> {
        self.op_stack.push(value)
    }

    pub fn pop(&mut self) -> VmExecResult<Value> {
        self.op_stack.pop()
    }

    generate_pop!(pop_int, get_int, i32);
    generate_pop!(pop_long, get_long, i64);
    generate_pop!(pop_float, get_float, f32);
    generate_pop!(pop_double, get_double, f64);

    /// Pops an object reference, array reference or null.
    pub fn pop_reference(&mut self) -> VmExecResult<Value> {
        match self.pop()? {
            value if value.is_reference() => Ok(value),
            _ => Err(VmError::ValueTypeMissMatch),
        }
    }

    /// Pops a non-null object reference.
    pub fn pop_object(&mut self) -> InvokeResult<ObjectRef> {
        match self.pop()? {
            Value::ObjectRef(object) => Ok(object),
            Value::Null => Err(JavaException::NullPointer(format!(
                "null object in {}.{}",
                self.class_name, self.method_name
            ))
            .into()),
            _ => Err(VmError::ValueTypeMissMatch.into()),
        }
    }

    /// Pops a non-null array reference.
    pub fn pop_array(&mut self) -> InvokeResult<ArrayRef> {
        match self.pop()? {
            Value::ArrayRef(array) => Ok(array),
            Value::Null => Err(JavaException::NullPointer(format!(
                "null array in {}.{}",
                self.class_name, self.method_name
            ))
            .into()),
            _ => Err(VmError::ValueTypeMissMatch.into()),
        }
    }

    pub fn get_local(&self, index: usize) -> VmExecResult<Value> {
        self.local_variables.get(index)
    }

    pub fn set_local(&mut self, index: usize, value: Value) -> VmExecResult<()> {
        self.local_variables.set(index, value)
    }

    pub fn bind_arguments(&mut self, receiver: Option<Value>, args: Vec<Value>) -> VmExecResult<()> {
        self.local_variables.bind_arguments(receiver, args)
    }

    /// Pushes local `index` if `accepts` approves of its tag.
    pub fn load_local(&mut self, index: usize, accepts: fn(&Value) -> bool) -> VmExecResult<()> {
        let value = self.get_local(index)?;
        if !accepts(&value) {
            return Err(VmError::ValueTypeMissMatch);
        }
        self.push(value)
    }

    /// Pops into local `index` if `accepts` approves of the popped tag.
    pub fn store_local(&mut self, index: usize, accepts: fn(&Value) -> bool) -> VmExecResult<()> {
        let value = self.pop()?;
        if !accepts(&value) {
            return Err(VmError::ValueTypeMissMatch);
        }
        self.set_local(index, value)
    }

    /// Continues at `pc + offset`.
    pub fn branch(&mut self, offset: i32) -> VmExecResult<()> {
        let target = self.pc as i64 + offset as i64;
        if target < 0 || target >= self.code.len() as i64 {
            return Err(VmError::InvalidBranchTarget(target));
        }
        self.next_pc = target as usize;
        Ok(())
    }

    pub fn set_return(&mut self, value: Option<Value>, descriptor: &str) {
        self.return_cell = Some(ReturnCell {
            value,
            descriptor: descriptor.to_string(),
        });
        self.state = FrameState::Returning;
    }

    pub fn return_cell(&self) -> Option<&ReturnCell> {
        self.return_cell.as_ref()
    }

    pub(crate) fn take_return(&mut self) -> Option<Value> {
        self.return_cell.take().and_then(|cell| cell.value)
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn is_returning(&self) -> bool {
        self.state == FrameState::Returning
    }

    /// `Class.method` for diagnostics.
    pub fn describe(&self) -> String {
        format!("{}.{}", self.class_name, self.method_name)
    }
}
