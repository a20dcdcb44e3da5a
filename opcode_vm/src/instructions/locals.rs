use crate::env::Env;
use crate::instructions::{u16_operand, u8_operand};
use crate::java_exception::InvokeResult;
use crate::jvm_values::Value;
use crate::stack_frame::StackFrame;

macro_rules! generate_load {
    ($name:ident, $accepts:path) => {
        pub(super) fn $name(_env: &mut Env, frame: &mut StackFrame, operands: &[u8]) -> InvokeResult<()> {
            let index = u8_operand(operands)? as usize;
            Ok(frame.load_local(index, $accepts)?)
        }
    };
}

macro_rules! generate_load_n {
    ($name:ident, $index:literal, $accepts:path) => {
        pub(super) fn $name(_env: &mut Env, frame: &mut StackFrame, _operands: &[u8]) -> InvokeResult<()> {
            Ok(frame.load_local($index, $accepts)?)
        }
    };
}

macro_rules! generate_store {
    ($name:ident, $accepts:path) => {
        pub(super) fn $name(_env: &mut Env, frame: &mut StackFrame, operands: &[u8]) -> InvokeResult<()> {
            let index = u8_operand(operands)? as usize;
            Ok(frame.store_local(index, $accepts)?)
        }
    };
}

macro_rules! generate_store_n {
    ($name:ident, $index:literal, $accepts:path) => {
        pub(super) fn $name(_env: &mut Env, frame: &mut StackFrame, _operands: &[u8]) -> InvokeResult<()> {
            Ok(frame.store_local($index, $accepts)?)
        }
    };
}

generate_load!(exec_iload, Value::is_int);
generate_load!(exec_lload, Value::is_long);
generate_load!(exec_fload, Value::is_float);
generate_load!(exec_dload, Value::is_double);
generate_load!(exec_aload, Value::is_reference);

generate_load_n!(exec_iload_0, 0, Value::is_int);
generate_load_n!(exec_iload_1, 1, Value::is_int);
generate_load_n!(exec_iload_2, 2, Value::is_int);
generate_load_n!(exec_iload_3, 3, Value::is_int);
generate_load_n!(exec_lload_0, 0, Value::is_long);
generate_load_n!(exec_lload_1, 1, Value::is_long);
generate_load_n!(exec_lload_2, 2, Value::is_long);
generate_load_n!(exec_lload_3, 3, Value::is_long);
generate_load_n!(exec_fload_0, 0, Value::is_float);
generate_load_n!(exec_fload_1, 1, Value::is_float);
generate_load_n!(exec_fload_2, 2, Value::is_float);
generate_load_n!(exec_fload_3, 3, Value::is_float);
generate_load_n!(exec_dload_0, 0, Value::is_double);
generate_load_n!(exec_dload_1, 1, Value::is_double);
generate_load_n!(exec_dload_2, 2, Value::is_double);
generate_load_n!(exec_dload_3, 3, Value::is_double);
generate_load_n!(exec_aload_0, 0, Value::is_reference);
generate_load_n!(exec_aload_1, 1, Value::is_reference);
generate_load_n!(exec_aload_2, 2, Value::is_reference);
generate_load_n!(exec_aload_3, 3, Value::is_reference);

generate_store!(exec_istore, Value::is_int);
generate_store!(exec_lstore, Value::is_long);
generate_store!(exec_fstore, Value::is_float);
generate_store!(exec_dstore, Value::is_double);
generate_store!(exec_astore, Value::is_reference);

generate_store_n!(exec_istore_0, 0, Value::is_int);
generate_store_n!(exec_istore_1, 1, Value::is_int);
generate_store_n!(exec_istore_2, 2, Value::is_int);
generate_store_n!(exec_istore_3, 3, Value::is_int);
generate_store_n!(exec_lstore_0, 0, Value::is_long);
generate_store_n!(exec_lstore_1, 1, Value::is_long);
generate_store_n!(exec_lstore_2, 2, Value::is_long);
generate_store_n!(exec_lstore_3, 3, Value::is_long);
generate_store_n!(exec_fstore_0, 0, Value::is_float);
generate_store_n!(exec_fstore_1, 1, Value::is_float);
generate_store_n!(exec_fstore_2, 2, Value::is_float);
generate_store_n!(exec_fstore_3, 3, Value::is_float);
generate_store_n!(exec_dstore_0, 0, Value::is_double);
generate_store_n!(exec_dstore_1, 1, Value::is_double);
generate_store_n!(exec_dstore_2, 2, Value::is_double);
generate_store_n!(exec_dstore_3, 3, Value::is_double);
generate_store_n!(exec_astore_0, 0, Value::is_reference);
generate_store_n!(exec_astore_1, 1, Value::is_reference);
generate_store_n!(exec_astore_2, 2, Value::is_reference);
generate_store_n!(exec_astore_3, 3, Value::is_reference);

/// Adds a signed byte to an int local without touching the stack.
pub(super) fn exec_iinc(_env: &mut Env, frame: &mut StackFrame, operands: &[u8]) -> InvokeResult<()> {
    let [index, delta] = u16_operand(operands)?.to_be_bytes();
    let index = index as usize;
    let delta = delta as i8;
    let value = frame.get_local(index)?.get_int()?;
    Ok(frame.set_local(index, Value::Int(value.wrapping_add(delta as i32)))?)
}
