use crate::env::Env;
use crate::java_exception::{InvokeResult, JavaException};
use crate::jvm_values::Value;
use crate::stack_frame::StackFrame;
use std::cmp::Ordering;

// value2 is popped first and is the right-hand operand
macro_rules! generate_math {
    ($name:ident, $pop:ident, $variant:ident, $op:expr) => {
        pub(super) fn $name(_env: &mut Env, frame: &mut StackFrame, _operands: &[u8]) -> InvokeResult<()> {
            let value2 = frame.$pop()?;
            let value1 = frame.$pop()?;
            Ok(frame.push(Value::$variant($op(value1, value2)))?)
        }
    };
}

macro_rules! generate_checked_division {
    ($name:ident, $pop:ident, $variant:ident, $op:ident) => {
        pub(super) fn $name(_env: &mut Env, frame: &mut StackFrame, _operands: &[u8]) -> InvokeResult<()> {
            let value2 = frame.$pop()?;
            let value1 = frame.$pop()?;
            if value2 == 0 {
                return Err(JavaException::Arithmetic("/ by zero".to_string()).into());
            }
            Ok(frame.push(Value::$variant(value1.$op(value2)))?)
        }
    };
}

macro_rules! generate_neg {
    ($name:ident, $pop:ident, $variant:ident, $op:expr) => {
        pub(super) fn $name(_env: &mut Env, frame: &mut StackFrame, _operands: &[u8]) -> InvokeResult<()> {
            let value = frame.$pop()?;
            Ok(frame.push(Value::$variant($op(value)))?)
        }
    };
}

// shift distance is always an int
macro_rules! generate_shift {
    ($name:ident, $pop:ident, $variant:ident, $op:expr) => {
        pub(super) fn $name(_env: &mut Env, frame: &mut StackFrame, _operands: &[u8]) -> InvokeResult<()> {
            let distance = frame.pop_int()?;
            let value = frame.$pop()?;
            Ok(frame.push(Value::$variant($op(value, distance as u32)))?)
        }
    };
}

macro_rules! generate_convert {
    ($name:ident, $pop:ident, $target:ident, $convert:expr) => {
        pub(super) fn $name(_env: &mut Env, frame: &mut StackFrame, _operands: &[u8]) -> InvokeResult<()> {
            let value = frame.$pop()?;
            Ok(frame.push(Value::$target($convert(value)))?)
        }
    };
}

macro_rules! generate_cmp {
    ($name:ident, $pop:ident, $nan:expr) => {
        pub(super) fn $name(_env: &mut Env, frame: &mut StackFrame, _operands: &[u8]) -> InvokeResult<()> {
            let value2 = frame.$pop()?;
            let value1 = frame.$pop()?;
            let result = value1
                .partial_cmp(&value2)
                .map_or($nan, |ordering: Ordering| ordering as i32);
            Ok(frame.push(Value::Int(result))?)
        }
    };
}

generate_math!(exec_iadd, pop_int, Int, i32::wrapping_add);
generate_math!(exec_ladd, pop_long, Long, i64::wrapping_add);
generate_math!(exec_fadd, pop_float, Float, |a: f32, b: f32| a + b);
generate_math!(exec_dadd, pop_double, Double, |a: f64, b: f64| a + b);
generate_math!(exec_isub, pop_int, Int, i32::wrapping_sub);
generate_math!(exec_lsub, pop_long, Long, i64::wrapping_sub);
generate_math!(exec_fsub, pop_float, Float, |a: f32, b: f32| a - b);
generate_math!(exec_dsub, pop_double, Double, |a: f64, b: f64| a - b);
generate_math!(exec_imul, pop_int, Int, i32::wrapping_mul);
generate_math!(exec_lmul, pop_long, Long, i64::wrapping_mul);
generate_math!(exec_fmul, pop_float, Float, |a: f32, b: f32| a * b);
generate_math!(exec_dmul, pop_double, Double, |a: f64, b: f64| a * b);
generate_checked_division!(exec_idiv, pop_int, Int, wrapping_div);
generate_checked_division!(exec_ldiv, pop_long, Long, wrapping_div);
generate_math!(exec_fdiv, pop_float, Float, |a: f32, b: f32| a / b);
generate_math!(exec_ddiv, pop_double, Double, |a: f64, b: f64| a / b);
generate_checked_division!(exec_irem, pop_int, Int, wrapping_rem);
generate_checked_division!(exec_lrem, pop_long, Long, wrapping_rem);
generate_math!(exec_frem, pop_float, Float, |a: f32, b: f32| a % b);
generate_math!(exec_drem, pop_double, Double, |a: f64, b: f64| a % b);
generate_neg!(exec_ineg, pop_int, Int, i32::wrapping_neg);
generate_neg!(exec_lneg, pop_long, Long, i64::wrapping_neg);
generate_neg!(exec_fneg, pop_float, Float, |a: f32| -a);
generate_neg!(exec_dneg, pop_double, Double, |a: f64| -a);

generate_shift!(exec_ishl, pop_int, Int, i32::wrapping_shl);
generate_shift!(exec_lshl, pop_long, Long, i64::wrapping_shl);
generate_shift!(exec_ishr, pop_int, Int, i32::wrapping_shr);
generate_shift!(exec_lshr, pop_long, Long, i64::wrapping_shr);
generate_shift!(exec_iushr, pop_int, Int, |a: i32, s: u32| (a as u32).wrapping_shr(s) as i32);
generate_shift!(exec_lushr, pop_long, Long, |a: i64, s: u32| (a as u64).wrapping_shr(s) as i64);
generate_math!(exec_iand, pop_int, Int, |a: i32, b: i32| a & b);
generate_math!(exec_land, pop_long, Long, |a: i64, b: i64| a & b);
generate_math!(exec_ior, pop_int, Int, |a: i32, b: i32| a | b);
generate_math!(exec_lor, pop_long, Long, |a: i64, b: i64| a | b);
generate_math!(exec_ixor, pop_int, Int, |a: i32, b: i32| a ^ b);
generate_math!(exec_lxor, pop_long, Long, |a: i64, b: i64| a ^ b);

// float to integer conversions saturate and map NaN to zero, as `as` does
generate_convert!(exec_i2l, pop_int, Long, |v: i32| v as i64);
generate_convert!(exec_i2f, pop_int, Float, |v: i32| v as f32);
generate_convert!(exec_i2d, pop_int, Double, |v: i32| v as f64);
generate_convert!(exec_l2i, pop_long, Int, |v: i64| v as i32);
generate_convert!(exec_l2f, pop_long, Float, |v: i64| v as f32);
generate_convert!(exec_l2d, pop_long, Double, |v: i64| v as f64);
generate_convert!(exec_f2i, pop_float, Int, |v: f32| v as i32);
generate_convert!(exec_f2l, pop_float, Long, |v: f32| v as i64);
generate_convert!(exec_f2d, pop_float, Double, |v: f32| v as f64);
generate_convert!(exec_d2i, pop_double, Int, |v: f64| v as i32);
generate_convert!(exec_d2l, pop_double, Long, |v: f64| v as i64);
generate_convert!(exec_d2f, pop_double, Float, |v: f64| v as f32);
generate_convert!(exec_i2b, pop_int, Int, |v: i32| v as i8 as i32);
generate_convert!(exec_i2c, pop_int, Int, |v: i32| v as u16 as i32);
generate_convert!(exec_i2s, pop_int, Int, |v: i32| v as i16 as i32);

generate_cmp!(exec_lcmp, pop_long, 0);
generate_cmp!(exec_fcmpl, pop_float, -1);
generate_cmp!(exec_fcmpg, pop_float, 1);
generate_cmp!(exec_dcmpl, pop_double, -1);
generate_cmp!(exec_dcmpg, pop_double, 1);
