use crate::dispatch::OpcodeRoutine;
use crate::jvm_error::{VmError, VmExecResult};
use classfile::opcode::Opcode;

mod arrays;
mod constants;
mod control;
mod invoke;
mod locals;
mod math;
mod objects;
mod stack;

/// Every opcode the interpreter executes, with its operand length.
pub(crate) static ROUTINES: &[OpcodeRoutine] = &[
    // constants
    OpcodeRoutine::new(Opcode::Nop, 0, constants::exec_nop),
    OpcodeRoutine::new(Opcode::Aconst_null, 0, constants::exec_aconst_null),
    OpcodeRoutine::new(Opcode::Iconst_m1, 0, constants::exec_iconst_m1),
    OpcodeRoutine::new(Opcode::Iconst_0, 0, constants::exec_iconst_0),
    OpcodeRoutine::new(Opcode::Iconst_1, 0, constants::exec_iconst_1),
    OpcodeRoutine::new(Opcode::Iconst_2, 0, constants::exec_iconst_2),
    OpcodeRoutine::new(Opcode::Iconst_3, 0, constants::exec_iconst_3),
    OpcodeRoutine::new(Opcode::Iconst_4, 0, constants::exec_iconst_4),
    OpcodeRoutine::new(Opcode::Iconst_5, 0, constants::exec_iconst_5),
    OpcodeRoutine::new(Opcode::Lconst_0, 0, constants::exec_lconst_0),
    OpcodeRoutine::new(Opcode::Lconst_1, 0, constants::exec_lconst_1),
    OpcodeRoutine::new(Opcode::Fconst_0, 0, constants::exec_fconst_0),
    OpcodeRoutine::new(Opcode::Fconst_1, 0, constants::exec_fconst_1),
    OpcodeRoutine::new(Opcode::Fconst_2, 0, constants::exec_fconst_2),
    OpcodeRoutine::new(Opcode::Dconst_0, 0, constants::exec_dconst_0),
    OpcodeRoutine::new(Opcode::Dconst_1, 0, constants::exec_dconst_1),
    OpcodeRoutine::new(Opcode::Bipush, 1, constants::exec_bipush),
    OpcodeRoutine::new(Opcode::Sipush, 2, constants::exec_sipush),
    OpcodeRoutine::new(Opcode::Ldc, 1, constants::exec_ldc),
    OpcodeRoutine::new(Opcode::Ldc_w, 2, constants::exec_ldc_w),
    OpcodeRoutine::new(Opcode::Ldc2_w, 2, constants::exec_ldc2_w),
    // locals
    OpcodeRoutine::new(Opcode::Iload, 1, locals::exec_iload),
    OpcodeRoutine::new(Opcode::Lload, 1, locals::exec_lload),
    OpcodeRoutine::new(Opcode::Fload, 1, locals::exec_fload),
    OpcodeRoutine::new(Opcode::Dload, 1, locals::exec_dload),
    OpcodeRoutine::new(Opcode::Aload, 1, locals::exec_aload),
    OpcodeRoutine::new(Opcode::Iload_0, 0, locals::exec_iload_0),
    OpcodeRoutine::new(Opcode::Iload_1, 0, locals::exec_iload_1),
    OpcodeRoutine::new(Opcode::Iload_2, 0, locals::exec_iload_2),
    OpcodeRoutine::new(Opcode::Iload_3, 0, locals::exec_iload_3),
    OpcodeRoutine::new(Opcode::Lload_0, 0, locals::exec_lload_0),
    OpcodeRoutine::new(Opcode::Lload_1, 0, locals::exec_lload_1),
    OpcodeRoutine::new(Opcode::Lload_2, 0, locals::exec_lload_2),
    OpcodeRoutine::new(Opcode::Lload_3, 0, locals::exec_lload_3),
    OpcodeRoutine::new(Opcode::Fload_0, 0, locals::exec_fload_0),
    OpcodeRoutine::new(Opcode::Fload_1, 0, locals::exec_fload_1),
    OpcodeRoutine::new(Opcode::Fload_2, 0, locals::exec_fload_2),
    OpcodeRoutine::new(Opcode::Fload_3, 0, locals::exec_fload_3),
    OpcodeRoutine::new(Opcode::Dload_0, 0, locals::exec_dload_0),
    OpcodeRoutine::new(Opcode::Dload_1, 0, locals::exec_dload_1),
    OpcodeRoutine::new(Opcode::Dload_2, 0, locals::exec_dload_2),
    OpcodeRoutine::new(Opcode::Dload_3, 0, locals::exec_dload_3),
    OpcodeRoutine::new(Opcode::Aload_0, 0, locals::exec_aload_0),
    OpcodeRoutine::new(Opcode::Aload_1, 0, locals::exec_aload_1),
    OpcodeRoutine::new(Opcode::Aload_2, 0, locals::exec_aload_2),
    OpcodeRoutine::new(Opcode::Aload_3, 0, locals::exec_aload_3),
    OpcodeRoutine::new(Opcode::Istore, 1, locals::exec_istore),
    OpcodeRoutine::new(Opcode::Lstore, 1, locals::exec_lstore),
    OpcodeRoutine::new(Opcode::Fstore, 1, locals::exec_fstore),
    OpcodeRoutine::new(Opcode::Dstore, 1, locals::exec_dstore),
    OpcodeRoutine::new(Opcode::Astore, 1, locals::exec_astore),
    OpcodeRoutine::new(Opcode::Istore_0, 0, locals::exec_istore_0),
    OpcodeRoutine::new(Opcode::Istore_1, 0, locals::exec_istore_1),
    OpcodeRoutine::new(Opcode::Istore_2, 0, locals::exec_istore_2),
    OpcodeRoutine::new(Opcode::Istore_3, 0, locals::exec_istore_3),
    OpcodeRoutine::new(Opcode::Lstore_0, 0, locals::exec_lstore_0),
    OpcodeRoutine::new(Opcode::Lstore_1, 0, locals::exec_lstore_1),
    OpcodeRoutine::new(Opcode::Lstore_2, 0, locals::exec_lstore_2),
    OpcodeRoutine::new(Opcode::Lstore_3, 0, locals::exec_lstore_3),
    OpcodeRoutine::new(Opcode::Fstore_0, 0, locals::exec_fstore_0),
    OpcodeRoutine::new(Opcode::Fstore_1, 0, locals::exec_fstore_1),
    OpcodeRoutine::new(Opcode::Fstore_2, 0, locals::exec_fstore_2),
    OpcodeRoutine::new(Opcode::Fstore_3, 0, locals::exec_fstore_3),
    OpcodeRoutine::new(Opcode::Dstore_0, 0, locals::exec_dstore_0),
    OpcodeRoutine::new(Opcode::Dstore_1, 0, locals::exec_dstore_1),
    OpcodeRoutine::new(Opcode::Dstore_2, 0, locals::exec_dstore_2),
    OpcodeRoutine::new(Opcode::Dstore_3, 0, locals::exec_dstore_3),
    OpcodeRoutine::new(Opcode::Astore_0, 0, locals::exec_astore_0),
    OpcodeRoutine::new(Opcode::Astore_1, 0, locals::exec_astore_1),
    OpcodeRoutine::new(Opcode::Astore_2, 0, locals::exec_astore_2),
    OpcodeRoutine::new(Opcode::Astore_3, 0, locals::exec_astore_3),
    OpcodeRoutine::new(Opcode::Iinc, 2, locals::exec_iinc),
    // arrays
    OpcodeRoutine::new(Opcode::Iaload, 0, arrays::exec_iaload),
    OpcodeRoutine::new(Opcode::Laload, 0, arrays::exec_laload),
    OpcodeRoutine::new(Opcode::Faload, 0, arrays::exec_faload),
    OpcodeRoutine::new(Opcode::Daload, 0, arrays::exec_daload),
    OpcodeRoutine::new(Opcode::Aaload, 0, arrays::exec_aaload),
    OpcodeRoutine::new(Opcode::Baload, 0, arrays::exec_baload),
    OpcodeRoutine::new(Opcode::Caload, 0, arrays::exec_caload),
    OpcodeRoutine::new(Opcode::Saload, 0, arrays::exec_saload),
    OpcodeRoutine::new(Opcode::Iastore, 0, arrays::exec_iastore),
    OpcodeRoutine::new(Opcode::Lastore, 0, arrays::exec_lastore),
    OpcodeRoutine::new(Opcode::Fastore, 0, arrays::exec_fastore),
    OpcodeRoutine::new(Opcode::Dastore, 0, arrays::exec_dastore),
    OpcodeRoutine::new(Opcode::Aastore, 0, arrays::exec_aastore),
    OpcodeRoutine::new(Opcode::Bastore, 0, arrays::exec_bastore),
    OpcodeRoutine::new(Opcode::Castore, 0, arrays::exec_castore),
    OpcodeRoutine::new(Opcode::Sastore, 0, arrays::exec_sastore),
    OpcodeRoutine::new(Opcode::Newarray, 1, arrays::exec_newarray),
    OpcodeRoutine::new(Opcode::Anewarray, 2, arrays::exec_anewarray),
    OpcodeRoutine::new(Opcode::Arraylength, 0, arrays::exec_arraylength),
    // stack
    OpcodeRoutine::new(Opcode::Pop, 0, stack::exec_pop),
    OpcodeRoutine::new(Opcode::Pop2, 0, stack::exec_pop2),
    OpcodeRoutine::new(Opcode::Dup, 0, stack::exec_dup),
    OpcodeRoutine::new(Opcode::Dup_x1, 0, stack::exec_dup_x1),
    OpcodeRoutine::new(Opcode::Swap, 0, stack::exec_swap),
    // math
    OpcodeRoutine::new(Opcode::Iadd, 0, math::exec_iadd),
    OpcodeRoutine::new(Opcode::Ladd, 0, math::exec_ladd),
    OpcodeRoutine::new(Opcode::Fadd, 0, math::exec_fadd),
    OpcodeRoutine::new(Opcode::Dadd, 0, math::exec_dadd),
    OpcodeRoutine::new(Opcode::Isub, 0, math::exec_isub),
    OpcodeRoutine::new(Opcode::Lsub, 0, math::exec_lsub),
    OpcodeRoutine::new(Opcode::Fsub, 0, math::exec_fsub),
    OpcodeRoutine::new(Opcode::Dsub, 0, math::exec_dsub),
    OpcodeRoutine::new(Opcode::Imul, 0, math::exec_imul),
    OpcodeRoutine::new(Opcode::Lmul, 0, math::exec_lmul),
    OpcodeRoutine::new(Opcode::Fmul, 0, math::exec_fmul),
    OpcodeRoutine::new(Opcode::Dmul, 0, math::exec_dmul),
    OpcodeRoutine::new(Opcode::Idiv, 0, math::exec_idiv),
    OpcodeRoutine::new(Opcode::Ldiv, 0, math::exec_ldiv),
    OpcodeRoutine::new(Opcode::Fdiv, 0, math::exec_fdiv),
    OpcodeRoutine::new(Opcode::Ddiv, 0, math::exec_ddiv),
    OpcodeRoutine::new(Opcode::Irem, 0, math::exec_irem),
    OpcodeRoutine::new(Opcode::Lrem, 0, math::exec_lrem),
    OpcodeRoutine::new(Opcode::Frem, 0, math::exec_frem),
    OpcodeRoutine::new(Opcode::Drem, 0, math::exec_drem),
    OpcodeRoutine::new(Opcode::Ineg, 0, math::exec_ineg),
    OpcodeRoutine::new(Opcode::Lneg, 0, math::exec_lneg),
    OpcodeRoutine::new(Opcode::Fneg, 0, math::exec_fneg),
    OpcodeRoutine::new(Opcode::Dneg, 0, math::exec_dneg),
    OpcodeRoutine::new(Opcode::Ishl, 0, math::exec_ishl),
    OpcodeRoutine::new(Opcode::Lshl, 0, math::exec_lshl),
    OpcodeRoutine::new(Opcode::Ishr, 0, math::exec_ishr),
    OpcodeRoutine::new(Opcode::Lshr, 0, math::exec_lshr),
    OpcodeRoutine::new(Opcode::Iushr, 0, math::exec_iushr),
    OpcodeRoutine::new(Opcode::Lushr, 0, math::exec_lushr),
    OpcodeRoutine::new(Opcode::Iand, 0, math::exec_iand),
    OpcodeRoutine::new(Opcode::Land, 0, math::exec_land),
    OpcodeRoutine::new(Opcode::Ior, 0, math::exec_ior),
    OpcodeRoutine::new(Opcode::Lor, 0, math::exec_lor),
    OpcodeRoutine::new(Opcode::Ixor, 0, math::exec_ixor),
    OpcodeRoutine::new(Opcode::Lxor, 0, math::exec_lxor),
    OpcodeRoutine::new(Opcode::I2l, 0, math::exec_i2l),
    OpcodeRoutine::new(Opcode::I2f, 0, math::exec_i2f),
    OpcodeRoutine::new(Opcode::I2d, 0, math::exec_i2d),
    OpcodeRoutine::new(Opcode::L2i, 0, math::exec_l2i),
    OpcodeRoutine::new(Opcode::L2f, 0, math::exec_l2f),
    OpcodeRoutine::new(Opcode::L2d, 0, math::exec_l2d),
    OpcodeRoutine::new(Opcode::F2i, 0, math::exec_f2i),
    OpcodeRoutine::new(Opcode::F2l, 0, math::exec_f2l),
    OpcodeRoutine::new(Opcode::F2d, 0, math::exec_f2d),
    OpcodeRoutine::new(Opcode::D2i, 0, math::exec_d2i),
    OpcodeRoutine::new(Opcode::D2l, 0, math::exec_d2l),
    OpcodeRoutine::new(Opcode::D2f, 0, math::exec_d2f),
    OpcodeRoutine::new(Opcode::I2b, 0, math::exec_i2b),
    OpcodeRoutine::new(Opcode::I2c, 0, math::exec_i2c),
    OpcodeRoutine::new(Opcode::I2s, 0, math::exec_i2s),
    OpcodeRoutine::new(Opcode::Lcmp, 0, math::exec_lcmp),
    OpcodeRoutine::new(Opcode::Fcmpl, 0, math::exec_fcmpl),
    OpcodeRoutine::new(Opcode::Fcmpg, 0, math::exec_fcmpg),
    OpcodeRoutine::new(Opcode::Dcmpl, 0, math::exec_dcmpl),
    OpcodeRoutine::new(Opcode::Dcmpg, 0, math::exec_dcmpg),
    // control
    OpcodeRoutine::new(Opcode::Ifeq, 2, control::exec_ifeq),
    OpcodeRoutine::new(Opcode::Ifne, 2, control::exec_ifne),
    OpcodeRoutine::new(Opcode::Iflt, 2, control::exec_iflt),
    OpcodeRoutine::new(Opcode::Ifge, 2, control::exec_ifge),
    OpcodeRoutine::new(Opcode::Ifgt, 2, control::exec_ifgt),
    OpcodeRoutine::new(Opcode::Ifle, 2, control::exec_ifle),
    OpcodeRoutine::new(Opcode::If_icmpeq, 2, control::exec_if_icmpeq),
    OpcodeRoutine::new(Opcode::If_icmpne, 2, control::exec_if_icmpne),
    OpcodeRoutine::new(Opcode::If_icmplt, 2, control::exec_if_icmplt),
    OpcodeRoutine::new(Opcode::If_icmpge, 2, control::exec_if_icmpge),
    OpcodeRoutine::new(Opcode::If_icmpgt, 2, control::exec_if_icmpgt),
    OpcodeRoutine::new(Opcode::If_icmple, 2, control::exec_if_icmple),
    OpcodeRoutine::new(Opcode::If_acmpeq, 2, control::exec_if_acmpeq),
    OpcodeRoutine::new(Opcode::If_acmpne, 2, control::exec_if_acmpne),
    OpcodeRoutine::new(Opcode::Ifnull, 2, control::exec_ifnull),
    OpcodeRoutine::new(Opcode::Ifnonnull, 2, control::exec_ifnonnull),
    OpcodeRoutine::new(Opcode::Goto, 2, control::exec_goto),
    OpcodeRoutine::new(Opcode::Goto_w, 4, control::exec_goto_w),
    OpcodeRoutine::new(Opcode::Ireturn, 0, control::exec_ireturn),
    OpcodeRoutine::new(Opcode::Lreturn, 0, control::exec_lreturn),
    OpcodeRoutine::new(Opcode::Freturn, 0, control::exec_freturn),
    OpcodeRoutine::new(Opcode::Dreturn, 0, control::exec_dreturn),
    OpcodeRoutine::new(Opcode::Areturn, 0, control::exec_areturn),
    OpcodeRoutine::new(Opcode::Return, 0, control::exec_return),
    // objects
    OpcodeRoutine::new(Opcode::Getstatic, 2, objects::exec_getstatic),
    OpcodeRoutine::new(Opcode::Putstatic, 2, objects::exec_putstatic),
    OpcodeRoutine::new(Opcode::Getfield, 2, objects::exec_getfield),
    OpcodeRoutine::new(Opcode::Putfield, 2, objects::exec_putfield),
    OpcodeRoutine::new(Opcode::New, 2, objects::exec_new),
    // invoke
    OpcodeRoutine::new(Opcode::Invokevirtual, 2, invoke::exec_invokevirtual),
    OpcodeRoutine::new(Opcode::Invokespecial, 2, invoke::exec_invokespecial),
    OpcodeRoutine::new(Opcode::Invokestatic, 2, invoke::exec_invokestatic),
    OpcodeRoutine::new(Opcode::Invokeinterface, 4, invoke::exec_invokeinterface),
];

fn operand(operands: &[u8], index: usize) -> VmExecResult<u8> {
    operands.get(index).copied().ok_or(VmError::IndexOutOfBounds)
}

pub(crate) fn u8_operand(operands: &[u8]) -> VmExecResult<u8> {
    operand(operands, 0)
}

/// Big-endian `(operands[0] << 8) | operands[1]`.
pub(crate) fn u16_operand(operands: &[u8]) -> VmExecResult<u16> {
    Ok(u16::from_be_bytes([operand(operands, 0)?, operand(operands, 1)?]))
}

pub(crate) fn i16_operand(operands: &[u8]) -> VmExecResult<i16> {
    u16_operand(operands).map(|value| value as i16)
}

pub(crate) fn i32_operand(operands: &[u8]) -> VmExecResult<i32> {
    Ok(i32::from_be_bytes([
        operand(operands, 0)?,
        operand(operands, 1)?,
        operand(operands, 2)?,
        operand(operands, 3)?,
    ]))
}
