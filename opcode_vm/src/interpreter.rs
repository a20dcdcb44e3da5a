use crate::env::Env;
use crate::java_exception::InvokeMethodResult;
use crate::jvm_error::VmError;
use crate::stack_frame::StackFrame;
use classfile::opcode::mnemonic;
use log::{log_enabled, trace, Level};

/// Fetches, decodes and executes the frame's opcodes until a return opcode
/// stages a value. Any error leaves the frame where it stopped.
pub fn run_frame(env: &mut Env, frame: &mut StackFrame) -> InvokeMethodResult {
    let code = frame.code();
    loop {
        let pc = frame.next_pc;
        let op = *code
            .get(pc)
            .ok_or_else(|| VmError::FellOffCode(frame.describe()))?;
        let routine = env.dispatch_table().resolve(op)?;
        let operands = code
            .get(pc + 1..pc + 1 + routine.operand_len)
            .ok_or_else(|| VmError::TruncatedCode(mnemonic(op)))?;
        frame.pc = pc;
        frame.next_pc = pc + 1 + routine.operand_len;
        env.call_stack_mut().set_pc(pc);
        if log_enabled!(Level::Trace) {
            let depth = env.call_stack().depth();
            trace!(
                "{}{} #{} {} {:?}",
                "\t".repeat(depth.saturating_sub(1)),
                frame.describe(),
                pc,
                routine.opcode,
                operands
            );
        }
        routine.invoke(env, frame, operands)?;
        if frame.is_returning() {
            return Ok(frame.take_return());
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::env::Env;
    use crate::interpreter::run_frame;
    use crate::java_exception::MethodCallError;
    use crate::jvm_error::VmError;
    use crate::jvm_values::Value;
    use crate::runtime_attribute_info::CodeAttribute;
    use crate::runtime_constant_pool::RuntimeConstantPool;
    use crate::stack_frame::StackFrame;
    use crate::virtual_machine::VirtualMachine;
    use crate::vm_options::VmOptions;
    use classfile::opcode::Opcode;
    use std::sync::Arc;

    fn run(code: Vec<u8>, max_stack: u16, max_locals: u16) -> (StackFrame, Result<Option<Value>, MethodCallError>) {
        let vm = VirtualMachine::new(VmOptions::default());
        let mut env = vm.new_thread();
        let code = CodeAttribute::new(max_stack, max_locals, code);
        let mut frame = StackFrame::new(
            "Test",
            "run",
            "I".to_string(),
            Arc::new(RuntimeConstantPool::default()),
            &code,
        );
        let result = run_frame(&mut env, &mut frame);
        (frame, result)
    }

    fn op(opcode: Opcode) -> u8 {
        opcode.code()
    }

    #[test]
    fn every_iconst_pushes_its_int() {
        let constants = [
            (Opcode::Iconst_0, 0),
            (Opcode::Iconst_1, 1),
            (Opcode::Iconst_2, 2),
            (Opcode::Iconst_3, 3),
            (Opcode::Iconst_4, 4),
            (Opcode::Iconst_5, 5),
        ];
        for (opcode, expected) in constants {
            let (frame, result) = run(vec![op(opcode), op(Opcode::Ireturn)], 1, 0);
            assert_eq!(Some(Value::Int(expected)), result.unwrap());
            assert_eq!(0, frame.operand_stack().slot_count());
        }
    }

    #[test]
    fn int_arithmetic_and_branches() {
        // i = 0; sum = 0; while (i < 5) { sum += i; i++ } return sum
        let code = vec![
            op(Opcode::Iconst_0),
            op(Opcode::Istore_0),
            op(Opcode::Iconst_0),
            op(Opcode::Istore_1),
            op(Opcode::Iload_0), // 4
            op(Opcode::Iconst_5),
            op(Opcode::If_icmpge), 0x00, 0x0d,
            op(Opcode::Iload_1),
            op(Opcode::Iload_0),
            op(Opcode::Iadd),
            op(Opcode::Istore_1),
            op(Opcode::Iinc), 0x00, 0x01,
            op(Opcode::Goto), 0xff, 0xf4,
            op(Opcode::Iload_1), // 19
            op(Opcode::Ireturn),
        ];
        let (_, result) = run(code, 2, 2);
        assert_eq!(Some(Value::Int(10)), result.unwrap());
    }

    #[test]
    fn division_by_zero_is_recoverable() {
        let code = vec![op(Opcode::Iconst_1), op(Opcode::Iconst_0), op(Opcode::Idiv), op(Opcode::Ireturn)];
        let error = run(code, 2, 0).1.unwrap_err();
        assert!(!error.is_fatal());
        assert_eq!("exception java/lang/ArithmeticException: / by zero", error.to_string());
    }

    #[test]
    fn unimplemented_opcode_is_fatal() {
        let code = vec![op(Opcode::Iconst_1), op(Opcode::Monitorenter), op(Opcode::Ireturn)];
        let (frame, result) = run(code, 1, 0);
        assert_eq!(
            MethodCallError::InternalError(VmError::UnimplementedOpcode("monitorenter".to_string())),
            result.unwrap_err()
        );
        assert_eq!(1, frame.operand_stack().depth());
    }

    #[test]
    fn running_off_the_end_or_truncated_operands() {
        let (_, result) = run(vec![op(Opcode::Iconst_1)], 1, 0);
        assert_eq!(
            MethodCallError::InternalError(VmError::FellOffCode("Test.run".to_string())),
            result.unwrap_err()
        );
        let (_, result) = run(vec![op(Opcode::Sipush), 0x01], 1, 0);
        assert_eq!(
            MethodCallError::InternalError(VmError::TruncatedCode("sipush".to_string())),
            result.unwrap_err()
        );
    }

    #[test]
    fn dconst_dadd_keeps_width_two() {
        let code = vec![op(Opcode::Dconst_0), op(Opcode::Dconst_1), op(Opcode::Dadd), op(Opcode::Return)];
        let (frame, result) = run(code, 4, 0);
        assert_eq!(None, result.unwrap());
        assert_eq!(1, frame.operand_stack().depth());
        assert_eq!(2, frame.operand_stack().slot_count());
        assert_eq!(&Value::Double(1.0), frame.operand_stack().peek().unwrap());

        let code = vec![op(Opcode::Dconst_0), op(Opcode::Dconst_1), op(Opcode::Dadd), op(Opcode::Dreturn)];
        let (_, result) = run(code, 4, 0);
        assert_eq!(Some(Value::Double(1.0)), result.unwrap());
    }

    #[test]
    fn float_compare_nan_bias() {
        let nan_code = |cmp: Opcode| {
            vec![
                op(Opcode::Dconst_0),
                op(Opcode::Dconst_0),
                op(Opcode::Ddiv),
                op(Opcode::Dconst_1),
                op(cmp),
                op(Opcode::Ireturn),
            ]
        };
        assert_eq!(Some(Value::Int(-1)), run(nan_code(Opcode::Dcmpl), 4, 0).1.unwrap());
        assert_eq!(Some(Value::Int(1)), run(nan_code(Opcode::Dcmpg), 4, 0).1.unwrap());
    }
}
