use crate::env::Env;
use crate::instructions::ROUTINES;
use crate::java_exception::InvokeResult;
use crate::jvm_error::{VmError, VmExecResult};
use crate::stack_frame::StackFrame;
use classfile::opcode::{mnemonic, Opcode};
use log::warn;
use std::sync::OnceLock;

/// Semantic routine of one opcode. `operands` holds exactly `operand_len` bytes.
pub type Routine = fn(&mut Env, &mut StackFrame, &[u8]) -> InvokeResult<()>;

#[derive(Clone, Copy)]
pub struct OpcodeRoutine {
    pub opcode: Opcode,
    pub operand_len: usize,
    pub exec: Routine,
}

impl OpcodeRoutine {
    pub const fn new(opcode: Opcode, operand_len: usize, exec: Routine) -> OpcodeRoutine {
        OpcodeRoutine {
            opcode,
            operand_len,
            exec,
        }
    }

    pub fn code(&self) -> u8 {
        self.opcode.code()
    }

    pub fn invoke(&self, env: &mut Env, frame: &mut StackFrame, operands: &[u8]) -> InvokeResult<()> {
        (self.exec)(env, frame, operands)
    }
}

impl std::fmt::Debug for OpcodeRoutine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.opcode, self.operand_len)
    }
}

/// Opcode byte to routine, built once from the closed routine set and never
/// mutated afterwards.
pub struct DispatchTable {
    routines: [Option<&'static OpcodeRoutine>; 256],
}

impl DispatchTable {
    pub fn new(routines: &'static [OpcodeRoutine]) -> DispatchTable {
        let mut table = [None; 256];
        for routine in routines {
            let slot = &mut table[routine.code() as usize];
            if slot.is_some() {
                warn!("opcode {} registered twice, keeping the last", routine.opcode);
            }
            *slot = Some(routine);
        }
        DispatchTable { routines: table }
    }

    pub fn global() -> &'static DispatchTable {
        static TABLE: OnceLock<DispatchTable> = OnceLock::new();
        TABLE.get_or_init(|| DispatchTable::new(ROUTINES))
    }

    /// The routine registered for `code`, or the fatal unimplemented-opcode error.
    pub fn resolve(&self, code: u8) -> VmExecResult<&'static OpcodeRoutine> {
        self.routines[code as usize].ok_or_else(|| VmError::UnimplementedOpcode(mnemonic(code)))
    }

    pub fn is_registered(&self, code: u8) -> bool {
        self.routines[code as usize].is_some()
    }

    pub fn registered_opcodes(&self) -> impl Iterator<Item = Opcode> + '_ {
        self.routines.iter().flatten().map(|routine| routine.opcode)
    }
}

#[cfg(test)]
mod tests {
    use crate::dispatch::DispatchTable;
    use crate::instructions::ROUTINES;
    use crate::jvm_error::VmError;
    use classfile::opcode::Opcode;
    use std::collections::HashSet;

    #[test]
    fn registered_opcodes_resolve_to_their_routine() {
        let table = DispatchTable::global();
        for routine in ROUTINES {
            let resolved = table.resolve(routine.code()).unwrap();
            assert_eq!(routine.opcode, resolved.opcode);
            assert_eq!(routine.operand_len, resolved.operand_len);
        }
        assert_eq!(ROUTINES.len(), table.registered_opcodes().count());
    }

    #[test]
    fn routine_set_has_no_duplicates() {
        let codes: HashSet<u8> = ROUTINES.iter().map(|routine| routine.code()).collect();
        assert_eq!(ROUTINES.len(), codes.len());
    }

    #[test]
    fn unregistered_opcodes_are_fatal() {
        let table = DispatchTable::global();
        assert!(!table.is_registered(Opcode::Invokedynamic.code()));
        assert_eq!(
            VmError::UnimplementedOpcode("invokedynamic".to_string()),
            table.resolve(Opcode::Invokedynamic.code()).unwrap_err()
        );
        assert_eq!(
            "The opcode monitorenter Not Impl",
            table
                .resolve(Opcode::Monitorenter.code())
                .unwrap_err()
                .to_string()
        );
        assert_eq!(
            "The opcode <unknown 0xcb> Not Impl",
            table.resolve(0xcb).unwrap_err().to_string()
        );
    }

    #[test]
    fn required_opcodes_are_present() {
        let table = DispatchTable::global();
        let required = [
            Opcode::Aload_0, Opcode::Aload_1, Opcode::Aload_2, Opcode::Aload_3,
            Opcode::Return, Opcode::Getstatic, Opcode::Invokespecial, Opcode::Ldc,
            Opcode::Invokevirtual, Opcode::Dconst_0, Opcode::Dconst_1, Opcode::Dstore_1,
            Opcode::Dload_1, Opcode::Dadd, Opcode::Iconst_0, Opcode::Iconst_1,
            Opcode::Iconst_2, Opcode::Iconst_3, Opcode::Iconst_4, Opcode::Iconst_5,
            Opcode::Istore_0, Opcode::Istore_1, Opcode::Istore_2, Opcode::Istore_3,
            Opcode::Iload_0, Opcode::Iload_1, Opcode::Iload_2, Opcode::Iload_3,
            Opcode::Iinc, Opcode::I2d, Opcode::Aaload, Opcode::New, Opcode::Dup,
            Opcode::Putstatic, Opcode::Putfield, Opcode::Getfield,
        ];
        for opcode in required {
            assert!(table.is_registered(opcode.code()), "{opcode}");
        }
    }
}
