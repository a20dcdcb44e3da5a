use crate::jvm_error::{VmError, VmExecResult};
use crate::runtime_attribute_info::CodeAttribute;
use crate::stack_trace_element::StackTraceElement;
use std::sync::Arc;

#[derive(Debug)]
struct CallRecord {
    class_name: String,
    method_name: String,
    file_name: Option<String>,
    code: Option<Arc<CodeAttribute>>,
    pc: usize,
}

/// Invocation records of one VM thread, innermost last. Bounds recursion depth
/// and feeds stack traces.
#[derive(Debug)]
pub struct CallStack {
    records: Vec<CallRecord>,
    max_depth: usize,
    // captured by the innermost frame an error unwinds through
    unwound_trace: Option<Vec<StackTraceElement>>,
}

impl CallStack {
    pub fn new(max_depth: usize) -> CallStack {
        CallStack {
            records: Vec::new(),
            max_depth,
            unwound_trace: None,
        }
    }

    pub(crate) fn enter(
        &mut self,
        class_name: &str,
        method_name: &str,
        file_name: Option<&str>,
        code: Option<Arc<CodeAttribute>>,
    ) -> VmExecResult<()> {
        if self.records.len() >= self.max_depth {
            return Err(VmError::StackOverFlow);
        }
        self.records.push(CallRecord {
            class_name: class_name.to_string(),
            method_name: method_name.to_string(),
            file_name: file_name.map(str::to_string),
            code,
            pc: 0,
        });
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.records.pop();
    }

    /// Leaves a call that failed, keeping the trace seen from the innermost failing call.
    pub(crate) fn unwind(&mut self) {
        if self.unwound_trace.is_none() {
            self.unwound_trace = Some(self.stack_trace());
        }
        self.records.pop();
    }

    pub fn take_unwound_trace(&mut self) -> Option<Vec<StackTraceElement>> {
        self.unwound_trace.take()
    }

    pub(crate) fn set_pc(&mut self, pc: usize) {
        if let Some(record) = self.records.last_mut() {
            record.pc = pc;
        }
    }

    pub fn depth(&self) -> usize {
        self.records.len()
    }

    /// Innermost call first.
    pub fn stack_trace(&self) -> Vec<StackTraceElement> {
        self.records
            .iter()
            .rev()
            .map(|record| StackTraceElement {
                declaring_class: record.class_name.clone(),
                method_name: record.method_name.clone(),
                file_name: record.file_name.clone(),
                line_number: record.code.as_ref().and_then(|code| code.line_number(record.pc)),
            })
            .collect()
    }
}
