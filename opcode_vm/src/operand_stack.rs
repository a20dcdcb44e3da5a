use crate::jvm_error::{VmError, VmExecResult};
use crate::jvm_values::{Category, Value};
use log::trace;

/// Operand stack of one frame. Capacity is counted in slots, so a long or
/// double uses two of the `max_stack` slots declared by the method.
#[derive(Debug)]
pub struct OperandStack {
    stack: Vec<Value>,
    slots: usize,
    max_slots: usize,
}

impl OperandStack {
    pub fn new(max_slots: usize) -> OperandStack {
        OperandStack {
            stack: Vec::with_capacity(max_slots),
            slots: 0,
            max_slots,
        }
    }

    pub fn push(&mut self, value: Value) -> VmExecResult<()> {
        let width = value.category().slots();
        if self.slots + width > self.max_slots {
            return Err(VmError::StackOverFlow);
        }
        self.slots += width;
        self.stack.push(value);
        trace!("--- value stack --- {:?}", self.stack);
        Ok(())
    }

    pub fn pop(&mut self) -> VmExecResult<Value> {
        let value = self.stack.pop().ok_or(VmError::PopFromEmptyStack)?;
        self.slots -= value.category().slots();
        trace!("--- value stack --- {:?}", self.stack);
        Ok(value)
    }

    pub fn peek(&self) -> VmExecResult<&Value> {
        self.stack.last().ok_or(VmError::PopFromEmptyStack)
    }

    /// Pops `n` values, returned bottom-to-top.
    pub fn pop_n(&mut self, n: usize) -> VmExecResult<Vec<Value>> {
        if n > self.stack.len() {
            return Err(VmError::PopFromEmptyStack);
        }
        let values = self.stack.split_off(self.stack.len() - n);
        self.slots -= values.iter().map(|v| v.category().slots()).sum::<usize>();
        trace!("--- value stack --- {:?}", self.stack);
        Ok(values)
    }

    /// Empties the stack, returning every value bottom-to-top.
    pub fn drain_all(&mut self) -> Vec<Value> {
        self.slots = 0;
        std::mem::take(&mut self.stack)
    }

    pub fn dup(&mut self) -> VmExecResult<()> {
        let top = self.peek()?.clone();
        self.push(top)
    }

    pub fn dup_x1(&mut self) -> VmExecResult<()> {
        self.ensure_narrow(2)?;
        let value1 = self.pop()?;
        let value2 = self.pop()?;
        self.push(value1.clone())?;
        self.push(value2)?;
        self.push(value1)
    }

    pub fn swap(&mut self) -> VmExecResult<()> {
        self.ensure_narrow(2)?;
        let value1 = self.pop()?;
        let value2 = self.pop()?;
        self.push(value1)?;
        self.push(value2)
    }

    /// Discards two slots: one wide value or two narrow ones.
    pub fn pop2(&mut self) -> VmExecResult<()> {
        if self.peek()?.category() == Category::Two {
            self.pop()?;
        } else {
            self.ensure_narrow(2)?;
            self.pop_n(2)?;
        }
        Ok(())
    }

    fn ensure_narrow(&self, count: usize) -> VmExecResult<()> {
        let len = self.stack.len();
        if count > len {
            return Err(VmError::PopFromEmptyStack);
        }
        if self.stack[len - count..]
            .iter()
            .all(|value| value.category() == Category::One)
        {
            Ok(())
        } else {
            Err(VmError::ValueTypeMissMatch)
        }
    }

    pub fn slot_count(&self) -> usize {
        self.slots
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}
