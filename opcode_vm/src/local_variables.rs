use crate::jvm_error::{VmError, VmExecResult};
use crate::jvm_values::{Category, Value};

#[derive(Debug, Clone)]
enum LocalValue {
    Unset,
    Entry(Value),
    // second half of a long or double
    PlaceHolder,
}

/// Local variable slots of one frame.
#[derive(Debug)]
pub struct LocalVariables {
    slots: Vec<LocalValue>,
}

impl LocalVariables {
    pub fn new(max_locals: usize) -> LocalVariables {
        LocalVariables {
            slots: vec![LocalValue::Unset; max_locals],
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> VmExecResult<Value> {
        match self.slots.get(index) {
            Some(LocalValue::Entry(value)) => Ok(value.clone()),
            Some(_) => Err(VmError::InvalidLocalSlot(index)),
            None => Err(VmError::IndexOutOfBounds),
        }
    }

    /// Stores `value` at `index`; a wide value also claims `index + 1`.
    pub fn set(&mut self, index: usize, value: Value) -> VmExecResult<()> {
        let width = value.category().slots();
        if index + width > self.slots.len() {
            return Err(VmError::IndexOutOfBounds);
        }
        self.invalidate(index);
        if width == 2 {
            self.invalidate(index + 1);
            self.slots[index + 1] = LocalValue::PlaceHolder;
        }
        self.slots[index] = LocalValue::Entry(value);
        Ok(())
    }

    /// Lays out the receiver and arguments from slot 0 on.
    pub fn bind_arguments(&mut self, receiver: Option<Value>, args: Vec<Value>) -> VmExecResult<()> {
        let mut index = 0;
        for value in receiver.into_iter().chain(args) {
            let width = value.category().slots();
            self.set(index, value)?;
            index += width;
        }
        Ok(())
    }

    // Overwriting either half of a wide value leaves the other half unusable.
    fn invalidate(&mut self, index: usize) {
        let partner = match &self.slots[index] {
            LocalValue::PlaceHolder => index.checked_sub(1),
            LocalValue::Entry(value) if value.category() == Category::Two => Some(index + 1),
            _ => None,
        };
        if let Some(slot) = partner.and_then(|partner| self.slots.get_mut(partner)) {
            *slot = LocalValue::Unset;
        }
    }
}
