use crate::call_stack::CallStack;
use crate::class_model::{ClassRef, MethodRef};
use crate::dispatch::DispatchTable;
use crate::java_exception::{InvokeMethodResult, InvokeResult, MethodCallError};
use crate::jvm_values::{ArrayElement, JvmArray, ObjectRef, Value};
use crate::virtual_machine::VirtualMachine;
use crate::vm_options::VmOptions;
use classfile::method_info::MethodAccessFlags;
use log::{error, warn};
use std::sync::Arc;

/// Execution context of one VM thread. Frames and the call stack are owned
/// here; everything reachable through `vm` is shared.
pub struct Env {
    vm: Arc<VirtualMachine>,
    call_stack: CallStack,
}

impl Env {
    pub fn new(vm: Arc<VirtualMachine>) -> Env {
        let call_stack = CallStack::new(vm.options().max_call_depth);
        Env { vm, call_stack }
    }

    pub fn vm(&self) -> &Arc<VirtualMachine> {
        &self.vm
    }

    pub fn options(&self) -> &VmOptions {
        self.vm.options()
    }

    pub fn dispatch_table(&self) -> &'static DispatchTable {
        self.vm.dispatch_table()
    }

    pub fn call_stack(&self) -> &CallStack {
        &self.call_stack
    }

    pub(crate) fn call_stack_mut(&mut self) -> &mut CallStack {
        &mut self.call_stack
    }

    /// Loads, links and initialises `name` on first use.
    pub fn find_class(&mut self, name: &str) -> InvokeResult<ClassRef> {
        let vm = Arc::clone(&self.vm);
        vm.find_class(self, name)
    }

    pub fn intern_string(&self, value: &str) -> InvokeResult<ObjectRef> {
        self.vm.intern_string(value)
    }

    /// Calls `method`. An error escaping the outermost call is logged with the
    /// thread's stack trace before it is returned.
    pub fn invoke(&mut self, method: &MethodRef, receiver: Option<Value>, args: Vec<Value>) -> InvokeMethodResult {
        let trace = self.call_stack.depth() == 0;
        let result = method.call(self, receiver, args);
        if trace {
            if let Err(e) = &result {
                self.report(method, e);
            }
        }
        result
    }

    fn report(&mut self, method: &MethodRef, e: &MethodCallError) {
        let entry = format!("{}.{}{}", method.class_name(), method.name(), method.descriptor());
        let trace = self
            .call_stack
            .take_unwound_trace()
            .unwrap_or_default()
            .iter()
            .map(|element| format!("\n{element}"))
            .collect::<String>();
        if e.is_fatal() {
            error!("thread aborted in {entry}: {e}{trace}");
        } else {
            warn!("uncaught {e} from {entry}{trace}");
        }
    }

    pub fn invoke_static(
        &mut self,
        class_name: &str,
        name: &str,
        descriptor: &str,
        args: Vec<Value>,
    ) -> InvokeMethodResult {
        let class = self.find_class(class_name)?;
        let method = class.get_method(name, descriptor, MethodAccessFlags::STATIC)?;
        self.invoke(&method, None, args)
    }

    /// Runs `public static void main(String[])` of `class_name`.
    pub fn run_main(&mut self, class_name: &str, args: &[String]) -> InvokeResult<()> {
        let args = args
            .iter()
            .map(|arg| self.intern_string(arg).map(Value::ObjectRef))
            .collect::<InvokeResult<Vec<_>>>()?;
        let array = JvmArray::from_values(ArrayElement::Reference("java/lang/String".to_string()), args);
        self.invoke_static(
            class_name,
            "main",
            "([Ljava/lang/String;)V",
            vec![Value::ArrayRef(Arc::new(array))],
        )?;
        Ok(())
    }
}
