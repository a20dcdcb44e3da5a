use crate::class_finder::ClassPath;
use crate::class_model::ClassRef;
use crate::dispatch::DispatchTable;
use crate::env::Env;
use crate::java_exception::InvokeResult;
use crate::jvm_values::ObjectRef;
use crate::method_area::MethodArea;
use crate::native_method_area::NativeMethodArea;
use crate::vm_options::VmOptions;
use classfile::class_file::ClassFile;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Process-wide VM state shared by every thread's `Env`: the class registry,
/// the built-in classes, the string pool and the dispatch table.
pub struct VirtualMachine {
    method_area: MethodArea,
    native_method_area: NativeMethodArea,
    dispatch_table: &'static DispatchTable,
    options: VmOptions,
    string_pool: Mutex<HashMap<String, ObjectRef>>,
}

impl VirtualMachine {
    pub fn new(options: VmOptions) -> Arc<VirtualMachine> {
        let native_method_area = NativeMethodArea::new_with_default_native(&options);
        Arc::new(VirtualMachine {
            method_area: MethodArea::new(&native_method_area),
            native_method_area,
            dispatch_table: DispatchTable::global(),
            options,
            string_pool: Mutex::new(HashMap::new()),
        })
    }

    /// Execution context for a new VM thread.
    pub fn new_thread(self: &Arc<Self>) -> Env {
        Env::new(Arc::clone(self))
    }

    pub fn options(&self) -> &VmOptions {
        &self.options
    }

    pub fn dispatch_table(&self) -> &'static DispatchTable {
        self.dispatch_table
    }

    pub fn add_class_path(&self, class_path: Box<dyn ClassPath>) {
        self.method_area.add_class_path(class_path);
    }

    pub fn define_class(&self, class_file: ClassFile) {
        self.method_area.define_class(class_file);
    }

    /// Loads `name` if needed and runs its initialisation on `env`'s thread.
    pub fn find_class(&self, env: &mut Env, name: &str) -> InvokeResult<ClassRef> {
        let class = self.method_area.load_class(name)?;
        class.initialize(env)?;
        Ok(class)
    }

    pub fn is_class_loaded(&self, name: &str) -> bool {
        self.method_area.is_loaded(name)
    }

    /// Equal literals share one string object.
    pub fn intern_string(&self, value: &str) -> InvokeResult<ObjectRef> {
        let mut pool = self.string_pool.lock();
        let string = pool
            .entry(value.to_string())
            .or_insert_with(|| self.native_method_area.new_string(value));
        Ok(string.clone())
    }
}
