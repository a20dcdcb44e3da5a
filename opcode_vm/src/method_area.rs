use crate::class_finder::{ClassFinder, ClassPath};
use crate::class_model::ClassRef;
use crate::java_exception::{InvokeResult, JavaException};
use crate::jvm_error::VmError;
use crate::loaded_class::BytecodeClass;
use crate::native_method_area::NativeMethodArea;
use classfile::class_file::ClassFile;
use classfile::class_file_reader::read_buffer;
use log::debug;
use parking_lot::{Mutex, ReentrantMutex, RwLock};
use std::collections::{HashMap, HashSet};

/// Class registry shared by every thread of a VM. One class object exists per
/// binary name; it is created on first lookup, super classes first.
pub struct MethodArea {
    classes: RwLock<HashMap<String, ClassRef>>,
    // classes handed in as decoded class files, loaded on first use
    definitions: Mutex<HashMap<String, ClassFile>>,
    class_finder: RwLock<ClassFinder>,
    // serialises loading; re-entered while super classes load
    load_lock: ReentrantMutex<()>,
    loading: Mutex<HashSet<String>>,
}

impl MethodArea {
    pub fn new(natives: &NativeMethodArea) -> MethodArea {
        let classes = natives
            .class_names()
            .filter_map(|name| natives.get_class(name).map(|class| (name.to_string(), class)))
            .collect();
        MethodArea {
            classes: RwLock::new(classes),
            definitions: Mutex::new(HashMap::new()),
            class_finder: RwLock::new(ClassFinder::new()),
            load_lock: ReentrantMutex::new(()),
            loading: Mutex::new(HashSet::new()),
        }
    }

    pub fn add_class_path(&self, class_path: Box<dyn ClassPath>) {
        self.class_finder.write().add_class_path(class_path);
    }

    /// Registers a decoded class; it is loaded like a class path hit.
    pub fn define_class(&self, class_file: ClassFile) {
        self.definitions
            .lock()
            .insert(class_file.this_class_name.clone(), class_file);
    }

    pub fn get_loaded(&self, name: &str) -> Option<ClassRef> {
        self.classes.read().get(name).cloned()
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.classes.read().contains_key(name)
    }

    pub fn load_class(&self, name: &str) -> InvokeResult<ClassRef> {
        if let Some(class) = self.get_loaded(name) {
            return Ok(class);
        }
        let _guard = self.load_lock.lock();
        if let Some(class) = self.get_loaded(name) {
            return Ok(class);
        }
        if !self.loading.lock().insert(name.to_string()) {
            return Err(JavaException::NoClassDefFound(format!("class circularity at {name}")).into());
        }
        let result = self.do_class_loading(name);
        self.loading.lock().remove(name);
        let class = result?;
        self.classes.write().insert(name.to_string(), class.clone());
        Ok(class)
    }

    fn do_class_loading(&self, name: &str) -> InvokeResult<ClassRef> {
        let class_file = self.read_class_file(name)?;
        if class_file.this_class_name != name {
            return Err(JavaException::NoClassDefFound(format!(
                "{name} (wrong name: {})",
                class_file.this_class_name
            ))
            .into());
        }
        let super_class = match &class_file.super_class_name {
            Some(super_class_name) => Some(self.load_class(super_class_name)?),
            None => None,
        };
        debug!("load class {name}");
        let class: ClassRef = BytecodeClass::load(&class_file, super_class)?;
        Ok(class)
    }

    fn read_class_file(&self, name: &str) -> InvokeResult<ClassFile> {
        if let Some(class_file) = self.definitions.lock().remove(name) {
            return Ok(class_file);
        }
        match self.class_finder.read().find_class(name)? {
            Some(bytes) => Ok(read_buffer(&bytes).map_err(VmError::from)?),
            None => Err(JavaException::NoClassDefFound(name.to_string()).into()),
        }
    }
}
