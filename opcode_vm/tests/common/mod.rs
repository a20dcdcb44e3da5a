#![allow(dead_code)]

use classfile::attribute_info::AttributeInfo;
use classfile::class_file::{ClassAccessFlags, ClassFile};
use classfile::class_file_version::ClassFileVersion;
use classfile::constant_pool::{ConstantPool, ConstantPoolEntry, ConstantPoolIndex};
use classfile::field_info::{FieldAccessFlags, FieldInfo};
use classfile::method_info::{MethodAccessFlags, MethodInfo};
use classfile::opcode::Opcode;
use opcode_vm::virtual_machine::VirtualMachine;
use opcode_vm::vm_options::{OutputSink, VmOptions};
use std::collections::HashMap;
use std::sync::Arc;

pub fn op(opcode: Opcode) -> u8 {
    opcode.code()
}

pub fn u2(index: ConstantPoolIndex) -> [u8; 2] {
    index.to_be_bytes()
}

/// Options whose `System.out` is captured in memory.
pub fn buffered_options() -> (VmOptions, OutputSink) {
    let sink = OutputSink::buffer();
    let options = VmOptions {
        stdout: sink.clone(),
        ..VmOptions::default()
    };
    (options, sink)
}

pub fn vm_with(options: VmOptions, classes: Vec<ClassFile>) -> Arc<VirtualMachine> {
    let _ = env_logger::builder().is_test(true).try_init();
    let vm = VirtualMachine::new(options);
    for class in classes {
        vm.define_class(class);
    }
    vm
}

/// Assembles a class file in memory.
pub struct ClassBuilder {
    name: String,
    super_name: Option<String>,
    access_flags: ClassAccessFlags,
    pool: ConstantPool,
    utf8s: HashMap<String, ConstantPoolIndex>,
    fields: Vec<FieldInfo>,
    methods: Vec<MethodInfo>,
}

impl ClassBuilder {
    pub fn new(name: &str) -> ClassBuilder {
        ClassBuilder {
            name: name.to_string(),
            super_name: Some("java/lang/Object".to_string()),
            access_flags: ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER,
            pool: ConstantPool::new(),
            utf8s: HashMap::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn extends(mut self, super_name: &str) -> ClassBuilder {
        self.super_name = Some(super_name.to_string());
        self
    }

    pub fn flags(mut self, access_flags: ClassAccessFlags) -> ClassBuilder {
        self.access_flags = access_flags;
        self
    }

    pub fn utf8(&mut self, value: &str) -> ConstantPoolIndex {
        if let Some(index) = self.utf8s.get(value) {
            return *index;
        }
        let index = self.pool.add(ConstantPoolEntry::Utf8(value.to_string()));
        self.utf8s.insert(value.to_string(), index);
        index
    }

    pub fn class_ref(&mut self, name: &str) -> ConstantPoolIndex {
        let name = self.utf8(name);
        self.pool.add(ConstantPoolEntry::ClassReference(name))
    }

    pub fn string(&mut self, value: &str) -> ConstantPoolIndex {
        let value = self.utf8(value);
        self.pool.add(ConstantPoolEntry::StringReference(value))
    }

    pub fn integer(&mut self, value: i32) -> ConstantPoolIndex {
        self.pool.add(ConstantPoolEntry::Integer(value))
    }

    pub fn float(&mut self, value: f32) -> ConstantPoolIndex {
        self.pool.add(ConstantPoolEntry::Float(value))
    }

    pub fn long(&mut self, value: i64) -> ConstantPoolIndex {
        self.pool.add(ConstantPoolEntry::Long(value))
    }

    pub fn double(&mut self, value: f64) -> ConstantPoolIndex {
        self.pool.add(ConstantPoolEntry::Double(value))
    }

    fn name_and_type(&mut self, name: &str, descriptor: &str) -> ConstantPoolIndex {
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);
        self.pool
            .add(ConstantPoolEntry::NameAndTypeDescriptor(name, descriptor))
    }

    pub fn field_ref(&mut self, class: &str, name: &str, descriptor: &str) -> ConstantPoolIndex {
        let class = self.class_ref(class);
        let name_and_type = self.name_and_type(name, descriptor);
        self.pool
            .add(ConstantPoolEntry::FieldReference(class, name_and_type))
    }

    pub fn method_ref(&mut self, class: &str, name: &str, descriptor: &str) -> ConstantPoolIndex {
        let class = self.class_ref(class);
        let name_and_type = self.name_and_type(name, descriptor);
        self.pool
            .add(ConstantPoolEntry::MethodReference(class, name_and_type))
    }

    pub fn field(&mut self, access_flags: FieldAccessFlags, name: &str, descriptor: &str) -> &mut Self {
        self.fields.push(FieldInfo {
            access_flags,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            attributes: Vec::new(),
        });
        self
    }

    /// A static field initialised from the constant at `value`.
    pub fn constant_field(
        &mut self,
        access_flags: FieldAccessFlags,
        name: &str,
        descriptor: &str,
        value: ConstantPoolIndex,
    ) -> &mut Self {
        self.fields.push(FieldInfo {
            access_flags: access_flags | FieldAccessFlags::STATIC,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            attributes: vec![AttributeInfo::new("ConstantValue", u2(value).to_vec())],
        });
        self
    }

    pub fn method(
        &mut self,
        access_flags: MethodAccessFlags,
        name: &str,
        descriptor: &str,
        max_stack: u16,
        max_locals: u16,
        code: Vec<u8>,
    ) -> &mut Self {
        let mut info = Vec::new();
        info.extend(max_stack.to_be_bytes());
        info.extend(max_locals.to_be_bytes());
        info.extend((code.len() as u32).to_be_bytes());
        info.extend(code);
        // exception table, attributes
        info.extend([0, 0, 0, 0]);
        self.methods.push(MethodInfo {
            access_flags,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            attributes: vec![AttributeInfo::new("Code", info)],
        });
        self
    }

    pub fn static_method(
        &mut self,
        name: &str,
        descriptor: &str,
        max_stack: u16,
        max_locals: u16,
        code: Vec<u8>,
    ) -> &mut Self {
        self.method(
            MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC,
            name,
            descriptor,
            max_stack,
            max_locals,
            code,
        )
    }

    /// `<init>()V` that only calls the super constructor.
    pub fn default_constructor(&mut self) -> &mut Self {
        let super_name = self.super_name.clone().unwrap_or_default();
        let super_init = self.method_ref(&super_name, "<init>", "()V");
        let mut code = vec![op(Opcode::Aload_0), op(Opcode::Invokespecial)];
        code.extend(u2(super_init));
        code.push(op(Opcode::Return));
        self.method(MethodAccessFlags::PUBLIC, "<init>", "()V", 1, 1, code)
    }

    pub fn build(self) -> ClassFile {
        ClassFile {
            version: ClassFileVersion::default(),
            constant_pool: self.pool,
            access_flags: self.access_flags,
            this_class_name: self.name,
            super_class_name: self.super_name,
            interface_names: Vec::new(),
            field_info: self.fields,
            method_info: self.methods,
            attribute_info: Vec::new(),
        }
    }
}
