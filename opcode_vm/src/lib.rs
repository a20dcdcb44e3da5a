pub mod call_stack;
pub mod class_finder;
pub mod class_model;
pub mod descriptor;
pub mod dispatch;
pub mod env;
mod instructions;
pub mod interpreter;
pub mod java_exception;
pub mod jvm_error;
pub mod jvm_values;
pub mod loaded_class;
pub mod local_variables;
pub mod method_area;
pub mod native_method_area;
pub mod object;
pub mod operand_stack;
pub mod runtime_attribute_info;
pub mod runtime_constant_pool;
pub mod runtime_field_info;
pub mod runtime_method_info;
pub mod stack_frame;
pub mod stack_trace_element;
pub mod static_field_area;
pub mod virtual_machine;
pub mod vm_options;
