pub mod attribute_info;
pub mod byte_buffer;
pub mod class_file;
pub mod class_file_error;
pub mod class_file_reader;
pub mod class_file_version;
pub mod constant_pool;
pub mod field_info;
pub mod method_info;
pub mod opcode;
