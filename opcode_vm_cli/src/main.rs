use log::{error, info};
use opcode_vm::class_finder::{ClassPath, FileSystemClassPath, JarFileClassPath};
use opcode_vm::jvm_error::VmExecResult;
use opcode_vm::virtual_machine::VirtualMachine;
use opcode_vm::vm_options::VmOptions;
use std::env;
use std::process::ExitCode;

fn class_path_entry(entry: &str) -> VmExecResult<Box<dyn ClassPath>> {
    if entry.ends_with(".jar") {
        Ok(Box::new(JarFileClassPath::new(entry)?))
    } else {
        Ok(Box::new(FileSystemClassPath::new(entry)?))
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args: Vec<String> = env::args().skip(1).collect();
    let [class_path, main_class, program_args @ ..] = args.as_slice() else {
        eprintln!("usage: opcode_vm_cli <class-path> <main-class> [args..]");
        return ExitCode::from(2);
    };

    let vm = VirtualMachine::new(VmOptions::default());
    for entry in class_path.split(':').filter(|entry| !entry.is_empty()) {
        match class_path_entry(entry) {
            Ok(class_path) => vm.add_class_path(class_path),
            Err(e) => {
                error!("bad class path entry {entry}: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    let main_class = main_class.replace('.', "/");
    info!("running {main_class}.main with {} argument(s)", program_args.len());
    let mut env = vm.new_thread();
    match env.run_main(&main_class, program_args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
