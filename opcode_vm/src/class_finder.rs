use crate::jvm_error::{VmError, VmExecResult};
use parking_lot::Mutex;
use std::fmt::{Debug, Formatter};
use std::fs;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;
use zip::result::ZipError;
use zip::ZipArchive;

/// Looks class files up by binary name, in class path order.
#[derive(Debug, Default)]
pub struct ClassFinder {
    class_paths: Vec<Box<dyn ClassPath>>,
}

impl ClassFinder {
    pub fn new() -> ClassFinder {
        ClassFinder::default()
    }

    pub fn add_class_path(&mut self, class_path: Box<dyn ClassPath>) {
        self.class_paths.push(class_path);
    }

    /// Bytes of the first class file named `name`, `None` when no class path has it.
    pub fn find_class(&self, name: &str) -> VmExecResult<Option<Vec<u8>>> {
        for class_path in &self.class_paths {
            if let Some(bytes) = class_path.find_class(name)? {
                return Ok(Some(bytes));
            }
        }
        Ok(None)
    }
}

pub trait ClassPath: Debug + Send + Sync {
    fn find_class(&self, class_name: &str) -> VmExecResult<Option<Vec<u8>>>;
}

/// A directory of `.class` files laid out by package.
#[derive(Debug)]
pub struct FileSystemClassPath {
    class_path_root: PathBuf,
}

impl FileSystemClassPath {
    pub fn new(path: &str) -> VmExecResult<FileSystemClassPath> {
        let class_path_root =
            fs::canonicalize(path).map_err(|_| VmError::ClassPathNotExist(path.to_string()))?;
        if !class_path_root.is_dir() {
            return Err(VmError::ClassPathNotExist(
                class_path_root.to_string_lossy().to_string(),
            ));
        }
        Ok(FileSystemClassPath { class_path_root })
    }
}

impl ClassPath for FileSystemClassPath {
    fn find_class(&self, class_name: &str) -> VmExecResult<Option<Vec<u8>>> {
        let mut full_path = self.class_path_root.clone();
        full_path.push(class_name);
        full_path.set_extension("class");
        if full_path.is_file() {
            fs::read(full_path)
                .map(Some)
                .map_err(|e| VmError::ReadClassBytesError(e.to_string()))
        } else {
            Ok(None)
        }
    }
}

/// A jar, which is a zip archive of class files.
pub struct JarFileClassPath {
    jar_file_path: String,
    zip: Mutex<ZipArchive<BufReader<File>>>,
}

impl Debug for JarFileClassPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "JarFileClassPath => {}", &self.jar_file_path)
    }
}

impl JarFileClassPath {
    pub fn new(path: &str) -> VmExecResult<JarFileClassPath> {
        let jar_file_path =
            fs::canonicalize(path).map_err(|_| VmError::JarFileNotExist(path.to_string()))?;
        let file = File::open(&jar_file_path).map_err(|e| VmError::ReadJarFileError(e.to_string()))?;
        let zip = ZipArchive::new(BufReader::new(file))
            .map_err(|e| VmError::ReadJarFileError(e.to_string()))?;
        Ok(JarFileClassPath {
            jar_file_path: jar_file_path.to_string_lossy().to_string(),
            zip: Mutex::new(zip),
        })
    }
}

impl ClassPath for JarFileClassPath {
    fn find_class(&self, class_name: &str) -> VmExecResult<Option<Vec<u8>>> {
        let class_file_name = format!("{class_name}.class");
        let mut zip = self.zip.lock();
        let result = match zip.by_name(&class_file_name) {
            Ok(mut zip_file) => {
                let mut buffer = Vec::with_capacity(zip_file.size() as usize);
                zip_file
                    .read_to_end(&mut buffer)
                    .map_err(|e| VmError::ReadClassBytesError(e.to_string()))?;
                Ok(Some(buffer))
            }
            Err(ZipError::FileNotFound) => Ok(None),
            Err(e) => Err(VmError::ReadClassBytesError(e.to_string())),
        };
        result
    }
}
