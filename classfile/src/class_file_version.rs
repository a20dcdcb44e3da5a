use crate::class_file_error::{ClassFileError, Result};
use strum_macros::{Display, FromRepr};

/// Class file major versions, keyed by the release that introduced them.
/// https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html#jvms-4.1-200-B.2
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Display, FromRepr)]
#[repr(u16)]
pub enum ClassFileVersion {
    Jdk1_1 = 45,
    Jdk1_2 = 46,
    Jdk1_3 = 47,
    Jdk1_4 = 48,
    Jdk5 = 49,
    Jdk6 = 50,
    Jdk7 = 51,
    #[default]
    Jdk8 = 52,
    Jdk9 = 53,
    Jdk10 = 54,
    Jdk11 = 55,
    Jdk12 = 56,
    Jdk13 = 57,
    Jdk14 = 58,
    Jdk15 = 59,
    Jdk16 = 60,
    Jdk17 = 61,
    Jdk18 = 62,
    Jdk19 = 63,
    Jdk20 = 64,
    Jdk21 = 65,
}

impl ClassFileVersion {
    pub fn new(major: u16, minor: u16) -> Result<ClassFileVersion> {
        ClassFileVersion::from_repr(major).ok_or(ClassFileError::UnsupportedVersion(major, minor))
    }

    pub fn major(&self) -> u16 {
        *self as u16
    }
}
