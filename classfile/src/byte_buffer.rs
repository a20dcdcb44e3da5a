use crate::class_file_error::{ClassFileError, Result};
use cesu8::from_java_cesu8;

/// Big-endian cursor over class file bytes.
pub struct ByteBuffer<'a> {
    buffer: &'a [u8],
    position: usize,
}

macro_rules! read_be {
    ($name:ident, $ty:ty) => {
        pub fn $name(&mut self) -> Result<$ty> {
            let mut bytes = [0u8; std::mem::size_of::<$ty>()];
            bytes.copy_from_slice(self.advance(std::mem::size_of::<$ty>())?);
            Ok(<$ty>::from_be_bytes(bytes))
        }
    };
}

impl<'a> ByteBuffer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ByteBuffer {
            buffer: data,
            position: 0,
        }
    }

    fn advance(&mut self, size: usize) -> Result<&'a [u8]> {
        let end = self
            .position
            .checked_add(size)
            .filter(|end| *end <= self.buffer.len())
            .ok_or(ClassFileError::UnexpectedEndOfData)?;
        let slice = &self.buffer[self.position..end];
        self.position = end;
        Ok(slice)
    }

    read_be!(read_u8, u8);
    read_be!(read_i8, i8);
    read_be!(read_u16, u16);
    read_be!(read_i16, i16);
    read_be!(read_u32, u32);
    read_be!(read_i32, i32);
    read_be!(read_i64, i64);
    read_be!(read_f32, f32);
    read_be!(read_f64, f64);

    pub fn read_2_u16(&mut self) -> Result<(u16, u16)> {
        let first = self.read_u16()?;
        let second = self.read_u16()?;
        Ok((first, second))
    }

    pub fn read_u8_u16(&mut self) -> Result<(u8, u16)> {
        let first = self.read_u8()?;
        let second = self.read_u16()?;
        Ok((first, second))
    }

    /// Decodes `len` bytes of modified UTF-8.
    pub fn read_utf8(&mut self, len: usize) -> Result<String> {
        let bytes = self.advance(len)?;
        from_java_cesu8(bytes)
            .map(|text| text.into_owned())
            .map_err(|_| ClassFileError::InvalidCesu8String)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.advance(len)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.position
    }

    pub fn has_more_data(&self) -> bool {
        self.position < self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use crate::byte_buffer::ByteBuffer;
    use crate::class_file_error::ClassFileError;

    #[test]
    fn reads_big_endian_words() {
        let data = vec![0x00, 0x00, 0x00, 0x42, 0xff, 0xfe];
        let mut buffer = ByteBuffer::new(&data);
        assert!(buffer.has_more_data());
        assert_eq!(0x42u32, buffer.read_u32().unwrap());
        assert_eq!(-2i16, buffer.read_i16().unwrap());
        assert!(!buffer.has_more_data());
        assert_eq!(Err(ClassFileError::UnexpectedEndOfData), buffer.read_u8());
    }

    #[test]
    fn short_read_keeps_position() {
        let data = vec![0x01, 0x02];
        let mut buffer = ByteBuffer::new(&data);
        assert!(buffer.read_u32().is_err());
        assert_eq!(0, buffer.position());
        assert_eq!(0x0102, buffer.read_u16().unwrap());
        assert_eq!(0, buffer.remaining());
    }

    #[test]
    fn decodes_modified_utf8() {
        // U+0000 is written as 0xC0 0x80 in class files
        let data = vec![b'a', 0xc0, 0x80, b'b'];
        let mut buffer = ByteBuffer::new(&data);
        assert_eq!("a\u{0}b", buffer.read_utf8(4).unwrap());
    }
}
