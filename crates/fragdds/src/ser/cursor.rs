// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Read/write cursors for CDR buffer manipulation.

use super::{SerError, SerResult};

macro_rules! impl_write_le {
    ($name:ident, $type:ty) => {
        pub fn $name(&mut self, value: $type) -> SerResult<()> {
            self.write_bytes(&value.to_le_bytes())
        }
    };
}

macro_rules! impl_read_le {
    ($name:ident, $type:ty, $size:expr) => {
        pub fn $name(&mut self) -> SerResult<$type> {
            let mut bytes = [0u8; $size];
            bytes.copy_from_slice(self.read_bytes($size)?);
            Ok(<$type>::from_le_bytes(bytes))
        }
    };
}

/// Mutable cursor for writing (bounds-checked).
pub struct CursorMut<'a> {
    buffer: &'a mut [u8],
    offset: usize,
}

impl<'a> CursorMut<'a> {
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    impl_write_le!(write_u16_le, u16);
    impl_write_le!(write_u32_le, u32);
    impl_write_le!(write_i32_le, i32);

    pub fn write_bytes(&mut self, data: &[u8]) -> SerResult<()> {
        let end = self.offset + data.len();
        if end > self.buffer.len() {
            return Err(SerError::WriteFailed {
                offset: self.offset,
                reason: "buffer too small".into(),
            });
        }
        self.buffer[self.offset..end].copy_from_slice(data);
        self.offset = end;
        Ok(())
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// Immutable cursor for reading (bounds-checked, zero-copy).
pub struct Cursor<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    impl_read_le!(read_u16_le, u16, 2);
    impl_read_le!(read_u32_le, u32, 4);
    impl_read_le!(read_i32_le, i32, 4);

    pub fn read_bytes(&mut self, len: usize) -> SerResult<&'a [u8]> {
        let end = self.offset.checked_add(len).ok_or_else(|| SerError::ReadFailed {
            offset: self.offset,
            reason: "length overflow".into(),
        })?;
        if end > self.buffer.len() {
            return Err(SerError::ReadFailed {
                offset: self.offset,
                reason: "unexpected end of buffer".into(),
            });
        }
        let slice = &self.buffer[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_overflow_reports_offset() {
        let mut buffer = [0u8; 6];
        let mut cursor = CursorMut::new(&mut buffer);
        cursor.write_u32_le(0x1234_5678).expect("first write fits");
        let err = cursor.write_u32_le(1).expect_err("second write overflows");
        assert_eq!(
            err,
            SerError::WriteFailed {
                offset: 4,
                reason: "buffer too small".into()
            }
        );
    }

    #[test]
    fn test_read_back_little_endian() {
        let mut buffer = [0u8; 10];
        {
            let mut cursor = CursorMut::new(&mut buffer);
            cursor.write_i32_le(-7).unwrap();
            cursor.write_u16_le(0xABCD).unwrap();
            cursor.write_u32_le(42).unwrap();
            assert_eq!(cursor.offset(), 10);
        }
        assert_eq!(&buffer[4..6], &[0xCD, 0xAB]);

        let mut cursor = Cursor::new(&buffer);
        assert_eq!(cursor.read_i32_le().unwrap(), -7);
        assert_eq!(cursor.read_u16_le().unwrap(), 0xABCD);
        assert_eq!(cursor.read_u32_le().unwrap(), 42);
        assert_eq!(cursor.remaining(), 0);
        assert!(cursor.read_bytes(1).is_err());
    }

    #[test]
    fn test_read_bytes_huge_length_rejected() {
        let buffer = [0u8; 4];
        let mut cursor = Cursor::new(&buffer);
        cursor.read_bytes(2).unwrap();
        assert!(cursor.read_bytes(usize::MAX).is_err());
    }
}
