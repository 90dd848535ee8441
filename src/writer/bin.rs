//! In-memory binary container writer with typed forward patching.
//!
//! Every file is assembled in a growable buffer and only handed to the
//! filesystem once all placeholders have been filled, so a failed build
//! never leaves a half-patched file behind.

use std::marker::PhantomData;

use crate::model::{FORMAT_MAJOR, FORMAT_MINOR, FileKind};
use crate::writer::index::IndexTable;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WriterError {
    #[error("string of {0} bytes does not fit a 16-bit length prefix")]
    StringTooLong(usize),

    #[error("file grew past the 32-bit offset range")]
    OffsetOverflow,

    #[error("{0} placeholder(s) were never patched")]
    Unpatched(usize),
}

/// A fixed-width value that can be written or patched in place.
pub trait Field: Copy {
    const WIDTH: usize;

    fn encode(self, out: &mut [u8]);
}

macro_rules! le_field {
    ($($t:ty),*) => {$(
        impl Field for $t {
            const WIDTH: usize = std::mem::size_of::<$t>();

            fn encode(self, out: &mut [u8]) {
                out.copy_from_slice(&self.to_le_bytes());
            }
        }
    )*};
}

le_field!(u8, u16, u32, i16, i32);

impl Field for bool {
    const WIDTH: usize = 1;

    fn encode(self, out: &mut [u8]) {
        out[0] = self as u8;
    }
}

impl<const N: usize> Field for [bool; N] {
    const WIDTH: usize = N;

    fn encode(self, out: &mut [u8]) {
        for (dst, flag) in out.iter_mut().zip(self) {
            *dst = flag as u8;
        }
    }
}

/// Handle to a reserved region; consumed by [`ContainerWriter::patch`].
#[must_use = "a reserved placeholder has to be patched"]
#[derive(Debug)]
pub struct Placeholder<T: Field> {
    offset: usize,
    _marker: PhantomData<T>,
}

#[derive(Debug, Default)]
pub struct ContainerWriter {
    buf: Vec<u8>,
    open: usize,
}

impl ContainerWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current end-of-data position.
    pub fn offset(&self) -> Result<u32, WriterError> {
        u32::try_from(self.buf.len()).map_err(|_| WriterError::OffsetOverflow)
    }

    pub fn put<T: Field>(&mut self, value: T) {
        let start = self.buf.len();
        self.buf.resize(start + T::WIDTH, 0);
        value.encode(&mut self.buf[start..]);
    }

    pub fn put_u8(&mut self, value: u8) {
        self.put(value);
    }

    pub fn put_u16(&mut self, value: u16) {
        self.put(value);
    }

    pub fn put_u32(&mut self, value: u32) {
        self.put(value);
    }

    pub fn put_i16(&mut self, value: i16) {
        self.put(value);
    }

    pub fn put_bool(&mut self, value: bool) {
        self.put(value);
    }

    /// 16-bit length prefix followed by the raw bytes. Empty strings are fine.
    pub fn put_str(&mut self, s: &str) -> Result<(), WriterError> {
        let len = u16::try_from(s.len()).map_err(|_| WriterError::StringTooLong(s.len()))?;
        self.put_u16(len);
        self.buf.extend_from_slice(s.as_bytes());
        Ok(())
    }

    /// Reserve `T::WIDTH` zero bytes to be filled in later.
    pub fn reserve<T: Field>(&mut self) -> Placeholder<T> {
        let offset = self.buf.len();
        self.buf.resize(offset + T::WIDTH, 0);
        self.open += 1;
        Placeholder {
            offset,
            _marker: PhantomData,
        }
    }

    pub fn patch<T: Field>(&mut self, placeholder: Placeholder<T>, value: T) {
        let at = placeholder.offset;
        value.encode(&mut self.buf[at..at + T::WIDTH]);
        self.open -= 1;
    }

    pub fn into_bytes(self) -> Result<Vec<u8>, WriterError> {
        if self.open != 0 {
            return Err(WriterError::Unpatched(self.open));
        }
        Ok(self.buf)
    }
}

/// A versioned container file: header, body records and the trailing index.
#[derive(Debug)]
pub struct Container {
    w: ContainerWriter,
    index_at: Placeholder<u32>,
    index: IndexTable,
}

impl Container {
    /// Writes the header; the index offset is left as a placeholder.
    pub fn begin(kind: FileKind) -> Self {
        let mut w = ContainerWriter::new();
        w.put_u8(kind as u8);
        w.put_u8(FORMAT_MAJOR);
        w.put_u8(FORMAT_MINOR);
        w.put_u8(0);
        let index_at = w.reserve::<u32>();
        Self {
            w,
            index_at,
            index: IndexTable::default(),
        }
    }

    pub fn writer(&mut self) -> &mut ContainerWriter {
        &mut self.w
    }

    /// Record the current offset as the start of the record called `name`.
    pub fn mark(&mut self, name: &str) -> Result<(), WriterError> {
        let offset = self.w.offset()?;
        self.index.push(name, offset);
        Ok(())
    }

    pub fn entries(&self) -> usize {
        self.index.len()
    }

    /// Append the index, patch the header and release the bytes.
    pub fn finish(mut self) -> Result<Vec<u8>, WriterError> {
        let at = self.w.offset()?;
        self.index.write(&mut self.w)?;
        self.w.patch(self.index_at, at);
        self.w.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::Reader;

    #[test]
    fn strings_are_length_prefixed() {
        let mut w = ContainerWriter::new();
        w.put_str("ab").unwrap();
        w.put_str("").unwrap();
        assert_eq!(w.into_bytes().unwrap(), vec![2, 0, b'a', b'b', 0, 0]);
    }

    #[test]
    fn oversized_string_is_rejected() {
        let mut w = ContainerWriter::new();
        let long = "x".repeat(70_000);
        assert_eq!(w.put_str(&long), Err(WriterError::StringTooLong(70_000)));
    }

    #[test]
    fn patch_fills_reserved_bytes_and_keeps_appending_at_end() {
        let mut w = ContainerWriter::new();
        let count = w.reserve::<u8>();
        w.put_u16(0xBEEF);
        let flags = w.reserve::<[bool; 3]>();
        w.put_u8(7);
        w.patch(count, 9);
        w.patch(flags, [true, false, true]);
        w.put_u8(8);
        assert_eq!(
            w.into_bytes().unwrap(),
            vec![9, 0xEF, 0xBE, 1, 0, 1, 7, 8]
        );
    }

    #[test]
    fn unpatched_placeholder_is_reported() {
        let mut w = ContainerWriter::new();
        let _forgotten = w.reserve::<u32>();
        assert_eq!(w.into_bytes(), Err(WriterError::Unpatched(1)));
    }

    #[test]
    fn container_header_points_at_index() {
        let mut c = Container::begin(FileKind::Wall);
        c.mark("first").unwrap();
        c.writer().put_u32(0xAABBCCDD);
        c.mark("second").unwrap();
        c.writer().put_u8(1);
        let bytes = c.finish().unwrap();

        let mut r = Reader::new(&bytes);
        assert_eq!(r.u8(), FileKind::Wall as u8);
        assert_eq!(r.u8(), FORMAT_MAJOR);
        assert_eq!(r.u8(), FORMAT_MINOR);
        r.u8();
        let index = r.u32() as usize;
        assert_eq!(index, 8 + 4 + 1);

        let entries = Reader::new(&bytes).index();
        assert_eq!(
            entries,
            vec![(8, "first".to_string()), (12, "second".to_string())]
        );
    }
}
