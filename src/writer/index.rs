//! Name → offset trailer shared by every container file.

use crate::writer::bin::{ContainerWriter, WriterError};

#[derive(Debug, Default)]
pub struct IndexTable {
    names: Vec<String>,
    offsets: Vec<u32>,
}

impl IndexTable {
    pub fn push(&mut self, name: &str, offset: u32) {
        self.names.push(name.to_string());
        self.offsets.push(offset);
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// `count: u32` followed by `(offset: u32, name: str16)` pairs.
    pub fn write(&self, w: &mut ContainerWriter) -> Result<(), WriterError> {
        assert_eq!(
            self.names.len(),
            self.offsets.len(),
            "index names and offsets out of step"
        );
        let count = u32::try_from(self.names.len()).map_err(|_| WriterError::OffsetOverflow)?;
        w.put_u32(count);
        for (name, offset) in self.names.iter().zip(&self.offsets) {
            w.put_u32(*offset);
            w.put_str(name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_index_is_just_a_count() {
        let mut w = ContainerWriter::new();
        IndexTable::default().write(&mut w).unwrap();
        assert_eq!(w.into_bytes().unwrap(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn entries_keep_insertion_order() {
        let mut idx = IndexTable::default();
        idx.push("b", 0x10);
        idx.push("a", 0x20);
        let mut w = ContainerWriter::new();
        idx.write(&mut w).unwrap();
        assert_eq!(
            w.into_bytes().unwrap(),
            vec![2, 0, 0, 0, 0x10, 0, 0, 0, 1, 0, b'b', 0x20, 0, 0, 0, 1, 0, b'a']
        );
    }
}
