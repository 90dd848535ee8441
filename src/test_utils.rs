//! Little-endian reader used by unit tests to decode what the builder wrote.

pub struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub fn at(bytes: &'a [u8], pos: usize) -> Self {
        Self { bytes, pos }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    fn take(&mut self, n: usize) -> &'a [u8] {
        let out = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        out
    }

    pub fn u8(&mut self) -> u8 {
        self.take(1)[0]
    }

    pub fn bool(&mut self) -> bool {
        match self.u8() {
            0 => false,
            1 => true,
            other => panic!("not a boolean byte: {other}"),
        }
    }

    pub fn u16(&mut self) -> u16 {
        u16::from_le_bytes(self.take(2).try_into().unwrap())
    }

    pub fn i16(&mut self) -> i16 {
        i16::from_le_bytes(self.take(2).try_into().unwrap())
    }

    pub fn u32(&mut self) -> u32 {
        u32::from_le_bytes(self.take(4).try_into().unwrap())
    }

    pub fn str(&mut self) -> String {
        let len = self.u16() as usize;
        String::from_utf8(self.take(len).to_vec()).unwrap()
    }

    pub fn bools<const N: usize>(&mut self) -> [bool; N] {
        let mut out = [false; N];
        for slot in out.iter_mut() {
            *slot = self.bool();
        }
        out
    }

    /// Decode the trailing index of a container file.
    pub fn index(&mut self) -> Vec<(u32, String)> {
        self.pos = 4;
        let at = self.u32() as usize;
        self.pos = at;
        let count = self.u32();
        let out = (0..count).map(|_| (self.u32(), self.str())).collect();
        assert_eq!(self.pos, self.bytes.len(), "index must close the file");
        out
    }

    /// Decode `(code, file)` pairs of a script-event table.
    pub fn events(&mut self) -> Vec<(u8, String)> {
        let count = self.u8();
        (0..count).map(|_| (self.u8(), self.str())).collect()
    }
}
