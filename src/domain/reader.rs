use crate::core::error::ParseError;

/// Little-endian cursor over an in-memory GBX buffer. Every read is bounds-checked.
pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub(crate) fn bytes(&mut self, len: usize, what: &'static str) -> Result<&'a [u8], ParseError> {
        if len > self.remaining() {
            return Err(ParseError::Truncated {
                what,
                offset: self.pos,
            });
        }
        let out = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    pub(crate) fn rest(&mut self) -> &'a [u8] {
        let out = &self.data[self.pos..];
        self.pos = self.data.len();
        out
    }

    pub(crate) fn u8(&mut self, what: &'static str) -> Result<u8, ParseError> {
        Ok(self.bytes(1, what)?[0])
    }

    pub(crate) fn u16(&mut self, what: &'static str) -> Result<u16, ParseError> {
        let b = self.bytes(2, what)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub(crate) fn u32(&mut self, what: &'static str) -> Result<u32, ParseError> {
        let b = self.bytes(4, what)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// A `u32` count or length that must fit in what is left of the buffer,
    /// given that each item takes at least `min_item_len` bytes.
    pub(crate) fn len_prefix(
        &mut self,
        min_item_len: usize,
        what: &'static str,
    ) -> Result<usize, ParseError> {
        let declared = self.u32(what)?;
        let needed = u64::from(declared) * min_item_len as u64;
        if needed > self.remaining() as u64 {
            return Err(ParseError::LengthOutOfRange {
                what,
                declared: needed,
                remaining: self.remaining(),
            });
        }
        Ok(declared as usize)
    }

    pub(crate) fn string(&mut self, what: &'static str) -> Result<String, ParseError> {
        let len = self.len_prefix(1, what)?;
        let raw = self.bytes(len, what)?;
        String::from_utf8(raw.to_vec()).map_err(|_| ParseError::InvalidString(what))
    }

    /// Consumes `expected` exactly.
    pub(crate) fn expect(&mut self, expected: &[u8], what: &'static str) -> Result<(), ParseError> {
        let start = self.pos;
        let got = self.bytes(expected.len(), what)?;
        if got != expected {
            return Err(ParseError::UnexpectedBytes {
                what,
                offset: start,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_values() {
        let mut r = ByteReader::new(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
        assert_eq!(r.u16("a").unwrap(), 0x0201);
        assert_eq!(r.u32("b").unwrap(), 0x0605_0403);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn reports_truncation_offset() {
        let mut r = ByteReader::new(&[0x01, 0x02]);
        r.u8("first").unwrap();
        assert_eq!(
            r.u32("second").unwrap_err(),
            ParseError::Truncated {
                what: "second",
                offset: 1
            }
        );
    }

    #[test]
    fn rejects_oversized_length_prefix() {
        let mut r = ByteReader::new(&[0xff, 0xff, 0xff, 0x7f, 0x00]);
        assert!(matches!(
            r.string("name"),
            Err(ParseError::LengthOutOfRange { what: "name", .. })
        ));
    }
}
