use crate::error::{Error, Result};
use std::fmt;
use std::io::Read;
use std::io::Write;

#[derive(Debug, Clone, PartialEq)]
pub struct UTF8StringAvp(String);

impl UTF8StringAvp {
    pub fn new(value: impl Into<String>) -> UTF8StringAvp {
        UTF8StringAvp(value.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }

    pub fn decode_from<R: Read>(reader: &mut R, len: usize) -> Result<UTF8StringAvp> {
        let mut b = vec![0u8; len];
        reader.read_exact(&mut b)?;
        let s = std::str::from_utf8(&b).map_err(Error::BadUtf8)?;
        Ok(UTF8StringAvp(s.to_string()))
    }

    pub fn encode_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(self.0.as_bytes())?;
        Ok(())
    }

    pub fn length(&self) -> u32 {
        self.0.len() as u32
    }
}

impl fmt::Display for UTF8StringAvp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_encode_decode() {
        let avp = UTF8StringAvp::new("Hello World");
        let mut encoded = Vec::new();
        avp.encode_to(&mut encoded).unwrap();
        let mut cursor = Cursor::new(&encoded);
        let avp = UTF8StringAvp::decode_from(&mut cursor, encoded.len()).unwrap();
        assert_eq!(avp.value(), "Hello World");
    }

    #[test]
    fn test_encode_decode_utf8() {
        let avp = UTF8StringAvp::new("世界,你好");
        let mut encoded = Vec::new();
        avp.encode_to(&mut encoded).unwrap();
        let mut cursor = Cursor::new(&encoded);
        let avp = UTF8StringAvp::decode_from(&mut cursor, encoded.len()).unwrap();
        assert_eq!(avp.value(), "世界,你好");
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let bytes = vec![0x61, 0x62, 0x63, 0x64, 0x80];
        let mut cursor = Cursor::new(&bytes);
        match UTF8StringAvp::decode_from(&mut cursor, bytes.len()) {
            Err(Error::BadUtf8(_)) => {}
            other => panic!("expected BadUtf8, got {:?}", other),
        }
    }
}
