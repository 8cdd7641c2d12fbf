use crate::avp::octetstring::OctetStringAvp;
use crate::error::Result;
use std::fmt;
use std::io::Read;
use std::io::Write;

/// A DiameterIdentity: the FQDN form used for Origin-Host, Destination-Host, etc.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityAvp(OctetStringAvp);

impl IdentityAvp {
    pub fn new(value: impl AsRef<[u8]>) -> IdentityAvp {
        IdentityAvp(OctetStringAvp::new(value.as_ref().to_vec()))
    }

    pub fn value(&self) -> &str {
        std::str::from_utf8(self.0.value()).unwrap_or("")
    }

    pub fn decode_from<R: Read>(reader: &mut R, len: usize) -> Result<IdentityAvp> {
        let avp = OctetStringAvp::decode_from(reader, len)?;
        Ok(IdentityAvp(avp))
    }

    pub fn encode_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.0.encode_to(writer)
    }

    pub fn length(&self) -> u32 {
        self.0.length()
    }
}

impl fmt::Display for IdentityAvp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_encode_decode_ascii() {
        let avp = IdentityAvp::new("example.com");
        let mut encoded = Vec::new();
        avp.encode_to(&mut encoded).unwrap();
        let mut cursor = Cursor::new(&encoded);
        let avp = IdentityAvp::decode_from(&mut cursor, encoded.len()).unwrap();
        assert_eq!(avp.value(), "example.com");
    }
}
