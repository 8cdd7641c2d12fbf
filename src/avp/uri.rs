use crate::avp::octetstring::OctetStringAvp;
use crate::error::Result;
use std::fmt;
use std::io::Read;
use std::io::Write;

/// The DiameterURI wire AVP type: an opaque octet string holding `aaa://host[:port][;params]`.
///
/// For parsing/constructing the textual form used in peer configuration, see
/// [`crate::peer::uri::DiameterUri`].
#[derive(Debug, Clone, PartialEq)]
pub struct DiameterURIAvp(OctetStringAvp);

impl DiameterURIAvp {
    pub fn new(value: impl AsRef<[u8]>) -> DiameterURIAvp {
        DiameterURIAvp(OctetStringAvp::new(value.as_ref().to_vec()))
    }

    pub fn value(&self) -> &str {
        std::str::from_utf8(self.0.value()).unwrap_or("")
    }

    pub fn decode_from<R: Read>(reader: &mut R, len: usize) -> Result<DiameterURIAvp> {
        let avp = OctetStringAvp::decode_from(reader, len)?;
        Ok(DiameterURIAvp(avp))
    }

    pub fn encode_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.0.encode_to(writer)
    }

    pub fn length(&self) -> u32 {
        self.0.length()
    }
}

impl fmt::Display for DiameterURIAvp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_encode_decode() {
        let avp = DiameterURIAvp::new("aaa://dra2.gy.mno.net:3868");
        let mut encoded = Vec::new();
        avp.encode_to(&mut encoded).unwrap();
        let mut cursor = Cursor::new(&encoded);
        let avp = DiameterURIAvp::decode_from(&mut cursor, encoded.len()).unwrap();
        assert_eq!(avp.value(), "aaa://dra2.gy.mno.net:3868");
    }
}
