use crate::error::{Error, Result};
use std::fmt;
use std::io::Read;
use std::io::Write;
use std::net::{Ipv4Addr, Ipv6Addr};

const FAMILY_IPV4: u16 = 1;
const FAMILY_IPV6: u16 = 2;
const FAMILY_E164: u16 = 8;

/// The Address AVP basic type: a 2-byte address-family tag followed by
/// family-specific bytes (RFC 6733 §4.3.1).
#[derive(Debug, Clone, PartialEq)]
pub enum AddressAvp {
    IPv4(Ipv4Addr),
    IPv6(Ipv6Addr),
    E164(String),
    /// Any other registered address family; decoded as raw hex bytes.
    Other(u16, Vec<u8>),
}

impl AddressAvp {
    /// Parses a textual address into the Diameter Address AVP family it belongs to:
    /// dotted-quad or colon-hex for IPv4/IPv6, otherwise treated as E.164 digits.
    pub fn parse(text: &str) -> Result<AddressAvp> {
        if let Ok(v4) = text.parse::<Ipv4Addr>() {
            return Ok(AddressAvp::IPv4(v4));
        }
        if let Ok(v6) = text.parse::<Ipv6Addr>() {
            return Ok(AddressAvp::IPv6(v6));
        }
        if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(AddressAvp::E164(text.to_string()));
        }
        Err(Error::BadAddress(format!(
            "cannot infer address family for {:?}",
            text
        )))
    }

    pub fn decode_from<R: Read>(reader: &mut R, len: usize) -> Result<AddressAvp> {
        if len < 2 {
            return Err(Error::BadLength("address AVP shorter than 2 bytes".into()));
        }
        let mut family_b = [0u8; 2];
        reader.read_exact(&mut family_b)?;
        let family = u16::from_be_bytes(family_b);
        let mut rest = vec![0u8; len - 2];
        reader.read_exact(&mut rest)?;

        match family {
            FAMILY_IPV4 => {
                if rest.len() != 4 {
                    return Err(Error::BadAddress("IPv4 address must be 4 bytes".into()));
                }
                Ok(AddressAvp::IPv4(Ipv4Addr::new(
                    rest[0], rest[1], rest[2], rest[3],
                )))
            }
            FAMILY_IPV6 => {
                if rest.len() != 16 {
                    return Err(Error::BadAddress("IPv6 address must be 16 bytes".into()));
                }
                let octets: [u8; 16] = rest.as_slice().try_into()?;
                Ok(AddressAvp::IPv6(Ipv6Addr::from(octets)))
            }
            FAMILY_E164 => {
                let s = std::str::from_utf8(&rest).map_err(Error::BadUtf8)?;
                Ok(AddressAvp::E164(s.to_string()))
            }
            other => Ok(AddressAvp::Other(other, rest)),
        }
    }

    pub fn encode_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        match self {
            AddressAvp::IPv4(addr) => {
                writer.write_all(&FAMILY_IPV4.to_be_bytes())?;
                writer.write_all(&addr.octets())?;
            }
            AddressAvp::IPv6(addr) => {
                writer.write_all(&FAMILY_IPV6.to_be_bytes())?;
                writer.write_all(&addr.octets())?;
            }
            AddressAvp::E164(digits) => {
                writer.write_all(&FAMILY_E164.to_be_bytes())?;
                writer.write_all(digits.as_bytes())?;
            }
            AddressAvp::Other(family, raw) => {
                writer.write_all(&family.to_be_bytes())?;
                writer.write_all(raw)?;
            }
        }
        Ok(())
    }

    pub fn length(&self) -> u32 {
        2 + match self {
            AddressAvp::IPv4(_) => 4,
            AddressAvp::IPv6(_) => 16,
            AddressAvp::E164(digits) => digits.len() as u32,
            AddressAvp::Other(_, raw) => raw.len() as u32,
        }
    }
}

impl fmt::Display for AddressAvp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressAvp::IPv4(addr) => write!(f, "{}", addr),
            AddressAvp::IPv6(addr) => write!(f, "{}", addr),
            AddressAvp::E164(digits) => write!(f, "{}", digits),
            AddressAvp::Other(family, raw) => {
                write!(f, "family={} ", family)?;
                for (i, b) in raw.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn roundtrip(avp: &AddressAvp) -> AddressAvp {
        let mut encoded = Vec::new();
        avp.encode_to(&mut encoded).unwrap();
        let mut cursor = Cursor::new(&encoded);
        AddressAvp::decode_from(&mut cursor, encoded.len()).unwrap()
    }

    #[test]
    fn test_ipv4() {
        let avp = AddressAvp::parse("193.16.219.96").unwrap();
        assert_eq!(avp, AddressAvp::IPv4(Ipv4Addr::new(193, 16, 219, 96)));
        let mut encoded = Vec::new();
        avp.encode_to(&mut encoded).unwrap();
        assert_eq!(encoded, vec![0x00, 0x01, 0xC1, 0x10, 0xDB, 0x60]);
        assert_eq!(roundtrip(&avp), avp);
    }

    #[test]
    fn test_ipv6() {
        let text = "8b71:8c8a:1e29:716a:6184:7966:fd43:4200";
        let avp = AddressAvp::parse(text).unwrap();
        match &avp {
            AddressAvp::IPv6(_) => {}
            other => panic!("expected IPv6, got {:?}", other),
        }
        let mut encoded = Vec::new();
        avp.encode_to(&mut encoded).unwrap();
        assert_eq!(encoded.len(), 18);
        assert_eq!(&encoded[0..2], &[0x00, 0x02]);
        assert_eq!(roundtrip(&avp), avp);
    }

    #[test]
    fn test_e164() {
        let avp = AddressAvp::parse("48507909008").unwrap();
        assert_eq!(avp, AddressAvp::E164("48507909008".to_string()));
        let mut encoded = Vec::new();
        avp.encode_to(&mut encoded).unwrap();
        assert_eq!(&encoded[0..2], &[0x00, 0x08]);
        assert_eq!(&encoded[2..], b"48507909008");
        assert_eq!(roundtrip(&avp), avp);
    }

    #[test]
    fn test_unknown_family_decodes_as_hex() {
        let data = [0x00, 0x03, 0xDE, 0xAD, 0xBE, 0xEF];
        let mut cursor = Cursor::new(&data[..]);
        let avp = AddressAvp::decode_from(&mut cursor, data.len()).unwrap();
        assert_eq!(avp, AddressAvp::Other(3, vec![0xDE, 0xAD, 0xBE, 0xEF]));
    }
}
