/*
 * AVP format:
 *   0                   1                   2                   3
 *   0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
 *  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
 *  |                           AVP Code                           |
 *  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
 *  |V M P r r r r r|                 AVP Length                    |
 *  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
 *  |                        Vendor-ID (opt)                       |
 *  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
 *  |                             Data ...
 *  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
 *
 * AVP Flags:
 *   0 1 2 3 4 5 6 7
 *  +-+-+-+-+-+-+-+-+  V(endor), M(andatory), P(rivate)
 *  |V M P r r r r r|  r(eserved)
 *  +-+-+-+-+-+-+-+-+
 */

pub mod address;
pub mod enumerated;
pub mod float32;
pub mod float64;
pub mod group;
pub mod identity;
pub mod integer32;
pub mod integer64;
pub mod octetstring;
pub mod time;
pub mod unsigned32;
pub mod unsigned64;
pub mod uri;
pub mod utf8string;

use crate::dictionary::Dictionary;
use crate::error::{Error, Result};
use core::fmt;
use std::io::Read;
use std::io::Write;
use std::sync::Arc;

use self::address::AddressAvp;
use self::enumerated::EnumeratedAvp;
use self::float32::Float32Avp;
use self::float64::Float64Avp;
use self::group::GroupedAvp;
use self::identity::IdentityAvp;
use self::integer32::Integer32Avp;
use self::integer64::Integer64Avp;
use self::octetstring::OctetStringAvp;
use self::time::TimeAvp;
use self::unsigned32::Unsigned32Avp;
use self::unsigned64::Unsigned64Avp;
use self::uri::DiameterURIAvp;
use self::utf8string::UTF8StringAvp;

const VENDOR_FLAG: u8 = 0x80;
const MANDATORY_FLAG: u8 = 0x40;
const PRIVATE_FLAG: u8 = 0x20;

/// The basic Diameter AVP data types (RFC 6733 §4.2), plus `Unknown` for
/// AVP codes absent from the dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvpType {
    Unknown,
    Address,
    Identity,
    DiameterURI,
    Enumerated,
    Float32,
    Float64,
    Grouped,
    Integer32,
    Integer64,
    OctetString,
    Time,
    Unsigned32,
    Unsigned64,
    UTF8String,
}

#[derive(Debug, Clone)]
pub struct Avp {
    header: AvpHeader,
    data: AvpData,
    padding: u8,
}

#[derive(Debug, Clone)]
pub struct AvpHeader {
    code: u32,
    flags: AvpFlags,
    length: u32,
    vendor_id: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvpFlags {
    pub vendor: bool,
    pub mandatory: bool,
    pub private: bool,
}

#[derive(Debug, Clone)]
pub enum AvpData {
    Address(AddressAvp),
    Identity(IdentityAvp),
    DiameterURI(DiameterURIAvp),
    Enumerated(EnumeratedAvp),
    Float32(Float32Avp),
    Float64(Float64Avp),
    Grouped(GroupedAvp),
    Integer32(Integer32Avp),
    Integer64(Integer64Avp),
    OctetString(OctetStringAvp),
    Time(TimeAvp),
    Unsigned32(Unsigned32Avp),
    Unsigned64(Unsigned64Avp),
    UTF8String(UTF8StringAvp),
    /// An AVP code unknown to the dictionary, carried through unparsed.
    Raw(Vec<u8>),
}

impl fmt::Display for AvpData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AvpData::Address(avp) => avp.fmt(f),
            AvpData::Identity(avp) => avp.fmt(f),
            AvpData::DiameterURI(avp) => avp.fmt(f),
            AvpData::Enumerated(avp) => avp.fmt(f),
            AvpData::Float32(avp) => avp.fmt(f),
            AvpData::Float64(avp) => avp.fmt(f),
            AvpData::Grouped(avp) => avp.fmt(f),
            AvpData::Integer32(avp) => avp.fmt(f),
            AvpData::Integer64(avp) => avp.fmt(f),
            AvpData::OctetString(avp) => avp.fmt(f),
            AvpData::Time(avp) => avp.fmt(f),
            AvpData::Unsigned32(avp) => avp.fmt(f),
            AvpData::Unsigned64(avp) => avp.fmt(f),
            AvpData::UTF8String(avp) => avp.fmt(f),
            AvpData::Raw(bytes) => {
                for (i, b) in bytes.iter().enumerate() {
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

impl PartialEq for AvpData {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AvpData::Address(a), AvpData::Address(b)) => a == b,
            (AvpData::Identity(a), AvpData::Identity(b)) => a == b,
            (AvpData::DiameterURI(a), AvpData::DiameterURI(b)) => a == b,
            (AvpData::Enumerated(a), AvpData::Enumerated(b)) => a == b,
            (AvpData::Float32(a), AvpData::Float32(b)) => a == b,
            (AvpData::Float64(a), AvpData::Float64(b)) => a == b,
            (AvpData::Grouped(a), AvpData::Grouped(b)) => a == b,
            (AvpData::Integer32(a), AvpData::Integer32(b)) => a == b,
            (AvpData::Integer64(a), AvpData::Integer64(b)) => a == b,
            (AvpData::OctetString(a), AvpData::OctetString(b)) => a == b,
            (AvpData::Time(a), AvpData::Time(b)) => a == b,
            (AvpData::Unsigned32(a), AvpData::Unsigned32(b)) => a == b,
            (AvpData::Unsigned64(a), AvpData::Unsigned64(b)) => a == b,
            (AvpData::UTF8String(a), AvpData::UTF8String(b)) => a == b,
            (AvpData::Raw(a), AvpData::Raw(b)) => a == b,
            _ => false,
        }
    }
}

impl AvpData {
    pub fn length(&self) -> u32 {
        match self {
            AvpData::Address(avp) => avp.length(),
            AvpData::Identity(avp) => avp.length(),
            AvpData::DiameterURI(avp) => avp.length(),
            AvpData::Enumerated(avp) => avp.length(),
            AvpData::Float32(avp) => avp.length(),
            AvpData::Float64(avp) => avp.length(),
            AvpData::Grouped(avp) => avp.length(),
            AvpData::Integer32(avp) => avp.length(),
            AvpData::Integer64(avp) => avp.length(),
            AvpData::OctetString(avp) => avp.length(),
            AvpData::Time(avp) => avp.length(),
            AvpData::Unsigned32(avp) => avp.length(),
            AvpData::Unsigned64(avp) => avp.length(),
            AvpData::UTF8String(avp) => avp.length(),
            AvpData::Raw(bytes) => bytes.len() as u32,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            AvpData::Address(_) => "Address",
            AvpData::Identity(_) => "Identity",
            AvpData::DiameterURI(_) => "DiameterURI",
            AvpData::Enumerated(_) => "Enumerated",
            AvpData::Float32(_) => "Float32",
            AvpData::Float64(_) => "Float64",
            AvpData::Grouped(_) => "Grouped",
            AvpData::Integer32(_) => "Integer32",
            AvpData::Integer64(_) => "Integer64",
            AvpData::OctetString(_) => "OctetString",
            AvpData::Time(_) => "Time",
            AvpData::Unsigned32(_) => "Unsigned32",
            AvpData::Unsigned64(_) => "Unsigned64",
            AvpData::UTF8String(_) => "UTF8String",
            AvpData::Raw(_) => "Unknown",
        }
    }

    fn encode_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        match self {
            AvpData::Address(avp) => avp.encode_to(writer),
            AvpData::Identity(avp) => avp.encode_to(writer),
            AvpData::DiameterURI(avp) => avp.encode_to(writer),
            AvpData::Enumerated(avp) => avp.encode_to(writer),
            AvpData::Float32(avp) => avp.encode_to(writer),
            AvpData::Float64(avp) => avp.encode_to(writer),
            AvpData::Grouped(avp) => avp.encode_to(writer),
            AvpData::Integer32(avp) => avp.encode_to(writer),
            AvpData::Integer64(avp) => avp.encode_to(writer),
            AvpData::OctetString(avp) => avp.encode_to(writer),
            AvpData::Time(avp) => avp.encode_to(writer),
            AvpData::Unsigned32(avp) => avp.encode_to(writer),
            AvpData::Unsigned64(avp) => avp.encode_to(writer),
            AvpData::UTF8String(avp) => avp.encode_to(writer),
            AvpData::Raw(bytes) => writer.write_all(bytes).map_err(Error::from),
        }
    }
}

macro_rules! from_avp_data {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for AvpData {
            fn from(value: $ty) -> Self {
                AvpData::$variant(value)
            }
        }
    };
}

from_avp_data!(AddressAvp, Address);
from_avp_data!(IdentityAvp, Identity);
from_avp_data!(DiameterURIAvp, DiameterURI);
from_avp_data!(EnumeratedAvp, Enumerated);
from_avp_data!(Float32Avp, Float32);
from_avp_data!(Float64Avp, Float64);
from_avp_data!(GroupedAvp, Grouped);
from_avp_data!(Integer32Avp, Integer32);
from_avp_data!(Integer64Avp, Integer64);
from_avp_data!(OctetStringAvp, OctetString);
from_avp_data!(TimeAvp, Time);
from_avp_data!(Unsigned32Avp, Unsigned32);
from_avp_data!(Unsigned64Avp, Unsigned64);
from_avp_data!(UTF8StringAvp, UTF8String);

impl AvpHeader {
    pub fn decode_from<R: Read>(reader: &mut R) -> Result<AvpHeader> {
        let mut b = [0; 8];
        reader.read_exact(&mut b)?;

        let code = u32::from_be_bytes([b[0], b[1], b[2], b[3]]);

        let flags = AvpFlags {
            vendor: (b[4] & VENDOR_FLAG) != 0,
            mandatory: (b[4] & MANDATORY_FLAG) != 0,
            private: (b[4] & PRIVATE_FLAG) != 0,
        };

        let length = u32::from_be_bytes([0, b[5], b[6], b[7]]);

        let vendor_id = if flags.vendor {
            let mut b = [0; 4];
            reader.read_exact(&mut b)?;
            Some(u32::from_be_bytes(b))
        } else {
            None
        };

        Ok(AvpHeader {
            code,
            flags,
            length,
            vendor_id,
        })
    }

    pub fn encode_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.code.to_be_bytes())?;

        let mut flags: u8 = 0;
        if self.flags.vendor {
            flags |= VENDOR_FLAG;
        }
        if self.flags.mandatory {
            flags |= MANDATORY_FLAG;
        }
        if self.flags.private {
            flags |= PRIVATE_FLAG;
        }
        writer.write_all(&[flags])?;
        writer.write_all(&self.length.to_be_bytes()[1..4])?;

        if let Some(vendor_id) = self.vendor_id {
            writer.write_all(&vendor_id.to_be_bytes())?;
        }

        Ok(())
    }

    fn own_length(&self) -> u32 {
        if self.vendor_id.is_some() {
            12
        } else {
            8
        }
    }
}

impl Avp {
    pub fn new(code: u32, vendor_id: Option<u32>, data: AvpData, mflag: bool, pflag: bool) -> Avp {
        let header = AvpHeader {
            code,
            flags: AvpFlags {
                vendor: vendor_id.is_some(),
                mandatory: mflag,
                private: pflag,
            },
            length: 0,
            vendor_id,
        };
        let padding = pad_to_32_bits(data.length());
        let length = header.own_length() + data.length();
        Avp {
            header: AvpHeader { length, ..header },
            data,
            padding,
        }
    }

    pub fn get_code(&self) -> u32 {
        self.header.code
    }

    pub fn get_flags(&self) -> &AvpFlags {
        &self.header.flags
    }

    pub fn get_vendor_id(&self) -> Option<u32> {
        self.header.vendor_id
    }

    pub fn get_length(&self) -> u32 {
        self.header.length
    }

    pub fn get_padding(&self) -> u8 {
        self.padding
    }

    pub fn get_data(&self) -> &AvpData {
        &self.data
    }

    pub fn decode_from<R: Read>(reader: &mut R, dict: Arc<Dictionary>) -> Result<Avp> {
        let header = AvpHeader::decode_from(reader)?;
        if header.length < header.own_length() {
            return Err(Error::BadLength(format!(
                "avp {} declares length {} shorter than its own header",
                header.code, header.length
            )));
        }
        let value_length = (header.length - header.own_length()) as usize;
        let avp_type = dict.get_avp_type(header.vendor_id, header.code);

        let data = match avp_type {
            AvpType::Address => AvpData::Address(AddressAvp::decode_from(reader, value_length)?),
            AvpType::Float32 => AvpData::Float32(Float32Avp::decode_from(reader)?),
            AvpType::Float64 => AvpData::Float64(Float64Avp::decode_from(reader)?),
            AvpType::Enumerated => AvpData::Enumerated(EnumeratedAvp::decode_from(reader)?),
            AvpType::Integer32 => AvpData::Integer32(Integer32Avp::decode_from(reader)?),
            AvpType::Integer64 => AvpData::Integer64(Integer64Avp::decode_from(reader)?),
            AvpType::Unsigned32 => AvpData::Unsigned32(Unsigned32Avp::decode_from(reader)?),
            AvpType::Unsigned64 => AvpData::Unsigned64(Unsigned64Avp::decode_from(reader)?),
            AvpType::UTF8String => {
                AvpData::UTF8String(UTF8StringAvp::decode_from(reader, value_length)?)
            }
            AvpType::OctetString => {
                AvpData::OctetString(OctetStringAvp::decode_from(reader, value_length)?)
            }
            AvpType::Identity => AvpData::Identity(IdentityAvp::decode_from(reader, value_length)?),
            AvpType::DiameterURI => {
                AvpData::DiameterURI(DiameterURIAvp::decode_from(reader, value_length)?)
            }
            AvpType::Time => AvpData::Time(TimeAvp::decode_from(reader)?),
            AvpType::Grouped => {
                let mut raw = vec![0u8; value_length];
                reader.read_exact(&mut raw)?;
                AvpData::Grouped(GroupedAvp::from_raw(raw, Arc::clone(&dict)))
            }
            AvpType::Unknown => {
                let mut raw = vec![0u8; value_length];
                reader.read_exact(&mut raw)?;
                AvpData::Raw(raw)
            }
        };

        let padding = pad_to_32_bits(value_length as u32);
        if padding > 0 {
            let mut discard = [0u8; 3];
            reader.read_exact(&mut discard[..padding as usize])?;
        }

        Ok(Avp {
            header,
            data,
            padding,
        })
    }

    pub fn encode_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.header.encode_to(writer)?;
        self.data.encode_to(writer)?;
        for _ in 0..self.padding {
            writer.write_all(&[0])?;
        }
        Ok(())
    }

    pub fn get_integer32(&self) -> Option<i32> {
        match &self.data {
            AvpData::Integer32(avp) => Some(avp.value()),
            _ => None,
        }
    }

    pub fn get_integer64(&self) -> Option<i64> {
        match &self.data {
            AvpData::Integer64(avp) => Some(avp.value()),
            _ => None,
        }
    }

    pub fn get_unsigned32(&self) -> Option<u32> {
        match &self.data {
            AvpData::Unsigned32(avp) => Some(avp.value()),
            _ => None,
        }
    }

    pub fn get_unsigned64(&self) -> Option<u64> {
        match &self.data {
            AvpData::Unsigned64(avp) => Some(avp.value()),
            _ => None,
        }
    }

    pub fn get_enumerated(&self) -> Option<i32> {
        match &self.data {
            AvpData::Enumerated(avp) => Some(avp.value()),
            _ => None,
        }
    }

    pub fn get_utf8string(&self) -> Option<&str> {
        match &self.data {
            AvpData::UTF8String(avp) => Some(avp.value()),
            _ => None,
        }
    }

    pub fn get_octetstring(&self) -> Option<&[u8]> {
        match &self.data {
            AvpData::OctetString(avp) => Some(avp.value()),
            _ => None,
        }
    }

    pub fn get_identity(&self) -> Option<&str> {
        match &self.data {
            AvpData::Identity(avp) => Some(avp.value()),
            _ => None,
        }
    }

    pub fn get_grouped(&self) -> Option<&GroupedAvp> {
        match &self.data {
            AvpData::Grouped(avp) => Some(avp),
            _ => None,
        }
    }
}

impl PartialEq for Avp {
    fn eq(&self, other: &Self) -> bool {
        self.header.code == other.header.code
            && self.header.vendor_id == other.header.vendor_id
            && self.data == other.data
    }
}

impl fmt::Display for Avp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(code={}, vendor_id={:?}) = {}",
            self.data.type_name(),
            self.header.code,
            self.header.vendor_id,
            self.data
        )
    }
}

fn pad_to_32_bits(length: u32) -> u8 {
    ((4 - (length & 0b11)) % 4) as u8
}

#[macro_export]
macro_rules! avp {
    ($code:expr, $vendor_id:expr, $value:expr) => {
        $crate::avp::Avp::new($code, $vendor_id, $value.into(), false, false)
    };
    ($code:expr, $vendor_id:expr, $value:expr, $mflag:expr) => {
        $crate::avp::Avp::new($code, $vendor_id, $value.into(), $mflag, false)
    };
    ($code:expr, $vendor_id:expr, $value:expr, $mflag:expr, $pflag:expr) => {
        $crate::avp::Avp::new($code, $vendor_id, $value.into(), $mflag, $pflag)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Dictionary;
    use std::io::Cursor;

    fn dict() -> Arc<Dictionary> {
        Arc::new(Dictionary::default())
    }

    #[test]
    fn test_decode_encode_header() {
        let data = [
            0x00, 0x00, 0x00, 0x64, // code
            0x40, 0x00, 0x00, 0x0C, // flags, length
        ];

        let mut cursor = Cursor::new(&data);
        let header = AvpHeader::decode_from(&mut cursor).unwrap();

        assert_eq!(header.code, 100);
        assert_eq!(header.length, 12);
        assert!(!header.flags.vendor);
        assert!(header.flags.mandatory);
        assert!(!header.flags.private);
        assert_eq!(header.vendor_id, None);

        let mut encoded = Vec::new();
        header.encode_to(&mut encoded).unwrap();
        assert_eq!(encoded, data);
    }

    #[test]
    fn test_decode_encode_header_with_vendor() {
        let data = [
            0x00, 0x00, 0x00, 0x64, // code
            0x80, 0x00, 0x00, 0x0C, // flags, length
            0x00, 0x00, 0x00, 0xC8, // vendor_id
        ];

        let mut cursor = Cursor::new(&data);
        let header = AvpHeader::decode_from(&mut cursor).unwrap();

        assert_eq!(header.code, 100);
        assert_eq!(header.length, 12);
        assert!(header.flags.vendor);
        assert_eq!(header.vendor_id, Some(200));

        let mut encoded = Vec::new();
        header.encode_to(&mut encoded).unwrap();
        assert_eq!(encoded, data);
    }

    #[test]
    fn test_roundtrip_known_avp() {
        let dict = dict();
        let avp = avp!(415, None, Unsigned32Avp::new(42), true);
        let mut encoded = Vec::new();
        avp.encode_to(&mut encoded).unwrap();
        let mut cursor = Cursor::new(&encoded);
        let decoded = Avp::decode_from(&mut cursor, dict).unwrap();
        assert_eq!(decoded.get_unsigned32(), Some(42));
        assert_eq!(decoded.get_code(), 415);
    }

    #[test]
    fn test_unknown_avp_decodes_as_raw() {
        let dict = dict();
        let avp = Avp::new(999999, None, AvpData::Raw(vec![1, 2, 3, 4]), false, false);
        let mut encoded = Vec::new();
        avp.encode_to(&mut encoded).unwrap();
        let mut cursor = Cursor::new(&encoded);
        let decoded = Avp::decode_from(&mut cursor, dict).unwrap();
        match decoded.get_data() {
            AvpData::Raw(bytes) => assert_eq!(bytes, &[1, 2, 3, 4]),
            other => panic!("expected Raw, got {:?}", other),
        }
    }
}
