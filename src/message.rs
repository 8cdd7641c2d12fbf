//! Diameter message header and the raw, dictionary-driven AVP container.
//!
//! Raw packet format:
//!   0                   1                   2                   3
//!   0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |    Version    |                 Message Length                |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  | command flags |                  Command-Code                 |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |                         Application-ID                        |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |                      Hop-by-Hop Identifier                    |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |                      End-to-End Identifier                    |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!
//! Command Flags:
//!   0 1 2 3 4 5 6 7
//!  +-+-+-+-+-+-+-+-+  R(equest), P(roxyable), E(rror)
//!  |R P E T r r r r|  T(Potentially re-transmitted message), r(eserved)
//!  +-+-+-+-+-+-+-+-+

use crate::avp::Avp;
use crate::dictionary::Dictionary;
use crate::error::{Error, Result};
use std::fmt;
use std::io::Cursor;
use std::io::Read;
use std::io::Write;
use std::sync::Arc;

pub const DIAMETER_VERSION: u8 = 1;

/// Well-known base-protocol command codes (RFC 6733 §3).
pub mod command_codes {
    pub const CAPABILITIES_EXCHANGE: u32 = 257;
    pub const DEVICE_WATCHDOG: u32 = 280;
    pub const DISCONNECT_PEER: u32 = 282;
    pub const RE_AUTH: u32 = 258;
    pub const SESSION_TERMINATE: u32 = 275;
    pub const ABORT_SESSION: u32 = 274;
    pub const ACCOUNTING: u32 = 271;
    pub const CREDIT_CONTROL: u32 = 272;
}

/// Well-known application identifiers (RFC 6733 §2.4).
pub mod application_ids {
    pub const COMMON: u32 = 0;
    pub const ACCOUNTING: u32 = 3;
    pub const CREDIT_CONTROL: u32 = 4;
}

/// Command flag bit values (RFC 6733 §3).
pub mod flags {
    pub const REQUEST: u8 = 0x80;
    pub const PROXYABLE: u8 = 0x40;
    pub const ERROR: u8 = 0x20;
    pub const RETRANSMIT: u8 = 0x10;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandFlags(pub u8);

impl CommandFlags {
    pub fn new(request: bool, proxyable: bool, error: bool, retransmit: bool) -> CommandFlags {
        let mut bits = 0u8;
        if request {
            bits |= flags::REQUEST;
        }
        if proxyable {
            bits |= flags::PROXYABLE;
        }
        if error {
            bits |= flags::ERROR;
        }
        if retransmit {
            bits |= flags::RETRANSMIT;
        }
        CommandFlags(bits)
    }

    pub fn is_request(&self) -> bool {
        self.0 & flags::REQUEST != 0
    }

    pub fn is_proxyable(&self) -> bool {
        self.0 & flags::PROXYABLE != 0
    }

    pub fn is_error(&self) -> bool {
        self.0 & flags::ERROR != 0
    }

    pub fn is_retransmit(&self) -> bool {
        self.0 & flags::RETRANSMIT != 0
    }
}

impl fmt::Display for CommandFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}",
            if self.is_request() { "R" } else { "-" },
            if self.is_proxyable() { "P" } else { "-" },
            if self.is_error() { "E" } else { "-" },
            if self.is_retransmit() { "T" } else { "-" },
        )
    }
}

#[derive(Debug, Clone)]
pub struct DiameterHeader {
    pub version: u8,
    pub length: u32,
    pub flags: CommandFlags,
    pub command_code: u32,
    pub application_id: u32,
    pub hop_by_hop_id: u32,
    pub end_to_end_id: u32,
}

const HEADER_LEN: u32 = 20;

impl DiameterHeader {
    pub fn decode_from<R: Read>(reader: &mut R) -> Result<DiameterHeader> {
        let mut b = [0u8; HEADER_LEN as usize];
        reader.read_exact(&mut b)?;

        let version = b[0];
        let length = u32::from_be_bytes([0, b[1], b[2], b[3]]);
        let flags = CommandFlags(b[4]);
        let command_code = u32::from_be_bytes([0, b[5], b[6], b[7]]);
        let application_id = u32::from_be_bytes([b[8], b[9], b[10], b[11]]);
        let hop_by_hop_id = u32::from_be_bytes([b[12], b[13], b[14], b[15]]);
        let end_to_end_id = u32::from_be_bytes([b[16], b[17], b[18], b[19]]);

        if version != DIAMETER_VERSION {
            return Err(Error::BadFraming(format!(
                "unsupported Diameter version {}",
                version
            )));
        }

        Ok(DiameterHeader {
            version,
            length,
            flags,
            command_code,
            application_id,
            hop_by_hop_id,
            end_to_end_id,
        })
    }

    pub fn encode_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&[self.version])?;
        writer.write_all(&self.length.to_be_bytes()[1..4])?;
        writer.write_all(&[self.flags.0])?;
        writer.write_all(&self.command_code.to_be_bytes()[1..4])?;
        writer.write_all(&self.application_id.to_be_bytes())?;
        writer.write_all(&self.hop_by_hop_id.to_be_bytes())?;
        writer.write_all(&self.end_to_end_id.to_be_bytes())?;
        Ok(())
    }
}

impl fmt::Display for DiameterHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "code={} app={} flags={} hbh={} e2e={}",
            self.command_code,
            self.application_id,
            self.flags,
            self.hop_by_hop_id,
            self.end_to_end_id
        )
    }
}

/// A raw Diameter message: a header plus a flat, dictionary-typed AVP list.
///
/// Typed helpers live in [`crate::commands`], which build and read these
/// through a declarative attribute table rather than duplicating field
/// layout here.
#[derive(Debug, Clone)]
pub struct DiameterMessage {
    pub header: DiameterHeader,
    avps: Vec<Avp>,
    dict: Arc<Dictionary>,
}

impl DiameterMessage {
    pub fn new(
        command_code: u32,
        application_id: u32,
        flags: CommandFlags,
        hop_by_hop_id: u32,
        end_to_end_id: u32,
        dict: Arc<Dictionary>,
    ) -> DiameterMessage {
        DiameterMessage {
            header: DiameterHeader {
                version: DIAMETER_VERSION,
                length: HEADER_LEN,
                flags,
                command_code,
                application_id,
                hop_by_hop_id,
                end_to_end_id,
            },
            avps: Vec::new(),
            dict,
        }
    }

    /// Builds the answer's header from this request: same codes and ids,
    /// REQUEST flag cleared, others preserved.
    pub fn new_answer(&self) -> DiameterMessage {
        let mut answer_flags = self.header.flags;
        answer_flags.0 &= !flags::REQUEST;
        DiameterMessage::new(
            self.header.command_code,
            self.header.application_id,
            answer_flags,
            self.header.hop_by_hop_id,
            self.header.end_to_end_id,
            Arc::clone(&self.dict),
        )
    }

    pub fn dictionary(&self) -> &Arc<Dictionary> {
        &self.dict
    }

    pub fn get_command_code(&self) -> u32 {
        self.header.command_code
    }

    pub fn get_application_id(&self) -> u32 {
        self.header.application_id
    }

    pub fn get_flags(&self) -> CommandFlags {
        self.header.flags
    }

    pub fn is_request(&self) -> bool {
        self.header.flags.is_request()
    }

    pub fn get_hop_by_hop_id(&self) -> u32 {
        self.header.hop_by_hop_id
    }

    pub fn get_end_to_end_id(&self) -> u32 {
        self.header.end_to_end_id
    }

    pub fn avps(&self) -> &[Avp] {
        &self.avps
    }

    pub fn add_avp(&mut self, avp: Avp) {
        self.header.length += avp.get_length() + avp.get_padding() as u32;
        self.avps.push(avp);
    }

    pub fn get_avp(&self, code: u32) -> Option<&Avp> {
        self.avps.iter().find(|avp| avp.get_code() == code)
    }

    pub fn get_avps(&self, code: u32) -> impl Iterator<Item = &Avp> {
        self.avps.iter().filter(move |avp| avp.get_code() == code)
    }

    pub fn decode_from<R: Read>(reader: &mut R, dict: Arc<Dictionary>) -> Result<DiameterMessage> {
        let header = DiameterHeader::decode_from(reader)?;
        if header.length < HEADER_LEN {
            return Err(Error::BadFraming(format!(
                "message length {} shorter than the header itself",
                header.length
            )));
        }

        let body_len = (header.length - HEADER_LEN) as usize;
        let mut body = vec![0u8; body_len];
        reader.read_exact(&mut body)?;

        let mut cursor = Cursor::new(body);
        let mut avps = Vec::new();
        while (cursor.position() as usize) < body_len {
            let avp = Avp::decode_from(&mut cursor, Arc::clone(&dict))?;
            avps.push(avp);
        }

        Ok(DiameterMessage { header, avps, dict })
    }

    pub fn encode_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.header.encode_to(writer)?;
        for avp in &self.avps {
            avp.encode_to(writer)?;
        }
        Ok(())
    }
}

impl fmt::Display for DiameterMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dict.get_command(self.header.command_code, self.header.application_id) {
            Some(cmd) => writeln!(f, "{} ({})", self.header, cmd.name)?,
            None => writeln!(f, "{}", self.header)?,
        }
        for avp in &self.avps {
            match self.dict.get_avp_name(avp.get_vendor_id(), avp.get_code()) {
                Some(name) => writeln!(f, "  {} [{}]", avp, name)?,
                None => writeln!(f, "  {}", avp)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avp;
    use crate::avp::identity::IdentityAvp;
    use crate::avp::unsigned32::Unsigned32Avp;
    use crate::avp::utf8string::UTF8StringAvp;
    use crate::dictionary::Dictionary;

    fn dict() -> Arc<Dictionary> {
        Arc::new(Dictionary::default())
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let dict = dict();
        let mut msg = DiameterMessage::new(
            command_codes::CREDIT_CONTROL,
            application_ids::CREDIT_CONTROL,
            CommandFlags::new(true, false, false, false),
            1123158611,
            3102381851,
            Arc::clone(&dict),
        );
        msg.add_avp(avp!(264, None, IdentityAvp::new("host.example.com"), true));
        msg.add_avp(avp!(263, None, UTF8StringAvp::new("ses;12345888"), true));
        msg.add_avp(avp!(415, None, Unsigned32Avp::new(1000), true));

        let mut encoded = Vec::new();
        msg.encode_to(&mut encoded).unwrap();

        let decoded = DiameterMessage::decode_from(&mut Cursor::new(encoded), dict).unwrap();
        assert_eq!(decoded.get_command_code(), command_codes::CREDIT_CONTROL);
        assert_eq!(decoded.avps().len(), 3);
        assert_eq!(decoded.get_avp(263).unwrap().get_utf8string(), Some("ses;12345888"));
    }

    #[test]
    fn test_new_answer_clears_request_flag() {
        let dict = dict();
        let req = DiameterMessage::new(
            command_codes::CAPABILITIES_EXCHANGE,
            application_ids::COMMON,
            CommandFlags::new(true, false, false, false),
            42,
            43,
            dict,
        );
        let ans = req.new_answer();
        assert!(!ans.is_request());
        assert_eq!(ans.get_hop_by_hop_id(), 42);
        assert_eq!(ans.get_end_to_end_id(), 43);
    }
}
