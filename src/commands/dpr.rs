//! Disconnect-Peer-Request (RFC 6733 §5.4.1), command code 282.

use super::{codes, mflag, populate, emit, AdditionalAvps, Entry};
use crate::avp;
use crate::avp::enumerated::EnumeratedAvp;
use crate::avp::identity::IdentityAvp;
use crate::avp::Avp;
use crate::dictionary::Dictionary;
use crate::error::Result;
use crate::message::{application_ids, command_codes, CommandFlags, DiameterMessage};
use std::sync::Arc;

/// Disconnect-Cause AVP (273) values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectCause {
    Rebooting = 0,
    Busy = 1,
    DoNotWantToTalkToYou = 2,
}

impl Default for DisconnectCause {
    fn default() -> DisconnectCause {
        DisconnectCause::Rebooting
    }
}

impl DisconnectCause {
    fn from_i32(v: i32) -> Result<DisconnectCause> {
        match v {
            0 => Ok(DisconnectCause::Rebooting),
            1 => Ok(DisconnectCause::Busy),
            2 => Ok(DisconnectCause::DoNotWantToTalkToYou),
            other => Err(crate::error::Error::InvalidAvpValue(format!(
                "unknown Disconnect-Cause {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DisconnectPeerRequest {
    pub origin_host: String,
    pub origin_realm: String,
    pub disconnect_cause: DisconnectCause,
    pub additional_avps: Vec<Avp>,
}

impl AdditionalAvps for DisconnectPeerRequest {
    fn additional_avps(&self) -> &[Avp] {
        &self.additional_avps
    }
    fn additional_avps_mut(&mut self) -> &mut Vec<Avp> {
        &mut self.additional_avps
    }
}

fn entries() -> Vec<Entry<DisconnectPeerRequest>> {
    vec![
        Entry {
            code: codes::ORIGIN_HOST,
            vendor_id: None,
            name: "Origin-Host",
            required: true,
            emit: |t, d| vec![avp!(codes::ORIGIN_HOST, None, IdentityAvp::new(&t.origin_host), mflag(d, None, codes::ORIGIN_HOST))],
            consume: |t, a| {
                t.origin_host = a.get_identity().ok_or(crate::error::Error::MissingAvp("Origin-Host"))?.to_string();
                Ok(())
            },
        },
        Entry {
            code: codes::ORIGIN_REALM,
            vendor_id: None,
            name: "Origin-Realm",
            required: true,
            emit: |t, d| vec![avp!(codes::ORIGIN_REALM, None, IdentityAvp::new(&t.origin_realm), mflag(d, None, codes::ORIGIN_REALM))],
            consume: |t, a| {
                t.origin_realm = a.get_identity().ok_or(crate::error::Error::MissingAvp("Origin-Realm"))?.to_string();
                Ok(())
            },
        },
        Entry {
            code: codes::DISCONNECT_CAUSE,
            vendor_id: None,
            name: "Disconnect-Cause",
            required: true,
            emit: |t, d| vec![avp!(codes::DISCONNECT_CAUSE, None, EnumeratedAvp::new(t.disconnect_cause as i32), mflag(d, None, codes::DISCONNECT_CAUSE))],
            consume: |t, a| {
                let v = a.get_enumerated().ok_or(crate::error::Error::MissingAvp("Disconnect-Cause"))?;
                t.disconnect_cause = DisconnectCause::from_i32(v)?;
                Ok(())
            },
        },
    ]
}

impl DisconnectPeerRequest {
    pub fn build(&self, hop_by_hop_id: u32, end_to_end_id: u32, dict: Arc<Dictionary>) -> DiameterMessage {
        let mut msg = DiameterMessage::new(
            command_codes::DISCONNECT_PEER,
            application_ids::COMMON,
            CommandFlags::new(true, false, false, false),
            hop_by_hop_id,
            end_to_end_id,
            Arc::clone(&dict),
        );
        emit(&mut msg, self, &entries(), &dict);
        msg
    }

    pub fn from_message(msg: &DiameterMessage) -> Result<DisconnectPeerRequest> {
        populate(msg, &entries())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Dictionary;

    #[test]
    fn test_build_and_parse() {
        let dict = Arc::new(Dictionary::default());
        let dpr = DisconnectPeerRequest {
            origin_host: "host.example.com".into(),
            origin_realm: "example.com".into(),
            disconnect_cause: DisconnectCause::Rebooting,
            additional_avps: vec![],
        };
        let msg = dpr.build(1, 1, dict);
        let parsed = DisconnectPeerRequest::from_message(&msg).unwrap();
        assert_eq!(parsed.disconnect_cause, DisconnectCause::Rebooting);
    }
}
