//! Device-Watchdog-Request (RFC 6733 §5.5.1), command code 280.

use super::{codes, mflag, populate, emit, AdditionalAvps, Entry};
use crate::avp;
use crate::avp::identity::IdentityAvp;
use crate::avp::unsigned32::Unsigned32Avp;
use crate::avp::Avp;
use crate::dictionary::Dictionary;
use crate::error::Result;
use crate::message::{application_ids, command_codes, CommandFlags, DiameterMessage};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct DeviceWatchdogRequest {
    pub origin_host: String,
    pub origin_realm: String,
    pub origin_state_id: Option<u32>,
    pub additional_avps: Vec<Avp>,
}

impl AdditionalAvps for DeviceWatchdogRequest {
    fn additional_avps(&self) -> &[Avp] {
        &self.additional_avps
    }
    fn additional_avps_mut(&mut self) -> &mut Vec<Avp> {
        &mut self.additional_avps
    }
}

fn entries() -> Vec<Entry<DeviceWatchdogRequest>> {
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
            code: codes::ORIGIN_STATE_ID,
            vendor_id: None,
            name: "Origin-State-Id",
            required: false,
            emit: |t, d| match t.origin_state_id {
                Some(v) => vec![avp!(codes::ORIGIN_STATE_ID, None, Unsigned32Avp::new(v), mflag(d, None, codes::ORIGIN_STATE_ID))],
                None => vec![],
            },
            consume: |t, a| {
                t.origin_state_id = a.get_unsigned32();
                Ok(())
            },
        },
    ]
}

impl DeviceWatchdogRequest {
    pub fn build(&self, hop_by_hop_id: u32, end_to_end_id: u32, dict: Arc<Dictionary>) -> DiameterMessage {
        let mut msg = DiameterMessage::new(
            command_codes::DEVICE_WATCHDOG,
            application_ids::COMMON,
            CommandFlags::new(true, false, false, false),
            hop_by_hop_id,
            end_to_end_id,
            Arc::clone(&dict),
        );
        emit(&mut msg, self, &entries(), &dict);
        msg
    }

    pub fn from_message(msg: &DiameterMessage) -> Result<DeviceWatchdogRequest> {
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
        let dwr = DeviceWatchdogRequest {
            origin_host: "host.example.com".into(),
            origin_realm: "example.com".into(),
            origin_state_id: Some(7),
            additional_avps: vec![],
        };
        let msg = dwr.build(1, 1, dict);
        assert_eq!(msg.get_command_code(), crate::message::command_codes::DEVICE_WATCHDOG);
        let parsed = DeviceWatchdogRequest::from_message(&msg).unwrap();
        assert_eq!(parsed.origin_state_id, Some(7));
    }
}
