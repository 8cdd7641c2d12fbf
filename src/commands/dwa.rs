//! Device-Watchdog-Answer (RFC 6733 §5.5.2), command code 280.

use super::{codes, mflag, populate, emit, AdditionalAvps, Entry};
use crate::avp;
use crate::avp::identity::IdentityAvp;
use crate::avp::unsigned32::Unsigned32Avp;
use crate::avp::Avp;
use crate::dictionary::Dictionary;
use crate::error::Result;
use crate::message::DiameterMessage;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct DeviceWatchdogAnswer {
    pub result_code: u32,
    pub origin_host: String,
    pub origin_realm: String,
    pub origin_state_id: Option<u32>,
    pub additional_avps: Vec<Avp>,
}

impl AdditionalAvps for DeviceWatchdogAnswer {
    fn additional_avps(&self) -> &[Avp] {
        &self.additional_avps
    }
    fn additional_avps_mut(&mut self) -> &mut Vec<Avp> {
        &mut self.additional_avps
    }
}

fn entries() -> Vec<Entry<DeviceWatchdogAnswer>> {
    vec![
        Entry {
            code: codes::RESULT_CODE,
            vendor_id: None,
            name: "Result-Code",
            required: true,
            emit: |t, d| vec![avp!(codes::RESULT_CODE, None, Unsigned32Avp::new(t.result_code), mflag(d, None, codes::RESULT_CODE))],
            consume: |t, a| {
                t.result_code = a.get_unsigned32().ok_or(crate::error::Error::MissingAvp("Result-Code"))?;
                Ok(())
            },
        },
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

impl DeviceWatchdogAnswer {
    pub fn apply(&self, msg: &mut DiameterMessage) {
        let dict = Arc::clone(msg.dictionary());
        emit(msg, self, &entries(), &dict);
    }

    pub fn from_message(msg: &DiameterMessage) -> Result<DeviceWatchdogAnswer> {
        populate(msg, &entries())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::dwr::DeviceWatchdogRequest;
    use crate::dictionary::Dictionary;
    use crate::result_code::DIAMETER_SUCCESS;
    use std::sync::Arc;

    #[test]
    fn test_answer_roundtrip() {
        let dict = Arc::new(Dictionary::default());
        let dwr = DeviceWatchdogRequest {
            origin_host: "client.example.com".into(),
            origin_realm: "example.com".into(),
            origin_state_id: None,
            additional_avps: vec![],
        };
        let req = dwr.build(9, 9, Arc::clone(&dict));
        let mut ans = req.new_answer();
        DeviceWatchdogAnswer {
            result_code: DIAMETER_SUCCESS,
            origin_host: "server.example.com".into(),
            origin_realm: "example.com".into(),
            origin_state_id: None,
            additional_avps: vec![],
        }
        .apply(&mut ans);

        let parsed = DeviceWatchdogAnswer::from_message(&ans).unwrap();
        assert_eq!(parsed.result_code, DIAMETER_SUCCESS);
        assert_eq!(ans.get_hop_by_hop_id(), 9);
    }
}
