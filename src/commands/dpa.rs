//! Disconnect-Peer-Answer (RFC 6733 §5.4.2), command code 282.

use super::{codes, mflag, populate, emit, AdditionalAvps, Entry};
use crate::avp;
use crate::avp::identity::IdentityAvp;
use crate::avp::unsigned32::Unsigned32Avp;
use crate::avp::Avp;
use crate::error::Result;
use crate::message::DiameterMessage;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct DisconnectPeerAnswer {
    pub result_code: u32,
    pub origin_host: String,
    pub origin_realm: String,
    pub additional_avps: Vec<Avp>,
}

impl AdditionalAvps for DisconnectPeerAnswer {
    fn additional_avps(&self) -> &[Avp] {
        &self.additional_avps
    }
    fn additional_avps_mut(&mut self) -> &mut Vec<Avp> {
        &mut self.additional_avps
    }
}

fn entries() -> Vec<Entry<DisconnectPeerAnswer>> {
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
    ]
}

impl DisconnectPeerAnswer {
    pub fn apply(&self, msg: &mut DiameterMessage) {
        let dict = Arc::clone(msg.dictionary());
        emit(msg, self, &entries(), &dict);
    }

    pub fn from_message(msg: &DiameterMessage) -> Result<DisconnectPeerAnswer> {
        populate(msg, &entries())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::dpr::{DisconnectCause, DisconnectPeerRequest};
    use crate::dictionary::Dictionary;
    use crate::result_code::DIAMETER_SUCCESS;

    #[test]
    fn test_answer_roundtrip() {
        let dict = Arc::new(Dictionary::default());
        let dpr = DisconnectPeerRequest {
            origin_host: "client.example.com".into(),
            origin_realm: "example.com".into(),
            disconnect_cause: DisconnectCause::Busy,
            additional_avps: vec![],
        };
        let req = dpr.build(3, 3, Arc::clone(&dict));
        let mut ans = req.new_answer();
        DisconnectPeerAnswer {
            result_code: DIAMETER_SUCCESS,
            origin_host: "server.example.com".into(),
            origin_realm: "example.com".into(),
            additional_avps: vec![],
        }
        .apply(&mut ans);

        let parsed = DisconnectPeerAnswer::from_message(&ans).unwrap();
        assert_eq!(parsed.result_code, DIAMETER_SUCCESS);
    }
}
