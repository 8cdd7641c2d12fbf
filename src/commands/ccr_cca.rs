//! Credit-Control-Request / Credit-Control-Answer (RFC 4006 §3.1/3.2),
//! command code 272, application id 4 — a worked example of an
//! application-layer command built on the same AVP/dictionary machinery as
//! the base protocol commands.

use super::{codes, emit, mflag, populate, AdditionalAvps, Entry};
use crate::avp;
use crate::avp::enumerated::EnumeratedAvp;
use crate::avp::group::GroupedAvp;
use crate::avp::identity::IdentityAvp;
use crate::avp::unsigned32::Unsigned32Avp;
use crate::avp::utf8string::UTF8StringAvp;
use crate::avp::Avp;
use crate::dictionary::Dictionary;
use crate::error::{Error, Result};
use crate::message::{application_ids, command_codes, CommandFlags, DiameterMessage};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CcRequestType {
    Initial = 1,
    Update = 2,
    Termination = 3,
    Event = 4,
}

impl Default for CcRequestType {
    fn default() -> CcRequestType {
        CcRequestType::Initial
    }
}

impl CcRequestType {
    fn from_i32(v: i32) -> Result<CcRequestType> {
        match v {
            1 => Ok(CcRequestType::Initial),
            2 => Ok(CcRequestType::Update),
            3 => Ok(CcRequestType::Termination),
            4 => Ok(CcRequestType::Event),
            other => Err(Error::InvalidAvpValue(format!(
                "unknown CC-Request-Type {}",
                other
            ))),
        }
    }
}

/// A Subscription-Id grouped AVP (443): type (450) + data (444).
#[derive(Debug, Clone)]
pub struct SubscriptionId {
    pub subscription_type: i32,
    pub data: String,
}

impl SubscriptionId {
    fn into_avp(self, dict: &Arc<Dictionary>) -> Avp {
        let children = vec![
            avp!(
                codes::SUBSCRIPTION_ID_TYPE,
                None,
                EnumeratedAvp::new(self.subscription_type),
                mflag(dict, None, codes::SUBSCRIPTION_ID_TYPE)
            ),
            avp!(
                codes::SUBSCRIPTION_ID_DATA,
                None,
                UTF8StringAvp::new(self.data),
                mflag(dict, None, codes::SUBSCRIPTION_ID_DATA)
            ),
        ];
        avp!(
            codes::SUBSCRIPTION_ID,
            None,
            GroupedAvp::new(children, Arc::clone(dict)),
            mflag(dict, None, codes::SUBSCRIPTION_ID)
        )
    }

    fn from_avp(avp: &Avp) -> Result<SubscriptionId> {
        let grouped = avp
            .get_grouped()
            .ok_or_else(|| Error::BadGrouped("Subscription-Id is not Grouped".into()))?;
        let children = grouped.avps()?;
        let subscription_type = children
            .iter()
            .find(|a| a.get_code() == codes::SUBSCRIPTION_ID_TYPE)
            .and_then(|a| a.get_enumerated())
            .ok_or(Error::MissingAvp("Subscription-Id-Type"))?;
        let data = children
            .iter()
            .find(|a| a.get_code() == codes::SUBSCRIPTION_ID_DATA)
            .and_then(|a| a.get_utf8string())
            .ok_or(Error::MissingAvp("Subscription-Id-Data"))?
            .to_string();
        Ok(SubscriptionId {
            subscription_type,
            data,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreditControlRequest {
    pub session_id: String,
    pub origin_host: String,
    pub origin_realm: String,
    pub destination_realm: String,
    pub cc_request_type: CcRequestType,
    pub cc_request_number: u32,
    pub subscription_ids: Vec<SubscriptionId>,
    pub additional_avps: Vec<Avp>,
}

impl AdditionalAvps for CreditControlRequest {
    fn additional_avps(&self) -> &[Avp] {
        &self.additional_avps
    }
    fn additional_avps_mut(&mut self) -> &mut Vec<Avp> {
        &mut self.additional_avps
    }
}

fn request_entries() -> Vec<Entry<CreditControlRequest>> {
    vec![
        Entry {
            code: codes::SESSION_ID,
            vendor_id: None,
            name: "Session-Id",
            required: true,
            emit: |t, d| vec![avp!(codes::SESSION_ID, None, UTF8StringAvp::new(t.session_id.clone()), mflag(d, None, codes::SESSION_ID))],
            consume: |t, a| {
                t.session_id = a.get_utf8string().ok_or(Error::MissingAvp("Session-Id"))?.to_string();
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
                t.origin_host = a.get_identity().ok_or(Error::MissingAvp("Origin-Host"))?.to_string();
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
                t.origin_realm = a.get_identity().ok_or(Error::MissingAvp("Origin-Realm"))?.to_string();
                Ok(())
            },
        },
        Entry {
            code: codes::DESTINATION_REALM,
            vendor_id: None,
            name: "Destination-Realm",
            required: true,
            emit: |t, d| vec![avp!(codes::DESTINATION_REALM, None, IdentityAvp::new(&t.destination_realm), mflag(d, None, codes::DESTINATION_REALM))],
            consume: |t, a| {
                t.destination_realm = a.get_identity().ok_or(Error::MissingAvp("Destination-Realm"))?.to_string();
                Ok(())
            },
        },
        Entry {
            code: codes::CC_REQUEST_TYPE,
            vendor_id: None,
            name: "CC-Request-Type",
            required: true,
            emit: |t, d| vec![avp!(codes::CC_REQUEST_TYPE, None, EnumeratedAvp::new(t.cc_request_type as i32), mflag(d, None, codes::CC_REQUEST_TYPE))],
            consume: |t, a| {
                let v = a.get_enumerated().ok_or(Error::MissingAvp("CC-Request-Type"))?;
                t.cc_request_type = CcRequestType::from_i32(v)?;
                Ok(())
            },
        },
        Entry {
            code: codes::CC_REQUEST_NUMBER,
            vendor_id: None,
            name: "CC-Request-Number",
            required: true,
            emit: |t, d| vec![avp!(codes::CC_REQUEST_NUMBER, None, Unsigned32Avp::new(t.cc_request_number), mflag(d, None, codes::CC_REQUEST_NUMBER))],
            consume: |t, a| {
                t.cc_request_number = a.get_unsigned32().ok_or(Error::MissingAvp("CC-Request-Number"))?;
                Ok(())
            },
        },
        Entry {
            code: codes::SUBSCRIPTION_ID,
            vendor_id: None,
            name: "Subscription-Id",
            required: false,
            emit: |t, d| t.subscription_ids.iter().cloned().map(|s| s.into_avp(d)).collect(),
            consume: |t, a| {
                t.subscription_ids.push(SubscriptionId::from_avp(a)?);
                Ok(())
            },
        },
    ]
}

impl CreditControlRequest {
    pub fn build(&self, hop_by_hop_id: u32, end_to_end_id: u32, dict: Arc<Dictionary>) -> DiameterMessage {
        let mut msg = DiameterMessage::new(
            command_codes::CREDIT_CONTROL,
            application_ids::CREDIT_CONTROL,
            CommandFlags::new(true, true, false, false),
            hop_by_hop_id,
            end_to_end_id,
            Arc::clone(&dict),
        );
        emit(&mut msg, self, &request_entries(), &dict);
        msg
    }

    pub fn from_message(msg: &DiameterMessage) -> Result<CreditControlRequest> {
        populate(msg, &request_entries())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreditControlAnswer {
    pub session_id: String,
    pub result_code: u32,
    pub origin_host: String,
    pub origin_realm: String,
    pub cc_request_type: CcRequestType,
    pub cc_request_number: u32,
    pub additional_avps: Vec<Avp>,
}

impl AdditionalAvps for CreditControlAnswer {
    fn additional_avps(&self) -> &[Avp] {
        &self.additional_avps
    }
    fn additional_avps_mut(&mut self) -> &mut Vec<Avp> {
        &mut self.additional_avps
    }
}

fn answer_entries() -> Vec<Entry<CreditControlAnswer>> {
    vec![
        Entry {
            code: codes::SESSION_ID,
            vendor_id: None,
            name: "Session-Id",
            required: true,
            emit: |t, d| vec![avp!(codes::SESSION_ID, None, UTF8StringAvp::new(t.session_id.clone()), mflag(d, None, codes::SESSION_ID))],
            consume: |t, a| {
                t.session_id = a.get_utf8string().ok_or(Error::MissingAvp("Session-Id"))?.to_string();
                Ok(())
            },
        },
        Entry {
            code: codes::RESULT_CODE,
            vendor_id: None,
            name: "Result-Code",
            required: true,
            emit: |t, d| vec![avp!(codes::RESULT_CODE, None, Unsigned32Avp::new(t.result_code), mflag(d, None, codes::RESULT_CODE))],
            consume: |t, a| {
                t.result_code = a.get_unsigned32().ok_or(Error::MissingAvp("Result-Code"))?;
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
                t.origin_host = a.get_identity().ok_or(Error::MissingAvp("Origin-Host"))?.to_string();
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
                t.origin_realm = a.get_identity().ok_or(Error::MissingAvp("Origin-Realm"))?.to_string();
                Ok(())
            },
        },
        Entry {
            code: codes::CC_REQUEST_TYPE,
            vendor_id: None,
            name: "CC-Request-Type",
            required: true,
            emit: |t, d| vec![avp!(codes::CC_REQUEST_TYPE, None, EnumeratedAvp::new(t.cc_request_type as i32), mflag(d, None, codes::CC_REQUEST_TYPE))],
            consume: |t, a| {
                let v = a.get_enumerated().ok_or(Error::MissingAvp("CC-Request-Type"))?;
                t.cc_request_type = CcRequestType::from_i32(v)?;
                Ok(())
            },
        },
        Entry {
            code: codes::CC_REQUEST_NUMBER,
            vendor_id: None,
            name: "CC-Request-Number",
            required: true,
            emit: |t, d| vec![avp!(codes::CC_REQUEST_NUMBER, None, Unsigned32Avp::new(t.cc_request_number), mflag(d, None, codes::CC_REQUEST_NUMBER))],
            consume: |t, a| {
                t.cc_request_number = a.get_unsigned32().ok_or(Error::MissingAvp("CC-Request-Number"))?;
                Ok(())
            },
        },
    ]
}

impl CreditControlAnswer {
    pub fn apply(&self, msg: &mut DiameterMessage) {
        let dict = Arc::clone(msg.dictionary());
        emit(msg, self, &answer_entries(), &dict);
    }

    pub fn from_message(msg: &DiameterMessage) -> Result<CreditControlAnswer> {
        populate(msg, &answer_entries())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Dictionary;
    use crate::result_code::DIAMETER_SUCCESS;

    #[test]
    fn test_ccr_with_subscription_id_roundtrip() {
        let dict = Arc::new(Dictionary::default());
        let ccr = CreditControlRequest {
            session_id: "host.example.com;1;2".into(),
            origin_host: "host.example.com".into(),
            origin_realm: "example.com".into(),
            destination_realm: "dest.example.com".into(),
            cc_request_type: CcRequestType::Initial,
            cc_request_number: 0,
            subscription_ids: vec![SubscriptionId {
                subscription_type: 0,
                data: "485079164547".into(),
            }],
            additional_avps: vec![],
        };
        let msg = ccr.build(1, 1, dict);
        let parsed = CreditControlRequest::from_message(&msg).unwrap();
        assert_eq!(parsed.cc_request_type, CcRequestType::Initial);
        assert_eq!(parsed.subscription_ids.len(), 1);
        assert_eq!(parsed.subscription_ids[0].data, "485079164547");
    }

    #[test]
    fn test_cca_roundtrip() {
        let dict = Arc::new(Dictionary::default());
        let ccr = CreditControlRequest {
            session_id: "host.example.com;1;2".into(),
            origin_host: "host.example.com".into(),
            origin_realm: "example.com".into(),
            destination_realm: "dest.example.com".into(),
            cc_request_type: CcRequestType::Event,
            cc_request_number: 0,
            subscription_ids: vec![],
            additional_avps: vec![],
        };
        let req = ccr.build(5, 5, Arc::clone(&dict));
        let mut ans = req.new_answer();
        CreditControlAnswer {
            session_id: ccr.session_id.clone(),
            result_code: DIAMETER_SUCCESS,
            origin_host: "dest.example.com".into(),
            origin_realm: "example.com".into(),
            cc_request_type: CcRequestType::Event,
            cc_request_number: 0,
            additional_avps: vec![],
        }
        .apply(&mut ans);

        let parsed = CreditControlAnswer::from_message(&ans).unwrap();
        assert_eq!(parsed.result_code, DIAMETER_SUCCESS);
    }
}
