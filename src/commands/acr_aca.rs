//! Accounting-Request / Accounting-Answer (RFC 6733 §9.7.1/9.7.2),
//! command code 271, application id 3.

use super::{codes, emit, mflag, populate, AdditionalAvps, Entry};
use crate::avp;
use crate::avp::enumerated::EnumeratedAvp;
use crate::avp::identity::IdentityAvp;
use crate::avp::unsigned32::Unsigned32Avp;
use crate::avp::utf8string::UTF8StringAvp;
use crate::avp::Avp;
use crate::dictionary::Dictionary;
use crate::error::{Error, Result};
use crate::message::{application_ids, command_codes, CommandFlags, DiameterMessage};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountingRecordType {
    Event = 1,
    Start = 2,
    Interim = 3,
    Stop = 4,
}

impl Default for AccountingRecordType {
    fn default() -> AccountingRecordType {
        AccountingRecordType::Event
    }
}

impl AccountingRecordType {
    fn from_i32(v: i32) -> Result<AccountingRecordType> {
        match v {
            1 => Ok(AccountingRecordType::Event),
            2 => Ok(AccountingRecordType::Start),
            3 => Ok(AccountingRecordType::Interim),
            4 => Ok(AccountingRecordType::Stop),
            other => Err(Error::InvalidAvpValue(format!(
                "unknown Accounting-Record-Type {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AccountingRequest {
    pub session_id: String,
    pub origin_host: String,
    pub origin_realm: String,
    pub destination_realm: String,
    pub accounting_record_type: AccountingRecordType,
    pub accounting_record_number: u32,
    pub additional_avps: Vec<Avp>,
}

impl AdditionalAvps for AccountingRequest {
    fn additional_avps(&self) -> &[Avp] {
        &self.additional_avps
    }
    fn additional_avps_mut(&mut self) -> &mut Vec<Avp> {
        &mut self.additional_avps
    }
}

fn request_entries() -> Vec<Entry<AccountingRequest>> {
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
            code: codes::ACCOUNTING_RECORD_TYPE,
            vendor_id: None,
            name: "Accounting-Record-Type",
            required: true,
            emit: |t, d| vec![avp!(codes::ACCOUNTING_RECORD_TYPE, None, EnumeratedAvp::new(t.accounting_record_type as i32), mflag(d, None, codes::ACCOUNTING_RECORD_TYPE))],
            consume: |t, a| {
                let v = a.get_enumerated().ok_or(Error::MissingAvp("Accounting-Record-Type"))?;
                t.accounting_record_type = AccountingRecordType::from_i32(v)?;
                Ok(())
            },
        },
        Entry {
            code: codes::ACCOUNTING_RECORD_NUMBER,
            vendor_id: None,
            name: "Accounting-Record-Number",
            required: true,
            emit: |t, d| vec![avp!(codes::ACCOUNTING_RECORD_NUMBER, None, Unsigned32Avp::new(t.accounting_record_number), mflag(d, None, codes::ACCOUNTING_RECORD_NUMBER))],
            consume: |t, a| {
                t.accounting_record_number = a.get_unsigned32().ok_or(Error::MissingAvp("Accounting-Record-Number"))?;
                Ok(())
            },
        },
    ]
}

impl AccountingRequest {
    pub fn build(&self, hop_by_hop_id: u32, end_to_end_id: u32, dict: Arc<Dictionary>) -> DiameterMessage {
        let mut msg = DiameterMessage::new(
            command_codes::ACCOUNTING,
            application_ids::ACCOUNTING,
            CommandFlags::new(true, true, false, false),
            hop_by_hop_id,
            end_to_end_id,
            Arc::clone(&dict),
        );
        emit(&mut msg, self, &request_entries(), &dict);
        msg
    }

    pub fn from_message(msg: &DiameterMessage) -> Result<AccountingRequest> {
        populate(msg, &request_entries())
    }
}

#[derive(Debug, Clone, Default)]
pub struct AccountingAnswer {
    pub session_id: String,
    pub result_code: u32,
    pub origin_host: String,
    pub origin_realm: String,
    pub accounting_record_type: AccountingRecordType,
    pub accounting_record_number: u32,
    pub additional_avps: Vec<Avp>,
}

impl AdditionalAvps for AccountingAnswer {
    fn additional_avps(&self) -> &[Avp] {
        &self.additional_avps
    }
    fn additional_avps_mut(&mut self) -> &mut Vec<Avp> {
        &mut self.additional_avps
    }
}

fn answer_entries() -> Vec<Entry<AccountingAnswer>> {
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
            code: codes::ACCOUNTING_RECORD_TYPE,
            vendor_id: None,
            name: "Accounting-Record-Type",
            required: true,
            emit: |t, d| vec![avp!(codes::ACCOUNTING_RECORD_TYPE, None, EnumeratedAvp::new(t.accounting_record_type as i32), mflag(d, None, codes::ACCOUNTING_RECORD_TYPE))],
            consume: |t, a| {
                let v = a.get_enumerated().ok_or(Error::MissingAvp("Accounting-Record-Type"))?;
                t.accounting_record_type = AccountingRecordType::from_i32(v)?;
                Ok(())
            },
        },
        Entry {
            code: codes::ACCOUNTING_RECORD_NUMBER,
            vendor_id: None,
            name: "Accounting-Record-Number",
            required: true,
            emit: |t, d| vec![avp!(codes::ACCOUNTING_RECORD_NUMBER, None, Unsigned32Avp::new(t.accounting_record_number), mflag(d, None, codes::ACCOUNTING_RECORD_NUMBER))],
            consume: |t, a| {
                t.accounting_record_number = a.get_unsigned32().ok_or(Error::MissingAvp("Accounting-Record-Number"))?;
                Ok(())
            },
        },
    ]
}

impl AccountingAnswer {
    pub fn apply(&self, msg: &mut DiameterMessage) {
        let dict = Arc::clone(msg.dictionary());
        emit(msg, self, &answer_entries(), &dict);
    }

    pub fn from_message(msg: &DiameterMessage) -> Result<AccountingAnswer> {
        populate(msg, &answer_entries())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Dictionary;
    use crate::result_code::DIAMETER_SUCCESS;

    #[test]
    fn test_acr_aca_roundtrip() {
        let dict = Arc::new(Dictionary::default());
        let acr = AccountingRequest {
            session_id: "host.example.com;1;2".into(),
            origin_host: "host.example.com".into(),
            origin_realm: "example.com".into(),
            destination_realm: "dest.example.com".into(),
            accounting_record_type: AccountingRecordType::Start,
            accounting_record_number: 0,
            additional_avps: vec![],
        };
        let req = acr.build(2, 2, Arc::clone(&dict));
        let parsed = AccountingRequest::from_message(&req).unwrap();
        assert_eq!(parsed.accounting_record_type, AccountingRecordType::Start);

        let mut ans = req.new_answer();
        AccountingAnswer {
            session_id: acr.session_id.clone(),
            result_code: DIAMETER_SUCCESS,
            origin_host: "dest.example.com".into(),
            origin_realm: "example.com".into(),
            accounting_record_type: AccountingRecordType::Start,
            accounting_record_number: 0,
            additional_avps: vec![],
        }
        .apply(&mut ans);
        let parsed_ans = AccountingAnswer::from_message(&ans).unwrap();
        assert_eq!(parsed_ans.result_code, DIAMETER_SUCCESS);
    }
}
