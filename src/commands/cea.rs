//! Capabilities-Exchange-Answer (RFC 6733 §5.3.2), command code 257.

use super::{codes, emit, mflag, populate, AdditionalAvps, Entry, VendorSpecificApplicationId};
use crate::avp;
use crate::avp::address::AddressAvp;
use crate::avp::identity::IdentityAvp;
use crate::avp::unsigned32::Unsigned32Avp;
use crate::avp::utf8string::UTF8StringAvp;
use crate::avp::Avp;
use crate::error::Result;
use crate::message::DiameterMessage;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct CapabilitiesExchangeAnswer {
    pub result_code: u32,
    pub origin_host: String,
    pub origin_realm: String,
    pub host_ip_addresses: Vec<AddressAvp>,
    pub vendor_id: u32,
    pub product_name: String,
    pub auth_application_ids: Vec<u32>,
    pub acct_application_ids: Vec<u32>,
    pub vendor_specific_application_id: Option<VendorSpecificApplicationId>,
    pub additional_avps: Vec<Avp>,
}

impl AdditionalAvps for CapabilitiesExchangeAnswer {
    fn additional_avps(&self) -> &[Avp] {
        &self.additional_avps
    }
    fn additional_avps_mut(&mut self) -> &mut Vec<Avp> {
        &mut self.additional_avps
    }
}

fn entries() -> Vec<Entry<CapabilitiesExchangeAnswer>> {
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
            code: codes::HOST_IP_ADDRESS,
            vendor_id: None,
            name: "Host-IP-Address",
            required: false,
            emit: |t, d| {
                t.host_ip_addresses
                    .iter()
                    .map(|addr| avp!(codes::HOST_IP_ADDRESS, None, addr.clone(), mflag(d, None, codes::HOST_IP_ADDRESS)))
                    .collect()
            },
            consume: |t, a| {
                if let crate::avp::AvpData::Address(addr) = a.get_data() {
                    t.host_ip_addresses.push(addr.clone());
                }
                Ok(())
            },
        },
        Entry {
            code: codes::VENDOR_ID,
            vendor_id: None,
            name: "Vendor-Id",
            required: true,
            emit: |t, d| vec![avp!(codes::VENDOR_ID, None, Unsigned32Avp::new(t.vendor_id), mflag(d, None, codes::VENDOR_ID))],
            consume: |t, a| {
                t.vendor_id = a.get_unsigned32().ok_or(crate::error::Error::MissingAvp("Vendor-Id"))?;
                Ok(())
            },
        },
        Entry {
            code: codes::PRODUCT_NAME,
            vendor_id: None,
            name: "Product-Name",
            required: false,
            emit: |t, d| vec![avp!(codes::PRODUCT_NAME, None, UTF8StringAvp::new(t.product_name.clone()), mflag(d, None, codes::PRODUCT_NAME))],
            consume: |t, a| {
                t.product_name = a.get_utf8string().unwrap_or("").to_string();
                Ok(())
            },
        },
        Entry {
            code: codes::AUTH_APPLICATION_ID,
            vendor_id: None,
            name: "Auth-Application-Id",
            required: false,
            emit: |t, d| {
                t.auth_application_ids
                    .iter()
                    .map(|v| avp!(codes::AUTH_APPLICATION_ID, None, Unsigned32Avp::new(*v), mflag(d, None, codes::AUTH_APPLICATION_ID)))
                    .collect()
            },
            consume: |t, a| {
                if let Some(v) = a.get_unsigned32() {
                    t.auth_application_ids.push(v);
                }
                Ok(())
            },
        },
        Entry {
            code: codes::ACCT_APPLICATION_ID,
            vendor_id: None,
            name: "Acct-Application-Id",
            required: false,
            emit: |t, d| {
                t.acct_application_ids
                    .iter()
                    .map(|v| avp!(codes::ACCT_APPLICATION_ID, None, Unsigned32Avp::new(*v), mflag(d, None, codes::ACCT_APPLICATION_ID)))
                    .collect()
            },
            consume: |t, a| {
                if let Some(v) = a.get_unsigned32() {
                    t.acct_application_ids.push(v);
                }
                Ok(())
            },
        },
        Entry {
            code: codes::VENDOR_SPECIFIC_APPLICATION_ID,
            vendor_id: None,
            name: "Vendor-Specific-Application-Id",
            required: false,
            emit: |t, d| match &t.vendor_specific_application_id {
                Some(v) => vec![v.clone().into_avp(d)],
                None => vec![],
            },
            consume: |t, a| {
                t.vendor_specific_application_id = Some(VendorSpecificApplicationId::from_avp(a)?);
                Ok(())
            },
        },
    ]
}

impl CapabilitiesExchangeAnswer {
    /// Fills in the answer AVPs on a header already derived from the request
    /// via [`DiameterMessage::new_answer`].
    pub fn apply(&self, msg: &mut DiameterMessage) {
        let dict = Arc::clone(msg.dictionary());
        emit(msg, self, &entries(), &dict);
    }

    pub fn from_message(msg: &DiameterMessage) -> Result<CapabilitiesExchangeAnswer> {
        populate(msg, &entries())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cer::CapabilitiesExchangeRequest;
    use crate::dictionary::Dictionary;
    use crate::result_code::DIAMETER_SUCCESS;

    #[test]
    fn test_answer_roundtrip() {
        let dict = Arc::new(Dictionary::default());
        let cer = CapabilitiesExchangeRequest {
            origin_host: "client.example.com".into(),
            origin_realm: "example.com".into(),
            host_ip_addresses: vec![],
            vendor_id: 10415,
            product_name: "diameter-rs".into(),
            origin_state_id: None,
            supported_vendor_ids: vec![],
            auth_application_ids: vec![4],
            acct_application_ids: vec![],
            vendor_specific_application_id: None,
            additional_avps: vec![],
        };
        let req = cer.build(1, 1, Arc::clone(&dict));
        let mut ans = req.new_answer();

        let cea = CapabilitiesExchangeAnswer {
            result_code: DIAMETER_SUCCESS,
            origin_host: "server.example.com".into(),
            origin_realm: "example.com".into(),
            host_ip_addresses: vec![],
            vendor_id: 10415,
            product_name: "diameter-rs".into(),
            auth_application_ids: vec![4],
            acct_application_ids: vec![],
            vendor_specific_application_id: Some(super::VendorSpecificApplicationId {
                vendor_id: 10415,
                auth_application_id: Some(4),
                acct_application_id: None,
            }),
            additional_avps: vec![],
        };
        cea.apply(&mut ans);

        let parsed = CapabilitiesExchangeAnswer::from_message(&ans).unwrap();
        assert_eq!(parsed.result_code, DIAMETER_SUCCESS);
        assert_eq!(parsed.origin_host, "server.example.com");
        assert_eq!(
            parsed.vendor_specific_application_id.unwrap().vendor_id,
            10415
        );
    }
}
