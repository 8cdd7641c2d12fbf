//! Capabilities-Exchange-Request (RFC 6733 §5.3.1), command code 257.

use super::{codes, emit, mflag, populate, AdditionalAvps, Entry, VendorSpecificApplicationId};
use crate::avp;
use crate::avp::address::AddressAvp;
use crate::avp::identity::IdentityAvp;
use crate::avp::unsigned32::Unsigned32Avp;
use crate::avp::utf8string::UTF8StringAvp;
use crate::avp::Avp;
use crate::dictionary::Dictionary;
use crate::error::Result;
use crate::message::{application_ids, command_codes, CommandFlags, DiameterMessage};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct CapabilitiesExchangeRequest {
    pub origin_host: String,
    pub origin_realm: String,
    pub host_ip_addresses: Vec<AddressAvp>,
    pub vendor_id: u32,
    pub product_name: String,
    pub origin_state_id: Option<u32>,
    pub supported_vendor_ids: Vec<u32>,
    pub auth_application_ids: Vec<u32>,
    pub acct_application_ids: Vec<u32>,
    pub vendor_specific_application_id: Option<VendorSpecificApplicationId>,
    pub additional_avps: Vec<Avp>,
}

impl AdditionalAvps for CapabilitiesExchangeRequest {
    fn additional_avps(&self) -> &[Avp] {
        &self.additional_avps
    }
    fn additional_avps_mut(&mut self) -> &mut Vec<Avp> {
        &mut self.additional_avps
    }
}

fn entries() -> Vec<Entry<CapabilitiesExchangeRequest>> {
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
        Entry {
            code: codes::SUPPORTED_VENDOR_ID,
            vendor_id: None,
            name: "Supported-Vendor-Id",
            required: false,
            emit: |t, d| {
                t.supported_vendor_ids
                    .iter()
                    .map(|v| avp!(codes::SUPPORTED_VENDOR_ID, None, Unsigned32Avp::new(*v), mflag(d, None, codes::SUPPORTED_VENDOR_ID)))
                    .collect()
            },
            consume: |t, a| {
                if let Some(v) = a.get_unsigned32() {
                    t.supported_vendor_ids.push(v);
                }
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

impl CapabilitiesExchangeRequest {
    pub fn build(&self, hop_by_hop_id: u32, end_to_end_id: u32, dict: Arc<Dictionary>) -> DiameterMessage {
        let mut msg = DiameterMessage::new(
            command_codes::CAPABILITIES_EXCHANGE,
            application_ids::COMMON,
            CommandFlags::new(true, false, false, false),
            hop_by_hop_id,
            end_to_end_id,
            Arc::clone(&dict),
        );
        emit(&mut msg, self, &entries(), &dict);
        msg
    }

    pub fn from_message(msg: &DiameterMessage) -> Result<CapabilitiesExchangeRequest> {
        populate(msg, &entries())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Dictionary;

    #[test]
    fn test_build_and_parse_roundtrip() {
        let dict = Arc::new(Dictionary::default());
        let cer = CapabilitiesExchangeRequest {
            origin_host: "host.example.com".into(),
            origin_realm: "example.com".into(),
            host_ip_addresses: vec![AddressAvp::parse("10.0.0.1").unwrap()],
            vendor_id: 10415,
            product_name: "diameter-rs".into(),
            origin_state_id: Some(1),
            supported_vendor_ids: vec![10415],
            auth_application_ids: vec![4],
            acct_application_ids: vec![3],
            vendor_specific_application_id: None,
            additional_avps: vec![],
        };
        let msg = cer.build(1, 1, dict);
        let parsed = CapabilitiesExchangeRequest::from_message(&msg).unwrap();
        assert_eq!(parsed.origin_host, "host.example.com");
        assert_eq!(parsed.auth_application_ids, vec![4]);
        assert_eq!(parsed.host_ip_addresses.len(), 1);
    }
}
