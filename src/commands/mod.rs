//! Typed views over the six base-protocol commands plus two worked
//! application-layer examples (Credit-Control, Accounting), built on top of
//! the raw, dictionary-driven [`crate::message::DiameterMessage`].
//!
//! Each submodule declares its AVPs as a table of [`Entry`] values rather
//! than hand-written `add_avp`/`get_avp` calls: [`populate`] reads a
//! [`DiameterMessage`] through the table into a `T: Default`, [`emit`] writes
//! a `T` back out through it. A submodule's `build(..)`/`from_message(..)`
//! are thin wrappers around `emit`/`populate` over its own table.

pub mod acr_aca;
pub mod ccr_cca;
pub mod cea;
pub mod cer;
pub mod dpa;
pub mod dpr;
pub mod dwa;
pub mod dwr;

use crate::avp::Avp;
use crate::dictionary::Dictionary;
use crate::error::{Error, Result};
use crate::message::DiameterMessage;
use std::collections::HashSet;
use std::sync::Arc;

/// Well-known base-protocol AVP codes (RFC 6733 §4.3), reused across every
/// typed command so code numbers are spelled out exactly once.
pub mod codes {
    pub const SESSION_ID: u32 = 263;
    pub const ORIGIN_HOST: u32 = 264;
    pub const ORIGIN_REALM: u32 = 296;
    pub const DESTINATION_HOST: u32 = 293;
    pub const DESTINATION_REALM: u32 = 283;
    pub const RESULT_CODE: u32 = 268;
    pub const HOST_IP_ADDRESS: u32 = 257;
    pub const VENDOR_ID: u32 = 266;
    pub const PRODUCT_NAME: u32 = 269;
    pub const ORIGIN_STATE_ID: u32 = 278;
    pub const SUPPORTED_VENDOR_ID: u32 = 265;
    pub const AUTH_APPLICATION_ID: u32 = 258;
    pub const ACCT_APPLICATION_ID: u32 = 259;
    pub const VENDOR_SPECIFIC_APPLICATION_ID: u32 = 260;
    pub const INBAND_SECURITY_ID: u32 = 299;
    pub const FIRMWARE_REVISION: u32 = 267;
    pub const ERROR_MESSAGE: u32 = 281;
    pub const DISCONNECT_CAUSE: u32 = 273;
    pub const CC_REQUEST_TYPE: u32 = 416;
    pub const CC_REQUEST_NUMBER: u32 = 415;
    pub const SUBSCRIPTION_ID: u32 = 443;
    pub const SUBSCRIPTION_ID_TYPE: u32 = 450;
    pub const SUBSCRIPTION_ID_DATA: u32 = 444;
    pub const ACCOUNTING_RECORD_TYPE: u32 = 480;
    pub const ACCOUNTING_RECORD_NUMBER: u32 = 485;
    pub const EVENT_TIMESTAMP: u32 = 55;
}

/// The declarative composition layer (spec §4.4): a command struct's shape is
/// an ordered list of [`Entry`] values rather than hand-written `add_avp`
/// calls. [`populate`] reads a [`DiameterMessage`] through the table;
/// [`emit`] writes one back through it.
pub struct Entry<T> {
    pub code: u32,
    pub vendor_id: Option<u32>,
    pub name: &'static str,
    pub required: bool,
    /// Produces zero or more AVPs for this entry (more than one for a
    /// repeated attribute like Host-IP-Address).
    pub emit: fn(&T, &Arc<Dictionary>) -> Vec<Avp>,
    /// Folds one matching AVP into the target. Called once per AVP in the
    /// message whose code matches this entry, in arrival order.
    pub consume: fn(&mut T, &Avp) -> Result<()>,
}

/// A command struct that keeps the AVPs none of its entries claimed, in the
/// order they arrived, so a round-trip through `populate`/`emit` doesn't
/// silently drop AVPs the struct doesn't know about.
pub trait AdditionalAvps {
    fn additional_avps(&self) -> &[Avp];
    fn additional_avps_mut(&mut self) -> &mut Vec<Avp>;
}

/// Looks up the dictionary's declared M flag for `code`, the default a typed
/// command uses unless it has a reason to override it. The V flag is not
/// looked up here: it is a pure function of whether `vendor_id` is `Some`,
/// computed by the `avp!` macro/`Avp::new` from the vendor id alone.
pub(crate) fn mflag(dict: &Dictionary, vendor_id: Option<u32>, code: u32) -> bool {
    dict.get_avp(vendor_id, code)
        .map(|def| def.mandatory)
        .unwrap_or(false)
}

/// Builds a `T` from `msg`'s AVPs by walking `entries` in order: each AVP
/// whose code matches an entry is folded in via that entry's `consume`;
/// anything left over goes into `additional_avps` in arrival order. After
/// the pass, any `required` entry that matched nothing is a `MissingAvp`.
pub(crate) fn populate<T: Default + AdditionalAvps>(
    msg: &DiameterMessage,
    entries: &[Entry<T>],
) -> Result<T> {
    let mut target = T::default();
    let mut seen: HashSet<u32> = HashSet::new();
    for avp in msg.avps() {
        match entries.iter().find(|e| e.code == avp.get_code()) {
            Some(entry) => {
                (entry.consume)(&mut target, avp)?;
                seen.insert(entry.code);
            }
            None => target.additional_avps_mut().push(avp.clone()),
        }
    }
    for entry in entries {
        if entry.required && !seen.contains(&entry.code) {
            return Err(Error::MissingAvp(entry.name));
        }
    }
    Ok(target)
}

/// Writes `target` into `msg` by walking `entries` in order, then appending
/// `additional_avps` — the mirror image of [`populate`].
pub(crate) fn emit<T: AdditionalAvps>(
    msg: &mut DiameterMessage,
    target: &T,
    entries: &[Entry<T>],
    dict: &Arc<Dictionary>,
) {
    for entry in entries {
        for avp in (entry.emit)(target, dict) {
            msg.add_avp(avp);
        }
    }
    for avp in target.additional_avps() {
        msg.add_avp(avp.clone());
    }
}

/// Vendor-Specific-Application-Id (260), a grouped AVP CER/CEA and
/// application-level commands may carry to name the vendor and application
/// they implement (RFC 6733 §6.11).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VendorSpecificApplicationId {
    pub vendor_id: u32,
    pub auth_application_id: Option<u32>,
    pub acct_application_id: Option<u32>,
}

impl VendorSpecificApplicationId {
    pub(crate) fn into_avp(self, dict: &std::sync::Arc<Dictionary>) -> Avp {
        let mut children = vec![crate::avp!(
            codes::VENDOR_ID,
            None,
            crate::avp::unsigned32::Unsigned32Avp::new(self.vendor_id),
            mflag(dict, None, codes::VENDOR_ID)
        )];
        if let Some(id) = self.auth_application_id {
            children.push(crate::avp!(
                codes::AUTH_APPLICATION_ID,
                None,
                crate::avp::unsigned32::Unsigned32Avp::new(id),
                mflag(dict, None, codes::AUTH_APPLICATION_ID)
            ));
        }
        if let Some(id) = self.acct_application_id {
            children.push(crate::avp!(
                codes::ACCT_APPLICATION_ID,
                None,
                crate::avp::unsigned32::Unsigned32Avp::new(id),
                mflag(dict, None, codes::ACCT_APPLICATION_ID)
            ));
        }
        crate::avp!(
            codes::VENDOR_SPECIFIC_APPLICATION_ID,
            None,
            crate::avp::group::GroupedAvp::new(children, std::sync::Arc::clone(dict)),
            mflag(dict, None, codes::VENDOR_SPECIFIC_APPLICATION_ID)
        )
    }

    pub(crate) fn from_avp(avp: &Avp) -> Result<VendorSpecificApplicationId> {
        let grouped = avp
            .get_grouped()
            .ok_or_else(|| Error::BadGrouped("Vendor-Specific-Application-Id is not Grouped".into()))?;
        let children = grouped.avps()?;
        let vendor_id = children
            .iter()
            .find(|a| a.get_code() == codes::VENDOR_ID)
            .and_then(|a| a.get_unsigned32())
            .ok_or(Error::MissingAvp("Vendor-Id"))?;
        let auth_application_id = children
            .iter()
            .find(|a| a.get_code() == codes::AUTH_APPLICATION_ID)
            .and_then(|a| a.get_unsigned32());
        let acct_application_id = children
            .iter()
            .find(|a| a.get_code() == codes::ACCT_APPLICATION_ID)
            .and_then(|a| a.get_unsigned32());
        Ok(VendorSpecificApplicationId {
            vendor_id,
            auth_application_id,
            acct_application_id,
        })
    }
}
