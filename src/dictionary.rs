use lazy_static::lazy_static;
use serde::Deserialize;
use serde_xml_rs::from_str;
use std::collections::BTreeMap;

use crate::avp::AvpType;

/// A command definition: the code/application pair plus which AVP this
/// command's answer should mirror Result-Code back through (all of them,
/// via the generic AVP table — this only records identity for dispatch).
#[derive(Debug, Clone)]
pub struct CommandDefinition {
    pub code: u32,
    pub application_id: u32,
    pub name: String,
}

#[derive(Debug)]
pub struct Dictionary {
    avps: BTreeMap<(Option<u32>, u32), AvpDefinition>,
    commands: BTreeMap<(u32, u32), CommandDefinition>,
}

#[derive(Debug, Clone)]
pub struct AvpDefinition {
    pub code: u32,
    pub vendor_id: Option<u32>,
    pub name: String,
    pub avp_type: AvpType,
    /// Whether the dictionary declares this AVP `must="M"` — the default M
    /// flag a typed command uses unless the caller overrides it.
    pub mandatory: bool,
    /// Application this AVP was declared under, for AVPs (like most of the
    /// base protocol's) that are scoped to a specific application in the
    /// dictionary rather than shared across all of them.
    pub application_id: u32,
}

/// A request/answer pair routed by command code, selected by the header's
/// R bit (spec §4.3's "typed message routing"). `route` returns `None` for
/// a command code the dictionary has no typed wrapper for, in which case a
/// caller reads the raw [`crate::message::DiameterMessage`] directly.
pub enum TypedMessage {
    CapabilitiesExchangeRequest(crate::commands::cer::CapabilitiesExchangeRequest),
    CapabilitiesExchangeAnswer(crate::commands::cea::CapabilitiesExchangeAnswer),
    DeviceWatchdogRequest(crate::commands::dwr::DeviceWatchdogRequest),
    DeviceWatchdogAnswer(crate::commands::dwa::DeviceWatchdogAnswer),
    DisconnectPeerRequest(crate::commands::dpr::DisconnectPeerRequest),
    DisconnectPeerAnswer(crate::commands::dpa::DisconnectPeerAnswer),
    CreditControlRequest(crate::commands::ccr_cca::CreditControlRequest),
    CreditControlAnswer(crate::commands::ccr_cca::CreditControlAnswer),
    AccountingRequest(crate::commands::acr_aca::AccountingRequest),
    AccountingAnswer(crate::commands::acr_aca::AccountingAnswer),
}

/// Decodes `msg` into its typed wrapper based on command code and the
/// request (`R`) flag. Returns `Ok(None)` for a command code with no typed
/// wrapper — not an error, since an unrecognized command is still a valid
/// [`crate::message::DiameterMessage`] a caller can read with `get_avp`.
pub fn route(msg: &crate::message::DiameterMessage) -> crate::error::Result<Option<TypedMessage>> {
    use crate::message::command_codes as cc;
    let is_request = msg.is_request();
    Ok(Some(match (msg.get_command_code(), is_request) {
        (cc::CAPABILITIES_EXCHANGE, true) => {
            TypedMessage::CapabilitiesExchangeRequest(
                crate::commands::cer::CapabilitiesExchangeRequest::from_message(msg)?,
            )
        }
        (cc::CAPABILITIES_EXCHANGE, false) => TypedMessage::CapabilitiesExchangeAnswer(
            crate::commands::cea::CapabilitiesExchangeAnswer::from_message(msg)?,
        ),
        (cc::DEVICE_WATCHDOG, true) => {
            TypedMessage::DeviceWatchdogRequest(crate::commands::dwr::DeviceWatchdogRequest::from_message(msg)?)
        }
        (cc::DEVICE_WATCHDOG, false) => {
            TypedMessage::DeviceWatchdogAnswer(crate::commands::dwa::DeviceWatchdogAnswer::from_message(msg)?)
        }
        (cc::DISCONNECT_PEER, true) => {
            TypedMessage::DisconnectPeerRequest(crate::commands::dpr::DisconnectPeerRequest::from_message(msg)?)
        }
        (cc::DISCONNECT_PEER, false) => {
            TypedMessage::DisconnectPeerAnswer(crate::commands::dpa::DisconnectPeerAnswer::from_message(msg)?)
        }
        (cc::CREDIT_CONTROL, true) => {
            TypedMessage::CreditControlRequest(crate::commands::ccr_cca::CreditControlRequest::from_message(msg)?)
        }
        (cc::CREDIT_CONTROL, false) => {
            TypedMessage::CreditControlAnswer(crate::commands::ccr_cca::CreditControlAnswer::from_message(msg)?)
        }
        (cc::ACCOUNTING, true) => {
            TypedMessage::AccountingRequest(crate::commands::acr_aca::AccountingRequest::from_message(msg)?)
        }
        (cc::ACCOUNTING, false) => {
            TypedMessage::AccountingAnswer(crate::commands::acr_aca::AccountingAnswer::from_message(msg)?)
        }
        _ => return Ok(None),
    }))
}

impl Dictionary {
    pub fn new(xmls: &[&str]) -> Dictionary {
        let mut dict = Dictionary {
            avps: BTreeMap::new(),
            commands: BTreeMap::new(),
        };
        for xml in xmls {
            dict.merge(xml);
        }
        dict
    }

    fn merge(&mut self, xml: &str) {
        let parsed: Diameter = from_str(xml).expect("invalid dictionary XML");
        let application_id: u32 = parsed
            .application
            .id
            .parse()
            .expect("application id must be numeric");

        for avp in &parsed.application.avps {
            let avp_type = match avp.data.data_type.as_str() {
                "UTF8String" => AvpType::UTF8String,
                "OctetString" => AvpType::OctetString,
                "Integer32" => AvpType::Integer32,
                "Integer64" => AvpType::Integer64,
                "Unsigned32" => AvpType::Unsigned32,
                "Unsigned64" => AvpType::Unsigned64,
                "Enumerated" => AvpType::Enumerated,
                "Grouped" => AvpType::Grouped,
                "DiameterIdentity" => AvpType::Identity,
                "DiameterURI" => AvpType::DiameterURI,
                "Time" => AvpType::Time,
                "Address" => AvpType::Address,
                "IPv4" => AvpType::Address,
                "IPv6" => AvpType::Address,
                "Float32" => AvpType::Float32,
                "Float64" => AvpType::Float64,
                _ => AvpType::Unknown,
            };

            let vendor_id = avp.vendor_id.as_ref().and_then(|v| v.parse::<u32>().ok());
            let code = avp.code.parse::<u32>().expect("avp code must be numeric");
            let mandatory = avp.must.as_deref() == Some("M");

            self.add_avp(AvpDefinition {
                code,
                vendor_id,
                name: avp.name.clone(),
                avp_type,
                mandatory,
                application_id,
            });
        }

        for command in &parsed.application.commands {
            let code: u32 = command.code.parse().expect("command code must be numeric");
            self.commands.insert(
                (code, application_id),
                CommandDefinition {
                    code,
                    application_id,
                    name: command.name.clone(),
                },
            );
        }
    }

    pub fn add_avp(&mut self, avp: AvpDefinition) {
        self.avps.insert((avp.vendor_id, avp.code), avp);
    }

    pub fn get_avp(&self, vendor_id: Option<u32>, code: u32) -> Option<&AvpDefinition> {
        self.avps
            .get(&(vendor_id, code))
            .or_else(|| self.avps.get(&(None, code)))
    }

    pub fn get_avp_type(&self, vendor_id: Option<u32>, code: u32) -> AvpType {
        self.get_avp(vendor_id, code)
            .map(|def| def.avp_type)
            .unwrap_or(AvpType::Unknown)
    }

    pub fn get_avp_name(&self, vendor_id: Option<u32>, code: u32) -> Option<&str> {
        self.get_avp(vendor_id, code).map(|def| def.name.as_str())
    }

    pub fn get_command(&self, code: u32, application_id: u32) -> Option<&CommandDefinition> {
        self.commands.get(&(code, application_id))
    }
}

impl Default for Dictionary {
    fn default() -> Dictionary {
        Dictionary::new(&[&DEFAULT_DICT_XML])
    }
}

#[derive(Debug, Deserialize, PartialEq)]
struct Diameter {
    application: Application,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Application {
    id: String,
    #[allow(dead_code)]
    name: String,
    #[serde(rename = "command", default)]
    commands: Vec<Command>,
    #[serde(rename = "avp", default)]
    avps: Vec<Avp>,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Command {
    code: String,
    #[allow(dead_code)]
    short: String,
    name: String,
    #[allow(dead_code)]
    request: CommandDetail,
    #[allow(dead_code)]
    answer: CommandDetail,
}

#[derive(Debug, Deserialize, PartialEq)]
struct CommandDetail {
    #[serde(rename = "rule", default)]
    rules: Vec<Rule>,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Rule {
    #[allow(dead_code)]
    avp: String,
    #[allow(dead_code)]
    required: String,
    #[allow(dead_code)]
    max: Option<String>,
    #[allow(dead_code)]
    min: Option<String>,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Avp {
    name: String,
    code: String,
    #[serde(rename = "vendor-id")]
    vendor_id: Option<String>,
    must: Option<String>,
    #[allow(dead_code)]
    may: Option<String>,
    #[serde(rename = "must-not")]
    #[allow(dead_code)]
    must_not: Option<String>,
    #[serde(rename = "may-encrypt")]
    #[allow(dead_code)]
    may_encrypt: Option<String>,
    data: Data,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Data {
    #[serde(rename = "type")]
    data_type: String,
    #[serde(default)]
    #[allow(dead_code)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Item {
    #[allow(dead_code)]
    code: String,
    #[allow(dead_code)]
    name: String,
}

lazy_static! {
    pub static ref DEFAULT_DICT_XML: &'static str = {
        let xml = r#"
<diameter>
    <application id="0" name="Base">
        <command code="257" short="CE" name="Capabilities-Exchange">
            <request>
                <rule avp="Origin-Host" required="true" max="1"/>
                <rule avp="Origin-Realm" required="true" max="1"/>
            </request>
            <answer>
                <rule avp="Result-Code" required="true" max="1"/>
            </answer>
        </command>

        <command code="280" short="DW" name="Device-Watchdog">
            <request>
                <rule avp="Origin-Host" required="true" max="1"/>
                <rule avp="Origin-Realm" required="true" max="1"/>
            </request>
            <answer>
                <rule avp="Result-Code" required="true" max="1"/>
            </answer>
        </command>

        <command code="282" short="DP" name="Disconnect-Peer">
            <request>
                <rule avp="Origin-Host" required="true" max="1"/>
                <rule avp="Origin-Realm" required="true" max="1"/>
                <rule avp="Disconnect-Cause" required="true" max="1"/>
            </request>
            <answer>
                <rule avp="Result-Code" required="true" max="1"/>
            </answer>
        </command>

        <avp name="Session-Id" code="263" must="M" may="P" must-not="V" may-encrypt="Y">
            <data type="UTF8String"/>
        </avp>

        <avp name="Origin-Host" code="264" must="M" may="P" must-not="V" may-encrypt="-">
            <data type="DiameterIdentity"/>
        </avp>

        <avp name="Origin-Realm" code="296" must="M" may="P" must-not="V" may-encrypt="-">
            <data type="DiameterIdentity"/>
        </avp>

        <avp name="Destination-Host" code="293" must="M" may="P" must-not="V" may-encrypt="-">
            <data type="DiameterIdentity"/>
        </avp>

        <avp name="Destination-Realm" code="283" must="M" may="P" must-not="V" may-encrypt="-">
            <data type="DiameterIdentity"/>
        </avp>

        <avp name="Host-IP-Address" code="257" must="M" may="P" must-not="V" may-encrypt="-">
            <data type="Address"/>
        </avp>

        <avp name="Vendor-Id" code="266" must="M" may="P" must-not="V" may-encrypt="-">
            <data type="Unsigned32"/>
        </avp>

        <avp name="Product-Name" code="269" must="-" may="P" must-not="V,M" may-encrypt="-">
            <data type="UTF8String"/>
        </avp>

        <avp name="Origin-State-Id" code="278" must="-" may="M,P" must-not="V" may-encrypt="-">
            <data type="Unsigned32"/>
        </avp>

        <avp name="Supported-Vendor-Id" code="265" must="M" may="P" must-not="V" may-encrypt="-">
            <data type="Unsigned32"/>
        </avp>

        <avp name="Auth-Application-Id" code="258" must="M" may="P" must-not="V" may-encrypt="-">
            <data type="Unsigned32"/>
        </avp>

        <avp name="Acct-Application-Id" code="259" must="M" may="P" must-not="V" may-encrypt="-">
            <data type="Unsigned32"/>
        </avp>

        <avp name="Vendor-Specific-Application-Id" code="260" must="M" may="P" must-not="V" may-encrypt="-">
            <data type="Grouped">
                <rule avp="Vendor-Id" required="true" max="1"/>
                <rule avp="Auth-Application-Id" required="false" max="1"/>
                <rule avp="Acct-Application-Id" required="false" max="1"/>
            </data>
        </avp>

        <avp name="Inband-Security-Id" code="299" must="-" may="M,P" must-not="V" may-encrypt="-">
            <data type="Unsigned32"/>
        </avp>

        <avp name="Firmware-Revision" code="267" must="-" may="P" must-not="V,M" may-encrypt="-">
            <data type="Unsigned32"/>
        </avp>

        <avp name="Result-Code" code="268" must="M" may="P" must-not="V" may-encrypt="-">
            <data type="Unsigned32"/>
        </avp>

        <avp name="Error-Message" code="281" must="-" may="P" must-not="V,M" may-encrypt="-">
            <data type="UTF8String"/>
        </avp>

        <avp name="Disconnect-Cause" code="273" must="M" may="P" must-not="V" may-encrypt="-">
            <data type="Enumerated">
                <item code="0" name="REBOOTING"/>
                <item code="1" name="BUSY"/>
                <item code="2" name="DO_NOT_WANT_TO_TALK_TO_YOU"/>
            </data>
        </avp>

        <avp name="CC-Request-Number" code="415" must="M" may="P" must-not="V" may-encrypt="Y">
            <data type="Unsigned32"/>
        </avp>

        <avp name="CC-Request-Type" code="416" must="M" may="P" must-not="V" may-encrypt="Y">
            <data type="Enumerated">
                <item code="1" name="INITIAL_REQUEST"/>
                <item code="2" name="UPDATE_REQUEST"/>
                <item code="3" name="TERMINATION_REQUEST"/>
                <item code="4" name="EVENT_REQUEST"/>
            </data>
        </avp>

        <avp name="Accounting-Record-Type" code="480" must="M" may="P" must-not="V" may-encrypt="Y">
            <data type="Enumerated">
                <item code="1" name="EVENT_RECORD"/>
                <item code="2" name="START_RECORD"/>
                <item code="3" name="INTERIM_RECORD"/>
                <item code="4" name="STOP_RECORD"/>
            </data>
        </avp>

        <avp name="Accounting-Record-Number" code="485" must="M" may="P" must-not="V" may-encrypt="Y">
            <data type="Unsigned32"/>
        </avp>

        <avp name="Subscription-Id" code="443" must="M" may="P" must-not="V" may-encrypt="Y">
            <data type="Grouped">
                <rule avp="Subscription-Id-Type" required="true" max="1"/>
                <rule avp="Subscription-Id-Data" required="true" max="1"/>
            </data>
        </avp>

        <avp name="Subscription-Id-Type" code="450" must="M" may="P" must-not="V" may-encrypt="Y">
            <data type="Enumerated">
                <item code="0" name="END_USER_E164"/>
                <item code="1" name="END_USER_IMSI"/>
                <item code="2" name="END_USER_SIP_URI"/>
                <item code="3" name="END_USER_NAI"/>
                <item code="4" name="END_USER_PRIVATE"/>
            </data>
        </avp>

        <avp name="Subscription-Id-Data" code="444" must="M" may="P" must-not="V" may-encrypt="Y">
            <data type="UTF8String"/>
        </avp>

        <avp name="Called-Station-Id" code="30" must="M" may="-" must-not="V" may-encrypt="Y">
            <data type="UTF8String"/>
        </avp>

        <avp name="Event-Timestamp" code="55" must="M" may="P" must-not="V" may-encrypt="Y">
            <data type="Time"/>
        </avp>

        <avp name="Timezone-Offset" code="571" vendor-id="10415" must="V" may-encrypt="Y">
            <data type="Integer32"/>
        </avp>
    </application>
</diameter>
    "#;
        xml
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_dictionary() {
        let dict = Dictionary::new(&[&DEFAULT_DICT_XML]);
        assert_eq!(dict.get_avp_name(None, 263), Some("Session-Id"));
        assert_eq!(dict.get_avp_type(None, 415), AvpType::Unsigned32);
        assert_eq!(dict.get_avp_type(None, 443), AvpType::Grouped);
    }

    #[test]
    fn test_unknown_avp_is_unknown_type() {
        let dict = Dictionary::new(&[&DEFAULT_DICT_XML]);
        assert_eq!(dict.get_avp_type(None, 999999), AvpType::Unknown);
    }

    #[test]
    fn test_command_lookup() {
        let dict = Dictionary::new(&[&DEFAULT_DICT_XML]);
        let cmd = dict.get_command(257, 0).unwrap();
        assert_eq!(cmd.name, "Capabilities-Exchange");
    }
}
