//! The textual Diameter URI grammar used in peer configuration (RFC 6733 §4.1.4):
//! `aaa://FQDN[:port][;transport=proto][;protocol=diameter|radius|tacacs+]`
//! `aaas://FQDN[:port][;transport=proto][;protocol=diameter|radius|tacacs+]`

use crate::error::{Error, Result};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UriScheme {
    Aaa,
    Aaas,
}

impl UriScheme {
    pub fn default_port(&self) -> u16 {
        match self {
            UriScheme::Aaa => 3868,
            UriScheme::Aaas => 5658,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            UriScheme::Aaa => "aaa",
            UriScheme::Aaas => "aaas",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiameterUri {
    pub scheme: UriScheme,
    pub fqdn: String,
    pub port: u16,
    pub transport: Option<String>,
    pub protocol: Option<String>,
}

impl DiameterUri {
    pub fn parse(text: &str) -> Result<DiameterUri> {
        let (scheme, rest) = if let Some(rest) = text.strip_prefix("aaas://") {
            (UriScheme::Aaas, rest)
        } else if let Some(rest) = text.strip_prefix("aaa://") {
            (UriScheme::Aaa, rest)
        } else {
            return Err(Error::BadAddress(format!(
                "diameter uri {:?} must start with aaa:// or aaas://",
                text
            )));
        };

        let mut parts = rest.split(';');
        let authority = parts
            .next()
            .ok_or_else(|| Error::BadAddress("empty diameter uri authority".into()))?;

        let (fqdn, port) = match authority.split_once(':') {
            Some((fqdn, port_str)) => {
                let port: u16 = port_str
                    .parse()
                    .map_err(|_| Error::BadAddress(format!("bad port {:?}", port_str)))?;
                (fqdn.to_string(), port)
            }
            None => (authority.to_string(), scheme.default_port()),
        };

        if fqdn.is_empty() {
            return Err(Error::BadAddress("diameter uri has no host".into()));
        }

        let mut transport = None;
        let mut protocol = None;
        for param in parts {
            if let Some(value) = param.strip_prefix("transport=") {
                transport = Some(value.to_string());
            } else if let Some(value) = param.strip_prefix("protocol=") {
                protocol = Some(value.to_string());
            } else if !param.is_empty() {
                return Err(Error::BadAddress(format!(
                    "unrecognized diameter uri parameter {:?}",
                    param
                )));
            }
        }

        Ok(DiameterUri {
            scheme,
            fqdn,
            port,
            transport,
            protocol,
        })
    }
}

impl fmt::Display for DiameterUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme.as_str(), self.fqdn, self.port)?;
        if let Some(transport) = &self.transport {
            write!(f, ";transport={}", transport)?;
        }
        if let Some(protocol) = &self.protocol {
            write!(f, ";protocol={}", protocol)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let uri = DiameterUri::parse("aaa://dra2.gy.mno.net").unwrap();
        assert_eq!(uri.scheme, UriScheme::Aaa);
        assert_eq!(uri.fqdn, "dra2.gy.mno.net");
        assert_eq!(uri.port, 3868);
    }

    #[test]
    fn test_parse_with_port_and_params() {
        let uri =
            DiameterUri::parse("aaa://dra2.gy.mno.net:3868;transport=tcp;protocol=diameter")
                .unwrap();
        assert_eq!(uri.port, 3868);
        assert_eq!(uri.transport.as_deref(), Some("tcp"));
        assert_eq!(uri.protocol.as_deref(), Some("diameter"));
    }

    #[test]
    fn test_aaas_default_port() {
        let uri = DiameterUri::parse("aaas://secure.example.com").unwrap();
        assert_eq!(uri.scheme, UriScheme::Aaas);
        assert_eq!(uri.port, 5658);
    }

    #[test]
    fn test_rejects_bad_scheme() {
        assert!(DiameterUri::parse("http://example.com").is_err());
    }

    #[test]
    fn test_roundtrip_display() {
        let text = "aaa://dra2.gy.mno.net:3868;transport=tcp";
        let uri = DiameterUri::parse(text).unwrap();
        assert_eq!(uri.to_string(), text);
    }
}
